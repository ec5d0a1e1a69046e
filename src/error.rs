//! Error taxonomy shared by the dispatcher and its collaborators

use std::time::Duration;
use thiserror::Error;

/// A write or read against the database failed.
///
/// Never fatal once a message has been delivered: the dispatcher logs it and
/// reports it alongside the successful outcome.
#[derive(Debug, Error)]
#[error("persistence failure: {0}")]
pub struct PersistenceError(#[from] pub sqlx::Error);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("command `{0}` has no stored response text")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Persistence(PersistenceError(e))
    }
}

/// An external data provider could not produce a usable answer.
///
/// Recovered locally by sending a fallback message.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no city name given")]
    MissingCity,

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider answered with status {0}")]
    Status(u16),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("malformed provider payload: {0}")]
    Malformed(String),

    #[error("provider returned no results")]
    Empty,

    #[error("failed to render response: {0}")]
    Render(#[from] minijinja::Error),
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Malformed(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Reasons a recognized command produced no message at all.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("command `{0}` has no stored response text")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<StoreError> for DispatchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(name) => DispatchError::NotFound(name),
            StoreError::Persistence(e) => DispatchError::Persistence(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` must be set")]
    Missing(&'static str),

    #[error("environment variable `{var}` has invalid value `{value}`")]
    Invalid { var: &'static str, value: String },
}
