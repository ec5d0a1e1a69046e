//! DI "Interfaces"

use crate::core::commands::InboundEvent;
use crate::error::{DispatchError, PersistenceError, TransportError};
use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub format: TextFormat,
    /// Attach the default reply keyboard.
    pub keyboard: bool,
    pub reply_to: Option<i32>,
}

/// What the transport reports back for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i32,
    pub date: DateTime<Utc>,
    pub chat_id: i64,
    pub recipient: Option<String>,
    /// Text as rendered by the transport (markup stripped).
    pub text: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<SentMessage, TransportError>;
}

/// Source of uniform random choices.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Result of handling one inbound event.
#[derive(Debug)]
pub enum Outcome {
    /// The command is not supported; nothing happened.
    Ignored,
    Responded(Response),
}

#[derive(Debug)]
pub struct Response {
    pub sent: SentMessage,
    /// `true` if the provider failed and the fallback text was sent.
    pub fallback: bool,
    /// Call counter after this invocation, if it could be recorded.
    pub calls: Option<i64>,
    /// Archive record, or the non-fatal reason it could not be written.
    pub archived: Result<entities::Message, PersistenceError>,
}

#[async_trait]
pub trait CommandService: Send + Sync {
    /// Handles one inbound event end to end: lookup, provider call, send,
    /// call counting and archiving.
    ///
    /// Returns `Err` only if no message could be sent for a recognized command.
    async fn dispatch(&self, event: InboundEvent) -> Result<Outcome, DispatchError>;
}
