//! Infrastructure traits, used for DI on higher levels

use crate::error::{LookupError, PersistenceError, StoreError};
use crate::infrastructure::entities;
use crate::infrastructure::providers::{NewsStory, WeatherReport};
use async_trait::async_trait;

/// Read side of the command table.
#[async_trait]
pub trait CommandRepository: Send + Sync {
    /// Returns the response text registered for exactly `name` (e.g. `/start`).
    ///
    /// Returns `StoreError::NotFound` if no such command exists.
    async fn lookup(&self, name: &str) -> Result<String, StoreError>;

    async fn list_commands(&self) -> Result<Vec<entities::Command>, PersistenceError>;
}

#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Counts one invocation of `command`, creating its log record on first use.
    ///
    /// Returns the updated log record, or `None` if the command is not
    /// registered (in which case nothing is written).
    async fn record_call(
        &self,
        command: &str,
    ) -> Result<Option<entities::CallLog>, PersistenceError>;

    /// All logged commands, most called first.
    async fn popular_commands(&self) -> Result<Vec<entities::PopularCommand>, PersistenceError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Registers a chat room. Calling it again for a known room is a no-op.
    async fn ensure_chatroom(&self, chat_id: i64) -> Result<(), PersistenceError>;

    /// Appends a sent message to the archive. The chat room must already exist.
    async fn record_sent(
        &self,
        message: entities::NewMessage,
    ) -> Result<entities::Message, PersistenceError>;

    /// The whole archive, newest first.
    async fn list_messages(&self) -> Result<Vec<entities::Message>, PersistenceError>;

    async fn list_chatrooms(&self) -> Result<Vec<entities::Chatroom>, PersistenceError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, LookupError>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Returns the provider's current list of top stories, in its order.
    async fn fetch_top_stories(&self) -> Result<Vec<NewsStory>, LookupError>;
}
