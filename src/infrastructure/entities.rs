//! Database entities

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Command {
    pub id: i64,
    pub command: String,
    pub text: String,
}

/// Per-command invocation counter.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CallLog {
    pub id: i64,
    pub command_id: Option<i64>,
    pub calls_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Chatroom {
    pub chat_id: i64,
}

/// A command name joined with its call counter, as shown on the analytics page.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PopularCommand {
    pub command: String,
    pub calls_count: i64,
}

/// A message the bot has sent.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub date: DateTime<Utc>,
    /// Identifier assigned by Telegram.
    pub message_id: i64,
    pub to_whom: Option<String>,
    pub chat_id: Option<i64>,
    pub command_id: Option<i64>,
}

/// Insert form of [`Message`]; the command is referenced by name.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
    pub date: DateTime<Utc>,
    pub message_id: i64,
    pub to_whom: Option<String>,
    pub chat_id: i64,
    pub command: Option<String>,
}
