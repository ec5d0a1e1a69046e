//! DB Repository abstractions

use crate::error::{PersistenceError, StoreError};
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    CallLog, Chatroom, Command, Message, NewMessage, PopularCommand,
};
use crate::infrastructure::traits::{CallLogRepository, CommandRepository, MessageRepository};
use async_trait::async_trait;
use di::{Ref, inject, injectable};

pub struct DbCommandRepository {
    connection: Ref<DatabaseConnection>,
}

#[injectable(CommandRepository)]
impl DbCommandRepository {
    #[inject]
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        DbCommandRepository { connection }
    }
}

#[async_trait]
impl CommandRepository for DbCommandRepository {
    async fn lookup(&self, name: &str) -> Result<String, StoreError> {
        let text: Option<(String,)> = sqlx::query_as("SELECT text FROM commands WHERE command = ?")
            .bind(name)
            .fetch_optional(&**self.connection)
            .await?;

        text.map(|(text,)| text)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    async fn list_commands(&self) -> Result<Vec<Command>, PersistenceError> {
        Ok(sqlx::query_as("SELECT * FROM commands ORDER BY command ASC")
            .fetch_all(&**self.connection)
            .await?)
    }
}

pub struct DbCallLogRepository {
    connection: Ref<DatabaseConnection>,
}

#[injectable(CallLogRepository)]
impl DbCallLogRepository {
    #[inject]
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        DbCallLogRepository { connection }
    }
}

#[async_trait]
impl CallLogRepository for DbCallLogRepository {
    async fn record_call(&self, command: &str) -> Result<Option<CallLog>, PersistenceError> {
        // Single upsert statement: concurrent calls serialize on the write lock
        // instead of racing a read-modify-write.
        Ok(sqlx::query_as(
            "INSERT INTO call_logs (command_id, calls_count) SELECT id, 1 FROM commands WHERE command = ? ON CONFLICT (command_id) DO UPDATE SET calls_count = call_logs.calls_count + 1 RETURNING id, command_id, calls_count",
        )
        .bind(command)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn popular_commands(&self) -> Result<Vec<PopularCommand>, PersistenceError> {
        Ok(sqlx::query_as(
            "SELECT commands.command, call_logs.calls_count FROM call_logs INNER JOIN commands ON commands.id = call_logs.command_id ORDER BY call_logs.calls_count DESC, commands.command ASC",
        )
        .fetch_all(&**self.connection)
        .await?)
    }
}

pub struct DbMessageRepository {
    connection: Ref<DatabaseConnection>,
}

#[injectable(MessageRepository)]
impl DbMessageRepository {
    #[inject]
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        DbMessageRepository { connection }
    }
}

#[async_trait]
impl MessageRepository for DbMessageRepository {
    async fn ensure_chatroom(&self, chat_id: i64) -> Result<(), PersistenceError> {
        sqlx::query("INSERT OR IGNORE INTO chatrooms (chat_id) VALUES (?)")
            .bind(chat_id)
            .execute(&**self.connection)
            .await?;

        Ok(())
    }

    async fn record_sent(&self, message: NewMessage) -> Result<Message, PersistenceError> {
        Ok(sqlx::query_as(
            "INSERT INTO messages (text, date, message_id, to_whom, chat_id, command_id) VALUES (?, ?, ?, ?, ?, (SELECT id FROM commands WHERE command = ?)) RETURNING *",
        )
            .bind(message.text)
            .bind(message.date)
            .bind(message.message_id)
            .bind(message.to_whom)
            .bind(message.chat_id)
            .bind(message.command)
            .fetch_one(&**self.connection)
            .await?)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, PersistenceError> {
        Ok(sqlx::query_as("SELECT * FROM messages ORDER BY datetime(date) DESC, id DESC")
            .fetch_all(&**self.connection)
            .await?)
    }

    async fn list_chatrooms(&self) -> Result<Vec<Chatroom>, PersistenceError> {
        Ok(sqlx::query_as("SELECT chat_id FROM chatrooms ORDER BY chat_id ASC")
            .fetch_all(&**self.connection)
            .await?)
    }
}
