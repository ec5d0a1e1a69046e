//! Pooled SQLite connection

use crate::config::Settings;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::ops::Deref;
use std::str::FromStr;

pub struct DatabaseConnection {
    connection: SqlitePool,
}

impl DatabaseConnection {
    /// Opens the pool described by `settings`, creating the database file if needed.
    pub async fn connect(settings: &Settings) -> Result<DatabaseConnection, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&settings.database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect_with(options)
            .await?;

        info!("database connected: {}", settings.database_url);

        Ok(DatabaseConnection { connection: pool })
    }

    /// Applies all pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.connection).await?;
        info!("database migrations applied");
        Ok(())
    }
}

impl From<SqlitePool> for DatabaseConnection {
    fn from(connection: SqlitePool) -> Self {
        DatabaseConnection { connection }
    }
}

impl Deref for DatabaseConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}
