//! Optional read replica of the bot's SQLite database.
//!
//! The gateway never writes here; the bot owns the file. sqlx's SQLite
//! driver runs its blocking calls on a bounded worker pool, so reads never
//! block the actix event loop.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::AppError;

pub mod payments;

pub async fn connect(path: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(format!("sqlite://{path}?mode=ro"));
    options.max_connections(4).sqlx_logging(false);
    Database::connect(options)
        .await
        .map_err(|e| AppError::db(format!("failed to open local cache at {path}: {e}")))
}
