//! Module for database connection setup and common utilities.
//!
//! This module is responsible for initializing the SQLite connection pool and
//! creating the schema the user store relies on.

pub mod models;
pub mod queries;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub use models::{UserRecord, UserUpdate};
pub use queries::{SqliteUserStore, UserStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    profile_picture TEXT NOT NULL DEFAULT ''
);
"#;

/// Opens the pool and makes sure the schema exists.
///
/// In-memory databases are private to one connection, so they get a pool of one.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::query(SCHEMA).execute(&pool).await?;
    tracing::debug!(url, "database ready");
    Ok(pool)
}
