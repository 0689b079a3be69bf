//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct database operations behind the
//! `UserStore` trait, so services can run against SQLite in production and
//! against an in-memory database in tests.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{UserRecord, UserUpdate};
use crate::errors::{AppError, Result};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Merges `update` into the record; untouched columns keep their value.
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<()>;

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRecord>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, profile_picture FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        // COALESCE keeps the stored value for every column left as NULL.
        let result = sqlx::query(
            "UPDATE users SET
                password_hash = COALESCE(?, password_hash),
                profile_picture = COALESCE(?, profile_picture)
             WHERE id = ?",
        )
        .bind(update.password_hash)
        .bind(update.profile_picture)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {id}")));
        }
        Ok(())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRecord> {
        let user = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            profile_picture: String::new(),
        };

        sqlx::query("INSERT INTO users (id, email, password_hash, profile_picture) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.profile_picture)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }
}
