//! Rust structs that represent database table mappings.
//!
//! `UserRecord` mirrors the `users` table. The password hash is never
//! serialized, so a record can be returned from the API as-is.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Public location of the picture; empty when none is set.
    pub profile_picture: String,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub password_hash: Option<String>,
    pub profile_picture: Option<String>,
}

impl UserUpdate {
    pub fn password_hash(hash: impl Into<String>) -> Self {
        Self {
            password_hash: Some(hash.into()),
            ..Default::default()
        }
    }

    pub fn profile_picture(location: impl Into<String>) -> Self {
        Self {
            profile_picture: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.profile_picture.is_none()
    }
}
