//! Generic data models for the `adapters` crate.
//!
//! These models describe the values handed to the adapters by the backend:
//! the FTP connection parameters, the secret credential wrapper and the
//! content of an uploaded object.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{AdapterError, Result};

/// Password or token that must never show up in logs.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Parameters for one connection to the remote file-transfer endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub credential: Credential,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        credential: impl Into<Credential>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            credential: credential.into(),
        }
    }

    /// Rejects configs that cannot possibly produce a session.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AdapterError::InvalidInput("host must not be empty".into()));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(AdapterError::InvalidInput(format!(
                "host {:?} contains whitespace",
                self.host
            )));
        }
        if self.port == 0 {
            return Err(AdapterError::InvalidInput("port must be a positive integer".into()));
        }
        if self.username.is_empty() {
            return Err(AdapterError::InvalidInput("username must not be empty".into()));
        }
        if self.credential.is_empty() {
            return Err(AdapterError::InvalidInput("credential must not be empty".into()));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Object handed to the [`ObjectStore`](crate::storage::ObjectStore).
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: bytes::Bytes,
    pub content_type: String,
}
