//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to the FTP server,
//! the object store, the credential hasher, the chat-completion API or the PDF
//! extractor, providing a unified error type for all adapter interactions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Connection closed by remote host")]
    ConnectionClosed,

    /// Negative completion reply (4xx/5xx) from the remote server.
    #[error("Server replied {code}: {message}")]
    Reply { code: u16, message: String },

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Credential hashing error: {0}")]
    Hash(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("PDF extraction error: {0}")]
    Pdf(String),
}

impl AdapterError {
    /// Returns the reply code when the server rejected a command.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            AdapterError::Reply { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
