//! Core `adapters` crate for the external systems behind the profile backend.
//!
//! Each module defines the trait the backend depends on together with one
//! production implementation:
//!
//! - [`ftp`]: `FtpConnector`/`FtpChannel`, a tokio FTP client
//! - [`storage`]: `ObjectStore`, filesystem-backed object storage
//! - [`crypt`]: `CredentialHasher`, Argon2id password hashing
//! - [`llm`]: `ChatCompletion`, OpenAI-compatible chat API
//! - [`pdf`]: `PdfTextExtractor`

pub mod crypt;
pub mod errors;
pub mod ftp;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod storage;

pub use errors::{AdapterError, Result};
pub use models::{ConnectionConfig, Credential, StoredObject};
