//! Profile backend library.
//!
//! Wires the adapters, the user store and the services together and exposes
//! the HTTP router served by the binary.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use adapters::crypt::Argon2Hasher;
use adapters::ftp::TcpFtpConnector;
use adapters::llm::OpenAiClient;
use adapters::pdf::PdfExtract;
use adapters::storage::FsObjectStore;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::database::SqliteUserStore;
use crate::errors::Result;
use crate::services::{AssistantService, UserProfileService};

/// Builds the handler state with the production adapters.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let pool = database::connect(&config.database.url).await?;

    let mut profiles = UserProfileService::new(
        Arc::new(SqliteUserStore::new(pool)),
        Arc::new(FsObjectStore::new(
            config.storage.root.clone(),
            config.storage.public_base_url.clone(),
        )),
        Arc::new(Argon2Hasher::new()),
        Arc::new(TcpFtpConnector::with_timeout(config.ftp_connect_timeout())),
        config.ftp_connection(),
        config.environment.clone(),
    );
    if let Some(root) = &config.ftp.local_root {
        profiles = profiles.with_local_root(root.clone());
    }

    let assistant = AssistantService::new(
        Arc::new(OpenAiClient::new(
            config.llm.api_key.clone(),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
        )),
        Arc::new(PdfExtract),
    );

    Ok(AppState {
        profiles: Arc::new(profiles),
        assistant: Arc::new(assistant),
    })
}
