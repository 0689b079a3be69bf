//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! and orchestrate interactions between the adapters and the database: the
//! remote transfer session, the user profile operations and the assistant.

pub mod assistant;
pub mod remote_transfer;
pub mod user_profile;
pub mod validation;

pub use assistant::AssistantService;
pub use remote_transfer::{
    run_transfer, RemoteTransferSession, SessionState, TransferDirection, TransferOutcome,
    TransferRequest,
};
pub use user_profile::UserProfileService;
