//! Module for user profile and management API endpoints.
//!
//! This module handles the signed-in user's profile: details, picture,
//! password, FTP transfers and assistant prompts.

pub mod handlers;
pub mod routes;
