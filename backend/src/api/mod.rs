//! Central module for organizing the application's main API endpoints.
//!
//! This module holds the shared handler state and assembles the router from
//! the individual API domains.

pub mod user;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};

use crate::middleware;
use crate::services::{AssistantService, UserProfileService};

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<UserProfileService>,
    pub assistant: Arc<AssistantService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/api/user", user::routes::user_router())
        .layer(middleware::body_limit())
        .layer(middleware::trace_layer())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Welcome to the profile backend!"
}

/// Success envelope shared by all handlers.
pub fn success<T: Serialize>(data: T, message: &str) -> axum::Json<Value> {
    axum::Json(json!({ "status": 1, "data": data, "message": message }))
}
