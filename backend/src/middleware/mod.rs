//! General-purpose middleware for the API.
//!
//! Request tracing and the body-size limit shared by every route.

use axum::extract::DefaultBodyLimit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

/// Largest request body accepted; leaves room for multipart framing around a
/// maximum-size picture or PDF.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

pub fn body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_BODY_BYTES)
}
