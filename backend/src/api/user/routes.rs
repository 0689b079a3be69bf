//! Defines the HTTP routes for the user profile API.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{
    change_password, delete_profile_picture, ftp_download, ftp_upload, get_user_details,
    submit_pdf, submit_text, update_profile_picture,
};
use crate::api::AppState;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/details", get(get_user_details))
        .route(
            "/picture",
            put(update_profile_picture).delete(delete_profile_picture),
        )
        .route("/password", put(change_password))
        .route("/ftp/upload", post(ftp_upload))
        .route("/ftp/download", post(ftp_download))
        .route("/pdf", post(submit_pdf))
        .route("/text", post(submit_text))
}
