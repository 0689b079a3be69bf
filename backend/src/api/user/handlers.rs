//! Handler functions for user profile and management API endpoints.
//!
//! These functions parse request data, hand it to the profile and assistant
//! services and wrap the results in the success envelope.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{success, AppState};
use crate::auth::CurrentUser;
use crate::errors::{AppError, Result};
use crate::services::user_profile::{ChangePassword, FtpTransferBody};
use crate::services::validation::PictureUpload;

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

pub async fn get_user_details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<Value> {
    success(state.profiles.get_user_details(&user), "Success")
}

pub async fn update_profile_picture(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let picture = read_picture(multipart).await?;
    let updated = state.profiles.update_profile_picture(&user, picture).await?;
    Ok(success(updated, "Profile picture updated"))
}

pub async fn delete_profile_picture(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    state.profiles.delete_profile_picture(&user).await?;
    Ok(success(Value::Null, "Profile picture deleted"))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ChangePassword>,
) -> Result<Json<Value>> {
    state.profiles.change_password(&user, body).await?;
    Ok(success(Value::Null, "Password changed"))
}

pub async fn ftp_upload(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<FtpTransferBody>,
) -> Result<Json<Value>> {
    let message = state.profiles.ftp_upload(body).await?;
    Ok(success(message, message))
}

pub async fn ftp_download(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<FtpTransferBody>,
) -> Result<Json<Value>> {
    let message = state.profiles.ftp_download(body).await?;
    Ok(success(message, message))
}

pub async fn submit_pdf(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut pdf: Option<Bytes> = None;
    let mut kind = String::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => pdf = Some(field.bytes().await.map_err(bad_multipart)?),
            Some("type") => kind = field.text().await.map_err(bad_multipart)?,
            _ => {}
        }
    }

    let pdf = pdf.ok_or_else(|| AppError::Validation("Please upload a PDF file".into()))?;
    let answer = state.assistant.submit_pdf(pdf, kind.trim()).await?;
    Ok(success(answer, "Success"))
}

pub async fn submit_text(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<TextBody>,
) -> Result<Json<Value>> {
    let answer = state.assistant.submit_text(body.text).await?;
    Ok(success(answer, "Success"))
}

async fn read_picture(mut multipart: Multipart) -> Result<Option<PictureUpload>> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        return Ok(Some(PictureUpload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {err}"))
}
