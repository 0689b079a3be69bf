//! Input validation for profile operations.
//!
//! Everything here runs before any external system is touched.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

use crate::errors::{AppError, Result};

pub const MIN_PICTURE_BYTES: usize = 5 * 1024;
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;
pub const PICTURE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 64;

/// Picture as received from a multipart form.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

pub fn validate_picture(picture: Option<&PictureUpload>) -> Result<&PictureUpload> {
    let picture = picture.ok_or_else(|| AppError::Validation("Please upload a photo".into()))?;

    if !PICTURE_TYPES.contains(&picture.content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported photo type {}; use jpeg or png",
            picture.content_type
        )));
    }
    if picture.bytes.len() < MIN_PICTURE_BYTES || picture.bytes.len() > MAX_PICTURE_BYTES {
        return Err(AppError::Validation(
            "Photo size must be between 5 KB and 5 MB".into(),
        ));
    }
    Ok(picture)
}

/// Requires a lowercase and an uppercase letter, a digit and a special character.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    let length = password.chars().count();
    let complete = password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) || !complete {
        return Err(AppError::Validation(format!(
            "Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters with upper and lower case letters, a digit and a special character"
        )));
    }
    Ok(())
}

pub fn validate_required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Remote paths are sent on the FTP control channel, one command per line.
pub fn validate_remote_path(value: &str, field: &str) -> Result<()> {
    validate_required(value, field)?;
    if value.contains(['\r', '\n', '\0']) {
        return Err(AppError::Validation(format!(
            "{field} must not contain line breaks or NUL characters"
        )));
    }
    Ok(())
}

/// Confines `value` to `root` when one is configured.
///
/// Under a root only relative paths made of plain components are accepted.
/// Without a root the path is used as given.
pub fn resolve_local_path(value: &str, field: &str, root: Option<&Path>) -> Result<PathBuf> {
    validate_required(value, field)?;
    if value.contains('\0') {
        return Err(AppError::Validation(format!("{field} must not contain NUL characters")));
    }
    let path = Path::new(value);
    let Some(root) = root else {
        return Ok(path.to_path_buf());
    };

    let confined = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !confined {
        return Err(AppError::Validation(format!(
            "{field} must be a relative path inside the transfer directory"
        )));
    }
    Ok(root.join(path))
}
