//! Profile operations for the signed-in user.
//!
//! This service orchestrates the user store, the object store, the credential
//! hasher and remote transfer sessions. Each operation validates its input
//! before any external call is made.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::crypt::CredentialHasher;
use adapters::ftp::FtpConnector;
use adapters::storage::ObjectStore;
use adapters::{AdapterError, ConnectionConfig, StoredObject};
use serde::{Deserialize, Serialize};

use super::remote_transfer::{run_transfer, TransferRequest};
use super::validation::{
    resolve_local_path, validate_password, validate_picture, validate_remote_path, PictureUpload,
};
use crate::database::{UserRecord, UserStore, UserUpdate};
use crate::errors::{AppError, Result};

pub const UPLOAD_SUCCESS: &str = "Upload successful";
pub const DOWNLOAD_SUCCESS: &str = "Download successful";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePicture {
    pub profile_picture: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpTransferBody {
    pub local_file_path: String,
    pub remote_file_path: String,
}

impl FtpTransferBody {
    /// Checks both paths and returns the local one, joined onto `local_root`
    /// when set.
    fn validate(&self, local_root: Option<&Path>) -> Result<PathBuf> {
        let local = resolve_local_path(&self.local_file_path, "localFilePath", local_root)?;
        validate_remote_path(&self.remote_file_path, "remoteFilePath")?;
        Ok(local)
    }
}

pub struct UserProfileService {
    users: Arc<dyn UserStore>,
    objects: Arc<dyn ObjectStore>,
    hasher: Arc<dyn CredentialHasher>,
    connector: Arc<dyn FtpConnector>,
    ftp: ConnectionConfig,
    local_root: Option<PathBuf>,
    environment: String,
}

impl UserProfileService {
    pub fn new(
        users: Arc<dyn UserStore>,
        objects: Arc<dyn ObjectStore>,
        hasher: Arc<dyn CredentialHasher>,
        connector: Arc<dyn FtpConnector>,
        ftp: ConnectionConfig,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            users,
            objects,
            hasher,
            connector,
            ftp,
            local_root: None,
            environment: environment.into(),
        }
    }

    /// Restricts FTP local paths to relative paths under `root`.
    ///
    /// Without a root the local path of a transfer is any path the process
    /// can read or write.
    pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = Some(root.into());
        self
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub fn get_user_details(&self, user: &UserRecord) -> UserRecord {
        user.clone()
    }

    /// Object-store key of a user's picture.
    pub fn picture_key(&self, user_id: &str) -> String {
        format!("{}-profile-pictures/{}", self.environment, user_id)
    }

    #[tracing::instrument(skip_all, fields(user = %user.id))]
    pub async fn update_profile_picture(
        &self,
        user: &UserRecord,
        picture: Option<PictureUpload>,
    ) -> Result<ProfilePicture> {
        let picture = validate_picture(picture.as_ref())?;
        let key = self.picture_key(&user.id);

        let location = self
            .objects
            .put(
                &key,
                StoredObject {
                    bytes: picture.bytes.clone(),
                    content_type: picture.content_type.clone(),
                },
            )
            .await?;

        self.users
            .update_user(&user.id, UserUpdate::profile_picture(location.clone()))
            .await?;

        tracing::info!(%location, "profile picture updated");
        Ok(ProfilePicture {
            profile_picture: location,
        })
    }

    #[tracing::instrument(skip_all, fields(user = %user.id))]
    pub async fn delete_profile_picture(&self, user: &UserRecord) -> Result<()> {
        let key = self.picture_key(&user.id);
        self.objects.delete(&key).await?;
        self.users
            .update_user(&user.id, UserUpdate::profile_picture(""))
            .await?;
        tracing::info!("profile picture removed");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(user = %user.id))]
    pub async fn change_password(&self, user: &UserRecord, request: ChangePassword) -> Result<()> {
        validate_password(&request.old_password)?;
        validate_password(&request.new_password)?;

        let stored = self
            .users
            .find_user(&user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user.id)))?;

        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || {
            if !hasher.compare(&request.old_password, &stored.password_hash)? {
                return Ok(None);
            }
            hasher.hash(&request.new_password).map(Some)
        })
        .await
        .map_err(|err| AdapterError::Hash(err.to_string()))??;

        let Some(hash) = hash else {
            return Err(AppError::PasswordMismatch);
        };

        self.users
            .update_user(&user.id, UserUpdate::password_hash(hash))
            .await?;
        tracing::info!("password changed");
        Ok(())
    }

    /// Sends a local file to the FTP server over a fresh session.
    pub async fn ftp_upload(&self, body: FtpTransferBody) -> Result<&'static str> {
        let local = body.validate(self.local_root.as_deref())?;
        let request = TransferRequest::upload(local, body.remote_file_path);
        run_transfer(self.connector.as_ref(), &self.ftp, &request).await?;
        Ok(UPLOAD_SUCCESS)
    }

    /// Fetches a file from the FTP server over a fresh session.
    pub async fn ftp_download(&self, body: FtpTransferBody) -> Result<&'static str> {
        let local = body.validate(self.local_root.as_deref())?;
        let request = TransferRequest::download(body.remote_file_path, local);
        run_transfer(self.connector.as_ref(), &self.ftp, &request).await?;
        Ok(DOWNLOAD_SUCCESS)
    }
}
