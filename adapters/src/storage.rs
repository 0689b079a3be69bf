//! Object-store adapter used for profile pictures.
//!
//! The backend only needs `put` and `delete` by key; the production
//! implementation keeps objects on the local filesystem under a root
//! directory that a static file server or CDN publishes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::errors::{AdapterError, Result};
use crate::models::StoredObject;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `object` under `key` and returns its public location.
    async fn put(&self, key: &str, object: StoredObject) -> Result<String>;

    /// Removes the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public location an object stored under `key` is served from.
    fn location(&self, key: &str) -> String;
}

/// Filesystem-backed store.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to a path under the root, refusing anything that escapes it.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(AdapterError::Storage(format!("invalid object key {key:?}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, object: StoredObject) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(&object.bytes).await?;
        file.sync_all().await?;

        log::debug!(
            "stored {} bytes ({}) at {}",
            object.bytes.len(),
            object.content_type,
            path.display()
        );
        Ok(self.location(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(bytes: &'static [u8]) -> StoredObject {
        StoredObject {
            bytes: bytes::Bytes::from_static(bytes),
            content_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example.com/public/");

        let location = store.put("dev-profile-pictures/42", object(b"png")).await.unwrap();
        assert_eq!(location, "https://cdn.example.com/public/dev-profile-pictures/42");
        assert!(dir.path().join("dev-profile-pictures/42").exists());

        store.delete("dev-profile-pictures/42").await.unwrap();
        assert!(!dir.path().join("dev-profile-pictures/42").exists());
        store.delete("dev-profile-pictures/42").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_keys_escaping_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "http://localhost");

        assert!(store.put("../outside", object(b"x")).await.is_err());
        assert!(store.put("/etc/passwd", object(b"x")).await.is_err());
        assert!(store.delete("").await.is_err());
    }
}
