use std::fs;
use std::path::PathBuf;

use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err.0)
    }
}

/// Durable image blob storage reachable through a stable public URL. The rest
/// of the system only ever sees URLs; swapping the filesystem for an
/// S3-compatible store is a matter of providing another implementation.
pub trait ImageStore: Send + Sync {
    /// Stores one blob and returns its public URL.
    fn put(&self, bytes: &[u8], extension: &str) -> Result<String, StorageError>;

    /// Removes the blob behind a URL previously returned by `put`. Returns
    /// `false` when the store held nothing for that URL.
    fn delete(&self, url: &str) -> Result<bool, StorageError>;
}

/// Local-disk store: blobs live under `root`, served under `base_url`.
pub struct FsImageStore {
    root: PathBuf,
    base_url: String,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ImageStore for FsImageStore {
    fn put(&self, bytes: &[u8], extension: &str) -> Result<String, StorageError> {
        let key = format!("listings/{}.{}", Uuid::new_v4(), extension);
        let path = self.key_to_path(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError(format!("create {}: {}", parent.display(), e)))?;
        }
        fs::write(&path, bytes)
            .map_err(|e| StorageError(format!("write {}: {}", path.display(), e)))?;
        info!("stored image blob {} ({} bytes)", key, bytes.len());
        Ok(format!("{}/{}", self.base_url, key))
    }

    fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let Some(key) = url.strip_prefix(&self.base_url).map(|k| k.trim_start_matches('/')) else {
            return Ok(false);
        };
        let path = self.key_to_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| StorageError(format!("remove {}: {}", path.display(), e)))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_stores_under_public_base() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsImageStore::new(dir.path(), "http://localhost:8000/media/");

        let url = store.put(b"jpeg-bytes", "jpg").expect("put");
        assert!(url.starts_with("http://localhost:8000/media/listings/"));
        assert!(url.ends_with(".jpg"));

        let key = url.strip_prefix("http://localhost:8000/media/").expect("key");
        assert_eq!(fs::read(dir.path().join(key)).expect("read"), b"jpeg-bytes");
    }

    #[test]
    fn delete_removes_backing_file() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsImageStore::new(dir.path(), "http://localhost:8000/media");

        let url = store.put(b"bytes", "png").expect("put");
        assert!(store.delete(&url).expect("delete"));

        let key = url.strip_prefix("http://localhost:8000/media/").expect("key");
        assert!(!dir.path().join(key).exists());
    }

    #[test]
    fn delete_of_unknown_url_reports_false() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsImageStore::new(dir.path(), "http://localhost:8000/media");

        assert!(!store.delete("http://localhost:8000/media/listings/gone.jpg").expect("delete"));
        assert!(!store.delete("http://elsewhere/other.jpg").expect("delete"));
    }
}
