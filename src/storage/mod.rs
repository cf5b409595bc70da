//! Evidence file storage.
//!
//! Evidence metadata lives in the datastore; the bytes go through an
//! [`EvidenceStorage`] backend addressed by a relative object path
//! (`{inspection_id}/{evidence_id}-{file_name}`).

pub mod local;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a stored object ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait EvidenceStorage: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8], mime_type: &str) -> Result<StoredObject, StorageError>;
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

pub fn object_path(inspection_id: Uuid, evidence_id: Uuid, file_name: &str) -> String {
    format!("{}/{}-{}", inspection_id, evidence_id, file_name)
}

/// Relative, non-empty segments only; no `..`, no absolute paths, no backslashes
pub fn check_path(path: &str) -> Result<(), StorageError> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
