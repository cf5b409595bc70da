use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{check_path, join_url, EvidenceStorage, StorageError, StoredObject};

/// Files under a root directory, served from `public_base_url`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl EvidenceStorage for LocalStorage {
    async fn put(&self, path: &str, bytes: &[u8], mime_type: &str) -> Result<StoredObject, StorageError> {
        check_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;
        debug!(path, mime_type, size = bytes.len(), "stored evidence object");

        Ok(StoredObject {
            path: path.to_string(),
            url: join_url(&self.public_base_url, path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        check_path(path)?;
        match fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/evidence");

        let stored = storage.put("insp/ev-photo.jpg", b"jpeg bytes", "image/jpeg").await.unwrap();
        assert_eq!(stored.url, "http://localhost:3000/evidence/insp/ev-photo.jpg");
        let on_disk = std::fs::read(dir.path().join("insp/ev-photo.jpg")).unwrap();
        assert_eq!(on_disk, b"jpeg bytes");

        storage.delete("insp/ev-photo.jpg").await.unwrap();
        assert!(matches!(
            storage.delete("insp/ev-photo.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/evidence");
        assert!(matches!(
            storage.put("../outside.jpg", b"x", "image/jpeg").await,
            Err(StorageError::InvalidPath(_))
        ));
    }
}
