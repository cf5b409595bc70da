use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_path, join_url, EvidenceStorage, StorageError, StoredObject};

#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// In-process object store for tests and memory-backed dev runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, MemoryObject>>,
    public_base_url: String,
}

impl MemoryStorage {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn get(&self, path: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl EvidenceStorage for MemoryStorage {
    async fn put(&self, path: &str, bytes: &[u8], mime_type: &str) -> Result<StoredObject, StorageError> {
        check_path(path)?;
        self.objects.write().await.insert(
            path.to_string(),
            MemoryObject {
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_string(),
            },
        );
        Ok(StoredObject {
            path: path.to_string(),
            url: join_url(&self.public_base_url, path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}
