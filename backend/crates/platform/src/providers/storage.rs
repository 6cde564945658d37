//! Object storage for uploaded learning materials

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ProviderError, ProviderResult};
use crate::crypto::random_bytes;

/// File handed over by the upload layer
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Logical folder, e.g. `materials/<batch id>`
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
    pub size: usize,
}

#[trait_variant::make(ObjectStorage: Send)]
pub trait LocalObjectStorage {
    async fn upload(&self, file: UploadFile) -> ProviderResult<StoredObject>;

    async fn delete(&self, public_id: &str) -> ProviderResult<()>;
}

/// Keeps uploads in process memory; for development and tests
#[derive(Clone)]
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, UploadFile>>>,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.objects.read().await.contains_key(public_id)
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(&self, file: UploadFile) -> ProviderResult<StoredObject> {
        if file.bytes.is_empty() {
            return Err(ProviderError::Rejected {
                provider: "storage",
                message: "empty file".to_string(),
            });
        }

        let folder = file.folder.trim_matches('/');
        let public_id = format!("{}/{}", folder, hex::encode(random_bytes(12)));
        let stored = StoredObject {
            url: format!("{}/{}/{}", self.base_url, public_id, file.file_name),
            public_id: public_id.clone(),
            size: file.bytes.len(),
        };

        tracing::debug!(public_id = %public_id, size = stored.size, "Stored object");
        self.objects.write().await.insert(public_id, file);

        Ok(stored)
    }

    async fn delete(&self, public_id: &str) -> ProviderResult<()> {
        self.objects
            .write()
            .await
            .remove(public_id)
            .map(|_| ())
            .ok_or_else(|| ProviderError::ObjectNotFound(public_id.to_string()))
    }
}
