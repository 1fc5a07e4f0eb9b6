use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{validate_object_path, BlobStore};
use crate::collection::CollectionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory blob store. Objects are keyed `"bucket/path"`; uploading to an
/// existing key fails, as the hosted service does without upsert.
#[derive(Clone)]
pub struct InMemoryBlobStore {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://storage/")
    }
}

impl InMemoryBlobStore {
    /// Create an empty store whose public URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredBlob> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(&format!("{}/{}", bucket, path)).cloned())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CollectionError> {
        validate_object_path(bucket, path)?;
        let key = format!("{}/{}", bucket, path);
        let mut objects = self
            .objects
            .write()
            .map_err(|_| CollectionError::remote_write(bucket, "lock poisoned"))?;

        if objects.contains_key(&key) {
            return Err(CollectionError::remote_write(
                bucket,
                format!("object {} already exists", path),
            ));
        }
        objects.insert(
            key,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{}/{}", self.base_url, bucket, path)
    }
}
