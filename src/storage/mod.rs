//! Blob storage - uploads for image fields (gallery items, blog posts).
//!
//! Only the gateway lives here: hand bytes to the storage service and get
//! back the public URL to put in a record field. Resizing, retries, and
//! other pipeline concerns belong to the service.

#[cfg(feature = "http")]
mod http;
mod in_memory;

use async_trait::async_trait;

use crate::collection::CollectionError;

#[cfg(feature = "http")]
pub use http::RestBlobStore;
pub use in_memory::InMemoryBlobStore;

/// Object storage addressed by bucket and path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `bucket/path` and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CollectionError>;

    /// The public URL an object at `bucket/path` is served from.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Reject paths that would escape the bucket or address nothing.
pub(crate) fn validate_object_path(bucket: &str, path: &str) -> Result<(), CollectionError> {
    let bucket_ok = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !bucket_ok {
        return Err(CollectionError::remote_write(bucket, "invalid bucket name"));
    }
    let path_ok = !path.is_empty()
        && !path.starts_with('/')
        && path.split('/').all(|segment| !segment.is_empty() && segment != "..");
    if !path_ok {
        return Err(CollectionError::remote_write(
            bucket,
            format!("invalid object path {:?}", path),
        ));
    }
    Ok(())
}
