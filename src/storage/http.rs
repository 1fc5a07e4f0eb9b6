//! REST transport for blob uploads.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::{validate_object_path, BlobStore};
use crate::collection::CollectionError;
use crate::config::{ClientConfig, ConfigError};

/// Blob store speaking the hosted storage API:
/// `POST {url}/storage/v1/object/{bucket}/{path}`, served back from
/// `{url}/storage/v1/object/public/{bucket}/{path}`.
#[derive(Clone)]
pub struct RestBlobStore {
    client: Client,
    base: Url,
    anon_key: String,
}

impl RestBlobStore {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(config.url()).map_err(|e| ConfigError::Invalid {
            field: "url",
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "client",
                message: e.to_string(),
            })?;
        Ok(Self::from_parts(client, base, config.anon_key().to_string()))
    }

    pub(crate) fn from_parts(client: Client, base: Url, anon_key: String) -> Self {
        Self {
            client,
            base,
            anon_key,
        }
    }
}

#[async_trait]
impl BlobStore for RestBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CollectionError> {
        validate_object_path(bucket, path)?;
        let url = self
            .base
            .join(&format!("storage/v1/object/{}/{}", bucket, path))
            .map_err(|e| CollectionError::remote_write(bucket, e.to_string()))?;

        debug!(bucket, path, size = bytes.len(), "uploading object");
        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&self.anon_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollectionError::connectivity(bucket, "upload timed out")
                } else {
                    CollectionError::connectivity(bucket, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(bucket, path, status = status.as_u16(), "upload rejected");
            return Err(CollectionError::remote_write(
                bucket,
                format!("{}: {}", status, text.trim()),
            ));
        }

        Ok(self.public_url(bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}storage/v1/object/public/{}/{}",
            self.base.as_str(),
            bucket,
            path
        )
    }
}
