//! REST transport for remote collections, speaking the PostgREST dialect.
//!
//! Requires the `http` feature. Uses reqwest.
//!
//! ## Requests
//!
//! - `GET {url}/rest/v1/{collection}?select=*&order=col.asc&limit=n&field=eq.value`
//! - `POST {url}/rest/v1/{collection}` with a one-element JSON array body
//! - `PATCH {url}/rest/v1/{collection}?id=eq.{id}` with the patch as body
//! - `DELETE {url}/rest/v1/{collection}?id=eq.{id}`
//!
//! Writes ask for `Prefer: return=representation`; an empty representation
//! from `PATCH` or `DELETE` means no row matched the id.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{validate_collection_name, CollectionError, ListOptions, RemoteCollection};
use crate::config::{ClientConfig, ConfigError};
use crate::record::{Fields, Record, RecordId};
use crate::storage::RestBlobStore;

const REST_PATH: &str = "rest/v1/";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Remote collection client over HTTPS.
///
/// Clone-friendly: the underlying reqwest client pools connections and is
/// shared between clones and with [`RestBlobStore`]s built from it.
#[derive(Clone)]
pub struct RestCollections {
    client: Client,
    base: Url,
    anon_key: String,
}

impl RestCollections {
    /// Build a client whose requests time out after `config.timeout()`.
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

        Ok(Self {
            client,
            base,
            anon_key: config.anon_key().to_string(),
        })
    }

    /// A blob store sharing this client's connection pool and credentials.
    pub fn storage(&self) -> RestBlobStore {
        RestBlobStore::from_parts(self.client.clone(), self.base.clone(), self.anon_key.clone())
    }

    fn table_url(&self, collection: &str) -> Result<Url, CollectionError> {
        validate_collection_name(collection)?;
        self.base
            .join(REST_PATH)
            .and_then(|rest| rest.join(collection))
            .map_err(|e| CollectionError::connectivity(collection, e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&self.anon_key)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    async fn send(
        &self,
        collection: &str,
        request: RequestBuilder,
    ) -> Result<Vec<Record>, CollectionError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(collection, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(collection, e))?;
        if !status.is_success() {
            let err = status_error(collection, status, body.as_ref());
            warn!(collection, status = status.as_u16(), error = %err, "store rejected request");
            return Err(err);
        }

        serde_json::from_slice(body.as_ref())
            .map_err(|e| CollectionError::decode(collection, e.to_string()))
    }
}

/// Render a filter value in PostgREST operator syntax.
fn filter_param(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

fn id_param(id: &RecordId) -> (String, String) {
    ("id".to_string(), format!("eq.{}", id))
}

fn list_query(options: &ListOptions) -> Vec<(String, String)> {
    let mut query = vec![("select".to_string(), "*".to_string())];
    if let Some(order) = &options.order {
        query.push((
            "order".to_string(),
            format!("{}.{}", order.column, order.direction.as_str()),
        ));
    }
    if let Some(limit) = options.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    for filter in &options.filters {
        query.push((filter.field.clone(), filter_param(&filter.value)));
    }
    query
}

fn transport_error(collection: &str, error: reqwest::Error) -> CollectionError {
    if error.is_timeout() {
        CollectionError::connectivity(collection, "request timed out")
    } else if error.is_decode() {
        CollectionError::decode(collection, error.to_string())
    } else {
        CollectionError::connectivity(collection, error.to_string())
    }
}

#[derive(Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    details: Option<String>,
}

fn status_error(collection: &str, status: StatusCode, body: &[u8]) -> CollectionError {
    let message = match serde_json::from_slice::<StoreErrorBody>(body) {
        Ok(StoreErrorBody {
            message: Some(message),
            details: Some(details),
        }) => format!("{} ({})", message, details),
        Ok(StoreErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ => {
            let text = String::from_utf8_lossy(body);
            if text.trim().is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, text.trim())
            }
        }
    };
    CollectionError::remote_write(collection, message)
}

#[async_trait]
impl RemoteCollection for RestCollections {
    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, CollectionError> {
        let url = self.table_url(collection)?;
        debug!(collection, ?options, "listing rows");
        let request = self.request(Method::GET, url).query(&list_query(options));
        self.send(collection, request).await
    }

    async fn create(&self, collection: &str, draft: &Fields) -> Result<Record, CollectionError> {
        if draft.contains_key("id") {
            return Err(CollectionError::remote_write(
                collection,
                "id is assigned by the store and must be omitted",
            ));
        }
        let url = self.table_url(collection)?;
        debug!(collection, fields = draft.len(), "inserting row");
        let request = self
            .request(Method::POST, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[draft]);

        self.send(collection, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::decode(collection, "insert returned no row"))
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Fields,
    ) -> Result<Record, CollectionError> {
        if patch.contains_key("id") {
            return Err(CollectionError::remote_write(collection, "id cannot be changed"));
        }
        if patch.is_empty() {
            return self.get(collection, id).await;
        }
        let url = self.table_url(collection)?;
        debug!(collection, %id, fields = patch.len(), "updating row");
        let request = self
            .request(Method::PATCH, url)
            .query(&[id_param(id)])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);

        self.send(collection, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::not_found(collection, id))
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), CollectionError> {
        let url = self.table_url(collection)?;
        debug!(collection, %id, "deleting row");
        let request = self
            .request(Method::DELETE, url)
            .query(&[id_param(id)])
            .header("Prefer", RETURN_REPRESENTATION);

        let removed = self.send(collection, request).await?;
        if removed.is_empty() {
            Err(CollectionError::not_found(collection, id))
        } else {
            Ok(())
        }
    }
}
