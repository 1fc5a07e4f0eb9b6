//! Remote collections - the gateway between pages and the hosted table store.
//!
//! [`RemoteCollection`] is a thin, stateless contract over one store: list,
//! create, update, and delete rows of a named collection. Implementations
//! never cache and never swallow errors; every call returns a typed result.
//!
//! ## Example
//!
//! ```ignore
//! use clubsync::{InMemoryCollections, ListOptions, RemoteCollection, Draft};
//!
//! let store = InMemoryCollections::new();
//! let created = store
//!     .create("events", Draft::new().with("title", "Tech Talk").fields())
//!     .await?;
//! let upcoming = store
//!     .list("events", &ListOptions::new().ascending("date").limit(3))
//!     .await?;
//! ```

mod error;
#[cfg(feature = "http")]
mod http;
mod in_memory;
mod typed;

use async_trait::async_trait;
use serde_json::Value;

use crate::record::{Fields, Record, RecordId};

pub use error::{CollectionError, ErrorKind};
#[cfg(feature = "http")]
pub use http::RestCollections;
pub use in_memory::InMemoryCollections;
pub use typed::{CollectionsExt, Row, TypedCollection};

/// Sort direction for a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Ordering key and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Equality filter `field = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.value(&self.field).unwrap_or(Value::Null);
        actual == self.value
    }
}

/// Options for [`RemoteCollection::list`].
///
/// No pagination cursor; `limit` caps the row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
    pub filters: Vec<Filter>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(OrderBy::new(column, direction));
        self
    }

    pub fn ascending(self, column: impl Into<String>) -> Self {
        self.order_by(column, Direction::Ascending)
    }

    pub fn descending(self, column: impl Into<String>) -> Self {
        self.order_by(column, Direction::Descending)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add an equality filter. Several filters must all match.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }
}

/// CRUD access to named collections of a remote table store.
///
/// All operations are network calls and the only suspension points of the
/// data layer. Timeouts belong to the transport and surface as
/// [`CollectionError::Connectivity`].
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Fetch rows matching `options`, ordered and capped as requested.
    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, CollectionError>;

    /// Insert a new record. The draft must not carry an `id`; the created
    /// record comes back with the id the store assigned.
    async fn create(&self, collection: &str, draft: &Fields) -> Result<Record, CollectionError>;

    /// Apply a partial update. Fields absent from `patch` keep their values.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Fields,
    ) -> Result<Record, CollectionError>;

    /// Delete one record. Deleting a missing id is an error, not a no-op.
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), CollectionError>;

    /// Fetch a single record by id.
    async fn get(&self, collection: &str, id: &RecordId) -> Result<Record, CollectionError> {
        let options = ListOptions::new().where_eq("id", id.to_value()).limit(1);
        self.list(collection, &options)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::not_found(collection, id))
    }

    /// Cheap reachability check: a one-row list whose rows are discarded.
    async fn ping(&self, collection: &str) -> Result<(), CollectionError> {
        self.list(collection, &ListOptions::new().limit(1))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<C: RemoteCollection + ?Sized> RemoteCollection for std::sync::Arc<C> {
    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, CollectionError> {
        (**self).list(collection, options).await
    }

    async fn create(&self, collection: &str, draft: &Fields) -> Result<Record, CollectionError> {
        (**self).create(collection, draft).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Fields,
    ) -> Result<Record, CollectionError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), CollectionError> {
        (**self).delete(collection, id).await
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<Record, CollectionError> {
        (**self).get(collection, id).await
    }

    async fn ping(&self, collection: &str) -> Result<(), CollectionError> {
        (**self).ping(collection).await
    }
}

/// Collection names are plain identifiers; anything else never reaches the store.
pub(crate) fn validate_collection_name(collection: &str) -> Result<(), CollectionError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CollectionError::remote_write(
            collection,
            "collection name must be a non-empty identifier",
        ))
    }
}
