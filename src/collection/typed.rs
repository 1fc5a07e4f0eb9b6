//! TypedCollection - Typed accessor for rows of a specific collection.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{CollectionError, ListOptions, RemoteCollection};
use crate::record::{Fields, Record, RecordId};

/// Trait for types that map onto the rows of one collection.
pub trait Row: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this row type (e.g., "events", "clubs").
    const COLLECTION: &'static str;

    /// The server-assigned id, once the row has been stored.
    fn id(&self) -> Option<&RecordId>;
}

/// Typed wrapper for accessing rows of a specific type.
pub struct TypedCollection<'a, C: ?Sized, R> {
    client: &'a C,
    _marker: PhantomData<R>,
}

impl<'a, C: RemoteCollection + ?Sized, R: Row> TypedCollection<'a, C, R> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    /// List rows, decoding each record into `R`.
    pub async fn list(&self, options: &ListOptions) -> Result<Vec<R>, CollectionError> {
        self.client
            .list(R::COLLECTION, options)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Get one row by id.
    pub async fn get(&self, id: &RecordId) -> Result<R, CollectionError> {
        decode(self.client.get(R::COLLECTION, id).await?)
    }

    /// Insert a row. Its `id`, if any, is ignored; the stored row is returned.
    pub async fn create(&self, row: &R) -> Result<R, CollectionError> {
        let fields = encode(row)?;
        decode(self.client.create(R::COLLECTION, &fields).await?)
    }

    /// Overwrite every field of a stored row with the values in `row`.
    pub async fn update(&self, row: &R) -> Result<R, CollectionError> {
        let id = row.id().cloned().ok_or_else(|| {
            CollectionError::remote_write(R::COLLECTION, "row has not been stored yet")
        })?;
        let mut fields = encode(row)?;
        fields.remove("created_at");
        decode(self.client.update(R::COLLECTION, &id, &fields).await?)
    }

    /// Apply a partial update to a stored row.
    pub async fn patch(&self, id: &RecordId, patch: &Fields) -> Result<R, CollectionError> {
        decode(self.client.update(R::COLLECTION, id, patch).await?)
    }

    /// Delete a row by id.
    pub async fn delete(&self, id: &RecordId) -> Result<(), CollectionError> {
        self.client.delete(R::COLLECTION, id).await
    }
}

fn encode<R: Row>(row: &R) -> Result<Fields, CollectionError> {
    match serde_json::to_value(row) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("id");
            Ok(fields)
        }
        Ok(_) => Err(CollectionError::decode(
            R::COLLECTION,
            "row does not serialize to an object",
        )),
        Err(e) => Err(CollectionError::decode(R::COLLECTION, e.to_string())),
    }
}

fn decode<R: Row>(record: Record) -> Result<R, CollectionError> {
    serde_json::to_value(&record)
        .and_then(serde_json::from_value)
        .map_err(|e| CollectionError::decode(R::COLLECTION, e.to_string()))
}

/// Extension trait for typed row access on any remote collection client.
pub trait CollectionsExt: RemoteCollection {
    /// Get a typed accessor for the collection `R` lives in.
    fn collection<R: Row>(&self) -> TypedCollection<'_, Self, R> {
        TypedCollection::new(self)
    }
}

impl<C: RemoteCollection + ?Sized> CollectionsExt for C {}
