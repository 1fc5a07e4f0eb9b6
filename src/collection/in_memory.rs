//! InMemoryCollections - HashMap-backed table store for testing and development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::{
    validate_collection_name, CollectionError, Direction, ListOptions, RemoteCollection,
};
use crate::record::{is_blank, is_scalar, Fields, Record, RecordId};
use crate::schema::Schema;

#[derive(Default)]
struct StoredCollection {
    rows: Vec<Record>,
    next_id: i64,
    required: Vec<String>,
}

impl StoredCollection {
    fn position(&self, id: &RecordId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }
}

/// In-memory table store with the semantics of the hosted one.
///
/// Ids are sequential integers per collection, `created_at` is stamped on
/// insert, and required columns registered through [`with_schema`] behave
/// like `NOT NULL` constraints. Clone-friendly via Arc.
///
/// [`with_schema`]: InMemoryCollections::with_schema
#[derive(Clone, Default)]
pub struct InMemoryCollections {
    storage: Arc<RwLock<HashMap<String, StoredCollection>>>,
}

impl InMemoryCollections {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema so inserts missing its required fields are rejected.
    pub fn with_schema(self, schema: &Schema) -> Self {
        if let Ok(mut storage) = self.storage.write() {
            let stored = storage.entry(schema.collection().to_string()).or_default();
            stored.required = schema
                .required_fields()
                .map(|field| field.name.clone())
                .collect();
        }
        self
    }

    /// Insert records with explicit ids, bypassing id assignment.
    pub fn seed(
        &self,
        collection: &str,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<(), CollectionError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CollectionError::remote_write(collection, "lock poisoned"))?;
        let stored = storage.entry(collection.to_string()).or_default();

        for record in records {
            if let RecordId::Int(n) = record.id {
                stored.next_id = stored.next_id.max(n);
            }
            match stored.position(&record.id) {
                Some(index) => stored.rows[index] = record,
                None => stored.rows.push(record),
            }
        }
        Ok(())
    }

    /// Number of rows currently held for `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.storage
            .read()
            .map(|storage| storage.get(collection).map_or(0, |c| c.rows.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn check_scalars(collection: &str, fields: &Fields) -> Result<(), CollectionError> {
    match fields.iter().find(|(_, value)| !is_scalar(value)) {
        Some((name, _)) => Err(CollectionError::remote_write(
            collection,
            format!("field {} must hold a scalar value", name),
        )),
        None => Ok(()),
    }
}

/// Nulls sort after every other value, as in an ascending SQL order.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl RemoteCollection for InMemoryCollections {
    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, CollectionError> {
        validate_collection_name(collection)?;
        let storage = self
            .storage
            .read()
            .map_err(|_| CollectionError::connectivity(collection, "lock poisoned"))?;

        let mut rows: Vec<Record> = storage
            .get(collection)
            .map(|stored| {
                stored
                    .rows
                    .iter()
                    .filter(|row| options.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &options.order {
            rows.sort_by(|a, b| {
                let left = a.value(&order.column).unwrap_or(Value::Null);
                let right = b.value(&order.column).unwrap_or(Value::Null);
                let ordering = compare_values(&left, &right);
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = options.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn create(&self, collection: &str, draft: &Fields) -> Result<Record, CollectionError> {
        validate_collection_name(collection)?;
        if draft.contains_key("id") {
            return Err(CollectionError::remote_write(
                collection,
                "id is assigned by the store and must be omitted",
            ));
        }
        check_scalars(collection, draft)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| CollectionError::remote_write(collection, "lock poisoned"))?;
        let stored = storage.entry(collection.to_string()).or_default();

        if let Some(missing) = stored
            .required
            .iter()
            .find(|name| draft.get(name.as_str()).map_or(true, is_blank))
        {
            return Err(CollectionError::remote_write(
                collection,
                format!("null value in column {} violates not-null constraint", missing),
            ));
        }

        stored.next_id += 1;
        let mut fields = draft.clone();
        fields
            .entry("created_at")
            .or_insert_with(|| Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)));
        let record = Record::new(stored.next_id, fields);
        stored.rows.push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Fields,
    ) -> Result<Record, CollectionError> {
        validate_collection_name(collection)?;
        if patch.contains_key("id") {
            return Err(CollectionError::remote_write(
                collection,
                "id cannot be changed",
            ));
        }
        check_scalars(collection, patch)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| CollectionError::remote_write(collection, "lock poisoned"))?;
        let stored = storage
            .get_mut(collection)
            .ok_or_else(|| CollectionError::not_found(collection, id))?;
        let index = stored
            .position(id)
            .ok_or_else(|| CollectionError::not_found(collection, id))?;

        if let Some(name) = stored.required.iter().find(|name| {
            patch.get(name.as_str()).is_some_and(is_blank)
        }) {
            return Err(CollectionError::remote_write(
                collection,
                format!("null value in column {} violates not-null constraint", name),
            ));
        }

        let row = &mut stored.rows[index];
        for (name, value) in patch {
            row.fields.insert(name.clone(), value.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), CollectionError> {
        validate_collection_name(collection)?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CollectionError::remote_write(collection, "lock poisoned"))?;
        let stored = storage
            .get_mut(collection)
            .ok_or_else(|| CollectionError::not_found(collection, id))?;
        let index = stored
            .position(id)
            .ok_or_else(|| CollectionError::not_found(collection, id))?;

        stored.rows.remove(index);
        Ok(())
    }
}
