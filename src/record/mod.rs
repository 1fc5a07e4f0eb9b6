//! Records - rows of a remote collection and the drafts that create them.
//!
//! A [`Record`] is a server-confirmed row: a [`RecordId`] assigned by the
//! store plus a flat mapping of field names to scalar JSON values. A
//! [`Draft`] is the same mapping without an id, owned by a form until it is
//! submitted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::CollectionError;

/// Field name to value mapping shared by records, drafts, and patches.
pub type Fields = serde_json::Map<String, Value>;

/// Result of a list request: the rows, or a typed error. Never both.
pub type FetchResult = Result<Vec<Record>, CollectionError>;

/// Server-assigned record identifier.
///
/// Stores hand out either integer keys (serial columns) or text keys
/// (uuids). The identifier never changes once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// The id as a JSON value, for comparisons against field values.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Interpret a JSON value as an id. Only integers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// A row as confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field by name. `"id"` resolves to the record id.
    pub fn value(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(self.id.to_value());
        }
        self.fields.get(name).cloned()
    }

    /// Borrow a field as a string, if it is one.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Creation timestamp, when the store provides one.
    pub fn created_at(&self) -> Option<&str> {
        self.str("created_at")
    }

    /// Copy the editable fields into a fresh draft.
    pub fn to_draft(&self) -> Draft {
        let mut fields = self.fields.clone();
        fields.remove("created_at");
        fields.remove("updated_at");
        Draft::from_fields(fields)
    }
}

/// A partially filled record that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft {
    fields: Fields,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a draft from a field map. Any `id` key is dropped.
    pub fn from_fields(mut fields: Fields) -> Self {
        fields.remove("id");
        Self { fields }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Merge one field into the draft, leaving the others untouched.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if name == "id" {
            return;
        }
        self.fields.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl From<Fields> for Draft {
    fn from(fields: Fields) -> Self {
        Self::from_fields(fields)
    }
}

/// True when a value counts as "not filled in": null or blank text.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// True for the values a record field may hold.
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
