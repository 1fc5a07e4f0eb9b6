//! Schemas - the per-collection field list a page hands to the data layer.
//!
//! A [`Schema`] names the collection, the singular noun used in
//! notifications, the ordered fields a form edits, and the default list
//! ordering. Validation only checks presence of required fields; type
//! checking is left to the store.

use std::fmt;

use serde_json::Value;

use crate::collection::{Direction, ListOptions, OrderBy};
use crate::record::{is_blank, Draft, Fields};

/// How a field is edited. Drives input coercion in forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
    Email,
    Url,
    Date,
    Time,
    Number,
    Checkbox,
    Select(Vec<String>),
}

impl InputKind {
    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputKind::Select(options.into_iter().map(Into::into).collect())
    }

    /// Convert raw input text into the value stored for this kind.
    ///
    /// Blank input becomes null. Numbers that do not parse stay text so the
    /// store can reject them with its own message.
    pub fn coerce(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self {
            InputKind::Checkbox => {
                Value::Bool(matches!(trimmed, "true" | "on" | "1" | "yes"))
            }
            _ if trimmed.is_empty() => Value::Null,
            InputKind::Number => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else if let Some(n) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                {
                    Value::Number(n)
                } else {
                    Value::from(raw)
                }
            }
            InputKind::TextArea => Value::from(raw),
            _ => Value::from(trimmed),
        }
    }
}

/// One editable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: InputKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

/// A required field was absent or blank at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub collection: String,
    pub missing: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing required fields for {}: {}",
            self.collection,
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for ValidationError {}

/// Field layout and labels for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    collection: String,
    singular: String,
    fields: Vec<FieldSpec>,
    order: Option<OrderBy>,
}

impl Schema {
    /// `collection` is the remote name ("blog_posts"); `singular` is the
    /// noun used in messages ("blog post").
    pub fn new(collection: impl Into<String>, singular: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            singular: singular.into(),
            fields: Vec::new(),
            order: None,
        }
    }

    /// Append a field. A later spec with the same name replaces the earlier one.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn ordered_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(OrderBy::new(column, direction));
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn singular(&self) -> &str {
        &self.singular
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn default_order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    /// List options a page starts with: the default ordering, no filters.
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            order: self.order.clone(),
            ..ListOptions::default()
        }
    }

    /// A draft with every field present and null, for a "new" form.
    pub fn blank_draft(&self) -> Draft {
        let mut draft = Draft::new();
        for field in &self.fields {
            let value = match field.kind {
                InputKind::Checkbox => Value::Bool(false),
                _ => Value::Null,
            };
            draft.set(field.name.clone(), value);
        }
        draft
    }

    /// Every required field must be present and non-blank.
    pub fn validate_draft(&self, draft: &Draft) -> Result<(), ValidationError> {
        let missing: Vec<String> = self
            .required_fields()
            .filter(|f| draft.get(&f.name).map_or(true, is_blank))
            .map(|f| f.name.clone())
            .collect();
        self.result(missing)
    }

    /// Required fields that a patch touches must not be blanked.
    pub fn validate_patch(&self, patch: &Fields) -> Result<(), ValidationError> {
        let missing: Vec<String> = self
            .required_fields()
            .filter(|f| patch.get(&f.name).is_some_and(is_blank))
            .map(|f| f.name.clone())
            .collect();
        self.result(missing)
    }

    fn result(&self, missing: Vec<String>) -> Result<(), ValidationError> {
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                collection: self.collection.clone(),
                missing,
            })
        }
    }
}
