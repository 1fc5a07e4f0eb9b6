//! Form binding - draft state for create and edit forms.
//!
//! [`FormBinding`] holds the draft a form edits and, when editing, the id of
//! the record being changed. It knows nothing about specific fields beyond
//! the schema it was built with. Submitting validates locally first; a blank
//! required field never reaches the network.

use serde_json::Value;

use crate::collection::RemoteCollection;
use crate::controller::{ListController, Outcome, SubmitError};
use crate::record::{Draft, Record, RecordId};
use crate::schema::{Schema, ValidationError};

pub struct FormBinding {
    schema: Schema,
    draft: Draft,
    target: Option<RecordId>,
}

impl FormBinding {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            draft: Draft::new(),
            target: None,
        }
    }

    /// A form over the same schema as `controller`.
    pub fn for_controller<C: RemoteCollection + ?Sized>(controller: &ListController<C>) -> Self {
        Self::new(controller.schema().clone())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn edit_target(&self) -> Option<&RecordId> {
        self.target.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    /// Merge one field into the draft.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.draft.set(name, value);
    }

    /// Set a field from raw input text, coerced by the field's input kind.
    /// Fields the schema does not know are stored as text.
    pub fn set_input(&mut self, name: &str, raw: &str) {
        let value = match self.schema.field_spec(name) {
            Some(spec) => spec.kind.coerce(raw),
            None => Value::from(raw),
        };
        self.draft.set(name, value);
    }

    /// Replace the draft wholesale. The edit target is left as is.
    pub fn reset(&mut self, initial: Draft) {
        self.draft = initial;
    }

    /// Load an existing record for editing.
    pub fn edit(&mut self, record: &Record) {
        self.draft = record.to_draft();
        self.target = Some(record.id.clone());
    }

    /// Drop the draft and any edit target.
    pub fn cancel(&mut self) {
        self.draft = Draft::new();
        self.target = None;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schema.validate_draft(&self.draft)
    }

    /// Create or update through `controller`, depending on the edit target.
    ///
    /// A validation failure is returned as `Err` without touching the
    /// controller or emitting a notification. The draft and edit target are
    /// cleared only when the controller applied the change.
    pub async fn submit<C: RemoteCollection + ?Sized>(
        &mut self,
        controller: &ListController<C>,
    ) -> Result<Outcome<Record, SubmitError>, ValidationError> {
        self.validate()?;

        let outcome = match &self.target {
            Some(id) => {
                controller
                    .submit_update(id, self.draft.fields().clone())
                    .await
            }
            None => controller.submit_create(self.draft.clone()).await,
        };

        if outcome.is_applied() {
            self.cancel();
        }
        Ok(outcome)
    }
}
