//! List controllers - the local view of one collection for one page.
//!
//! A [`ListController`] owns the rows a page shows, routes every mutation
//! through a [`RemoteCollection`], reconciles its rows on success, and turns
//! every failure into exactly one error notification. It never hands an
//! error back as a panic or an unhandled `Err`; callers get an [`Outcome`].
//!
//! ## Load ordering
//!
//! Each `load()` takes a ticket. Only the result of the most recently started
//! load is applied; once a newer load has started, an older one is
//! superseded and its result, rows or error, is dropped without a
//! notification.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clubsync::{catalog, InMemoryCollections, ListController, LogNotifier, Draft};
//!
//! let client = Arc::new(InMemoryCollections::new());
//! let events = ListController::new(client, catalog::events(), Arc::new(LogNotifier::new()));
//!
//! events.load().await;
//! events.submit_create(Draft::new().with("title", "Tech Talk")).await;
//! ```

mod outcome;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::collection::{CollectionError, ListOptions, RemoteCollection};
use crate::notify::{Notification, Notifier};
use crate::record::{Draft, Fields, Record, RecordId};
use crate::schema::Schema;

pub use outcome::{Outcome, SubmitError};

/// Lifecycle of a controller's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// Rows reflect the last successful load.
    Ready,
    /// The most recent load failed. Rows from earlier loads are kept.
    Failed,
    /// Ready, with at least one create/update/delete in flight.
    Mutating,
}

/// What a page should render.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    /// No rows have arrived yet.
    Loading,
    /// A load succeeded and the collection is empty.
    Empty,
    Rows(Vec<Record>),
    /// The first load failed; offer a retry instead of an empty list.
    Unavailable { message: String },
}

struct ControllerState {
    phase: Phase,
    rows: Vec<Record>,
    loaded: bool,
    issued: u64,
    last_error: Option<String>,
    mutations: usize,
    disposed: bool,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            rows: Vec::new(),
            loaded: false,
            issued: 0,
            last_error: None,
            mutations: 0,
            disposed: false,
        }
    }
}

/// Local view and mutation broker for one collection.
pub struct ListController<C: ?Sized> {
    client: Arc<C>,
    schema: Schema,
    options: ListOptions,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ControllerState>,
}

impl<C: RemoteCollection + ?Sized> ListController<C> {
    /// Lists with the schema's default ordering until
    /// [`with_options`](Self::with_options) says otherwise.
    pub fn new(client: Arc<C>, schema: Schema, notifier: Arc<dyn Notifier>) -> Self {
        let options = schema.list_options();
        Self {
            client,
            schema,
            options,
            notifier,
            state: Mutex::new(ControllerState::new()),
        }
    }

    pub fn with_options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn collection(&self) -> &str {
        self.schema.collection()
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn phase(&self) -> Phase {
        let state = self.state();
        match state.phase {
            Phase::Ready if state.mutations > 0 => Phase::Mutating,
            phase => phase,
        }
    }

    /// Snapshot of the current rows.
    pub fn rows(&self) -> Vec<Record> {
        self.state().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.state().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().rows.is_empty()
    }

    pub fn row(&self, id: &RecordId) -> Option<Record> {
        self.state().rows.iter().find(|row| &row.id == id).cloned()
    }

    /// Message of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// True when the first load failed and nothing has been shown yet.
    pub fn needs_retry(&self) -> bool {
        let state = self.state();
        state.phase == Phase::Failed && !state.loaded
    }

    pub fn view(&self) -> ListView {
        let state = self.state();
        if !state.loaded {
            return match (&state.phase, &state.last_error) {
                (Phase::Failed, Some(message)) => ListView::Unavailable {
                    message: message.clone(),
                },
                (Phase::Failed, None) => ListView::Unavailable {
                    message: format!("failed to fetch {}", self.collection()),
                },
                _ => ListView::Loading,
            };
        }
        if state.rows.is_empty() {
            ListView::Empty
        } else {
            ListView::Rows(state.rows.clone())
        }
    }

    /// Stop applying results. Anything still in flight resolves as a no-op.
    pub fn dispose(&self) {
        self.state().disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    /// Fetch the collection and replace the local rows wholesale.
    pub async fn load(&self) -> Outcome<usize> {
        let Some(ticket) = self.begin_load() else {
            return Outcome::Discarded;
        };
        let result = self.client.list(self.collection(), &self.options).await;
        self.finish_load(ticket, result)
    }

    /// Re-enter `Loading` after a failure.
    pub async fn retry(&self) -> Outcome<usize> {
        self.load().await
    }

    /// Validate, create, then reload so the rows show what the store kept.
    pub async fn submit_create(&self, draft: Draft) -> Outcome<Record, SubmitError> {
        let action = format!("add {}", self.schema.singular());
        if let Err(err) = self.schema.validate_draft(&draft) {
            return self.reject(&action, err);
        }
        if !self.begin_mutation() {
            return Outcome::Discarded;
        }

        let result = self.client.create(self.collection(), draft.fields()).await;
        if !self.end_mutation() {
            return Outcome::Discarded;
        }

        match result {
            Ok(record) => {
                info!(collection = self.collection(), id = %record.id, "record created");
                self.notify_success("added");
                self.load().await;
                Outcome::Applied(record)
            }
            Err(err) => {
                self.notify_failure(&action, &err);
                Outcome::Failed(SubmitError::Remote(err))
            }
        }
    }

    /// Validate, patch, then reload. Fields missing from `patch` are untouched.
    pub async fn submit_update(
        &self,
        id: &RecordId,
        patch: Fields,
    ) -> Outcome<Record, SubmitError> {
        let action = format!("update {}", self.schema.singular());
        if let Err(err) = self.schema.validate_patch(&patch) {
            return self.reject(&action, err);
        }
        if !self.begin_mutation() {
            return Outcome::Discarded;
        }

        let result = self.client.update(self.collection(), id, &patch).await;
        if !self.end_mutation() {
            return Outcome::Discarded;
        }

        match result {
            Ok(record) => {
                info!(collection = self.collection(), %id, "record updated");
                self.notify_success("updated");
                self.load().await;
                Outcome::Applied(record)
            }
            Err(err) => {
                self.notify_failure(&action, &err);
                Outcome::Failed(SubmitError::Remote(err))
            }
        }
    }

    /// Delete, then drop the row locally. No reload.
    pub async fn remove(&self, id: &RecordId) -> Outcome<RecordId> {
        if !self.begin_mutation() {
            return Outcome::Discarded;
        }

        let result = self.client.delete(self.collection(), id).await;
        if !self.end_mutation() {
            return Outcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.state().rows.retain(|row| &row.id != id);
                info!(collection = self.collection(), %id, "record deleted");
                self.notify_success("deleted");
                Outcome::Applied(id.clone())
            }
            Err(err) => {
                let action = format!("delete {}", self.schema.singular());
                self.notify_failure(&action, &err);
                Outcome::Failed(err)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_load(&self) -> Option<u64> {
        let mut state = self.state();
        if state.disposed {
            return None;
        }
        state.issued += 1;
        state.phase = Phase::Loading;
        debug!(collection = self.collection(), ticket = state.issued, "load started");
        Some(state.issued)
    }

    fn finish_load(
        &self,
        ticket: u64,
        result: Result<Vec<Record>, CollectionError>,
    ) -> Outcome<usize> {
        let failure = {
            let mut state = self.state();
            if state.disposed {
                return Outcome::Discarded;
            }
            if ticket != state.issued {
                debug!(
                    collection = self.collection(),
                    ticket,
                    latest = state.issued,
                    failed = result.is_err(),
                    "dropping superseded load result"
                );
                return Outcome::Superseded;
            }

            match result {
                Ok(rows) => {
                    let count = rows.len();
                    state.rows = rows;
                    state.loaded = true;
                    state.last_error = None;
                    state.phase = Phase::Ready;
                    return Outcome::Applied(count);
                }
                Err(err) => {
                    state.last_error = Some(err.to_string());
                    state.phase = Phase::Failed;
                    err
                }
            }
        };

        self.notify_failure(&format!("fetch {}", self.collection()), &failure);
        Outcome::Failed(failure)
    }

    fn begin_mutation(&self) -> bool {
        let mut state = self.state();
        if state.disposed {
            return false;
        }
        state.mutations += 1;
        true
    }

    /// Returns false when the controller was disposed meanwhile.
    fn end_mutation(&self) -> bool {
        let mut state = self.state();
        state.mutations = state.mutations.saturating_sub(1);
        !state.disposed
    }

    fn reject<T>(
        &self,
        action: &str,
        err: crate::schema::ValidationError,
    ) -> Outcome<T, SubmitError> {
        if self.is_disposed() {
            return Outcome::Discarded;
        }
        warn!(collection = self.collection(), error = %err, "submission blocked");
        self.notifier
            .notify(Notification::error(format!("failed to {}: {}", action, err)));
        Outcome::Failed(SubmitError::Invalid(err))
    }

    fn notify_success(&self, verb: &str) {
        self.notifier.notify(Notification::success(format!(
            "{} {} successfully",
            capitalize(self.schema.singular()),
            verb
        )));
    }

    fn notify_failure(&self, action: &str, err: &CollectionError) {
        warn!(collection = self.collection(), kind = %err.kind(), error = %err, "failed to {}", action);
        self.notifier
            .notify(Notification::error(format!("failed to {}: {}", action, err)));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
