//! Data access for the student club site.
//!
//! Every page of the site reads and writes one table of a hosted store:
//! events, clubs, announcements, gallery items, blog posts, feedback,
//! attendance, registrations. This crate is the layer those pages share:
//!
//! - [`RemoteCollection`]: stateless CRUD gateway to a named collection,
//!   backed by [`RestCollections`] (PostgREST over HTTPS) or
//!   [`InMemoryCollections`].
//! - [`ListController`]: the rows one page shows, kept in step with the
//!   store, with failures mapped to [`Notification`]s.
//! - [`FormBinding`]: create/edit drafts validated against a [`Schema`].
//!
//! The client is built once at startup and passed to each controller
//! explicitly; there is no global instance.

pub mod catalog;
pub mod collection;
pub mod config;
pub mod controller;
pub mod form;
pub mod notify;
pub mod record;
pub mod schema;
pub mod storage;

pub use collection::{
    CollectionError, CollectionsExt, Direction, ErrorKind, Filter, InMemoryCollections,
    ListOptions, OrderBy, RemoteCollection, Row, TypedCollection,
};
#[cfg(feature = "http")]
pub use collection::RestCollections;
pub use config::{ClientConfig, ConfigError};
pub use controller::{ListController, ListView, Outcome, Phase, SubmitError};
pub use form::FormBinding;
#[cfg(feature = "emitter")]
pub use notify::EmitterNotifier;
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier};
pub use record::{Draft, FetchResult, Fields, Record, RecordId};
pub use schema::{FieldSpec, InputKind, Schema, ValidationError};
#[cfg(feature = "http")]
pub use storage::RestBlobStore;
pub use storage::{BlobStore, InMemoryBlobStore};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
