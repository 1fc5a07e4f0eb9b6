//! Integration tests for list controllers and form bindings.
//!
//! - Load ordering: a slow, older fetch never overwrites a newer one
//! - Failure handling: one error notification per failure, rows kept
//! - Form submit: create and edit flows through a controller

mod form;
mod scenarios;
