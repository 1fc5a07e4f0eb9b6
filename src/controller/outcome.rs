use std::fmt;

use crate::collection::CollectionError;
use crate::schema::ValidationError;

/// How a controller operation ended. Failures are already notified.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E = CollectionError> {
    /// The result was applied to the controller's rows.
    Applied(T),
    /// The operation failed; rows were left as they were.
    Failed(E),
    /// A newer load resolved first; this result was dropped.
    Superseded,
    /// The controller was disposed before the result arrived.
    Discarded,
}

impl<T, E> Outcome<T, E> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(self) -> Option<E> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Why a create or update did not go through.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Required fields were blank; nothing was sent.
    Invalid(ValidationError),
    /// The store refused or could not be reached.
    Remote(CollectionError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Invalid(e) => write!(f, "{}", e),
            SubmitError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Invalid(e) => Some(e),
            SubmitError::Remote(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SubmitError {
    fn from(err: ValidationError) -> Self {
        SubmitError::Invalid(err)
    }
}

impl From<CollectionError> for SubmitError {
    fn from(err: CollectionError) -> Self {
        SubmitError::Remote(err)
    }
}
