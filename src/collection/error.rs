use std::fmt;

use crate::record::RecordId;

/// Coarse classification of a [`CollectionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport or network failure, including timeouts.
    Connectivity,
    /// The remote store rejected the operation.
    RemoteWrite,
    /// An id-scoped operation matched no record.
    NotFound,
    /// The store answered with something the client could not interpret.
    Decode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::RemoteWrite => "remote_write",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for remote collection operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionError {
    Connectivity { collection: String, message: String },
    RemoteWrite { collection: String, message: String },
    NotFound { collection: String, id: RecordId },
    Decode { collection: String, message: String },
}

impl CollectionError {
    pub fn connectivity(collection: &str, message: impl Into<String>) -> Self {
        CollectionError::Connectivity {
            collection: collection.to_string(),
            message: message.into(),
        }
    }

    pub fn remote_write(collection: &str, message: impl Into<String>) -> Self {
        CollectionError::RemoteWrite {
            collection: collection.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(collection: &str, id: &RecordId) -> Self {
        CollectionError::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        }
    }

    pub fn decode(collection: &str, message: impl Into<String>) -> Self {
        CollectionError::Decode {
            collection: collection.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectionError::Connectivity { .. } => ErrorKind::Connectivity,
            CollectionError::RemoteWrite { .. } => ErrorKind::RemoteWrite,
            CollectionError::NotFound { .. } => ErrorKind::NotFound,
            CollectionError::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            CollectionError::Connectivity { collection, .. }
            | CollectionError::RemoteWrite { collection, .. }
            | CollectionError::NotFound { collection, .. }
            | CollectionError::Decode { collection, .. } => collection,
        }
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Connectivity {
                collection,
                message,
            } => write!(f, "could not reach {}: {}", collection, message),
            CollectionError::RemoteWrite {
                collection,
                message,
            } => write!(f, "{} rejected the operation: {}", collection, message),
            CollectionError::NotFound { collection, id } => {
                write!(f, "no record {} in {}", id, collection)
            }
            CollectionError::Decode {
                collection,
                message,
            } => write!(f, "unreadable response from {}: {}", collection, message),
        }
    }
}

impl std::error::Error for CollectionError {}
