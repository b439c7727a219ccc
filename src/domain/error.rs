//! Domain-level error types for the lending catalog.
//!
//! All errors are typed with `thiserror`. Duplicate, not-found and custody
//! errors are ordinary status values the shell reports and moves past;
//! malformed records and persistence failures abort the operation.

use std::fmt;

use thiserror::Error;

/// Which collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A lendable item.
    Item,
    /// A registered borrower.
    Borrower,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item => write!(f, "item"),
            Self::Borrower => write!(f, "borrower"),
        }
    }
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// A record with this identifier already exists.
    #[error("{kind} already exists: {id}")]
    DuplicateId { kind: RecordKind, id: String },

    /// No record with this identifier.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// The item is already held by a borrower.
    #[error("item {item_id} is already borrowed by {holder}")]
    AlreadyHeld { item_id: String, holder: String },

    /// Strict returns only: the borrower does not hold the item.
    #[error("borrower {borrower_id} does not hold item {item_id}")]
    NotHeldByBorrower {
        borrower_id: String,
        item_id: String,
    },

    /// A field value cannot be represented in the record format.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A persisted line could not be decoded.
    #[error("Malformed {kind} record at line {line}: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        line: usize,
        reason: String,
    },

    /// Reading or writing a backing file failed.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Serializing output to JSON failed.
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Terminal IO failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a not-found error for an item.
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: RecordKind::Item,
            id: id.into(),
        }
    }

    /// Create a not-found error for a borrower.
    pub fn borrower_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: RecordKind::Borrower,
            id: id.into(),
        }
    }

    /// Create a persistence error with context.
    pub fn persistence(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a JSON error.
    pub fn json(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether the error is an expected status the caller can report and
    /// continue from.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId { .. }
                | Self::NotFound { .. }
                | Self::AlreadyHeld { .. }
                | Self::NotHeldByBorrower { .. }
                | Self::InvalidField { .. }
        )
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
