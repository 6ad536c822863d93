use thiserror::Error;
use ulid::Ulid;

use crate::audit::{Operation, TableKind};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("{kind} id is empty")]
    Empty { kind: &'static str },
    #[error("invalid {kind} id '{value}': {reason}")]
    InvalidFormat {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

impl IdError {
    pub fn empty(kind: &'static str) -> Self {
        Self::Empty { kind }
    }

    pub fn invalid(kind: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Identity(#[from] IdError),
    #[error("validation error: {message}")]
    Validation { message: String },
    #[error("{operation} on {table} failed")]
    Write {
        table: TableKind,
        operation: Operation,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("not found: {table} {key}")]
    NotFound { table: TableKind, key: String },
    #[error("storage error: {message}")]
    Storage { message: String },
    #[error("{table} {entity_id} committed but change event was not recorded: {message}")]
    Recording {
        table: TableKind,
        entity_id: Ulid,
        message: String,
    },
    #[error("operation cancelled before completion")]
    Cancelled,
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn write(table: TableKind, operation: Operation, source: sea_orm::DbErr) -> Self {
        Self::Write {
            table,
            operation,
            source,
        }
    }

    pub fn not_found(table: TableKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            table,
            key: key.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn recording(table: TableKind, entity_id: Ulid, message: impl Into<String>) -> Self {
        Self::Recording {
            table,
            entity_id,
            message: message.into(),
        }
    }

    /// Coarse classification for callers mapping errors to status codes or exit codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Identity(_) | Self::Validation { .. } => ErrorKind::MalformedInput,
            Self::Write { .. } => ErrorKind::WriteFailed,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage { .. } => ErrorKind::ReadFailed,
            Self::Recording { .. } => ErrorKind::RecordingFailed,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    MalformedInput,
    WriteFailed,
    NotFound,
    ReadFailed,
    RecordingFailed,
    Cancelled,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sea_orm::DbErr> for StoreError {
    fn from(value: sea_orm::DbErr) -> Self {
        StoreError::storage(value.to_string())
    }
}

/// Failure reported by a change recorder.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RecordError {
    message: String,
}

impl RecordError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sea_orm::DbErr> for RecordError {
    fn from(value: sea_orm::DbErr) -> Self {
        RecordError::new(value.to_string())
    }
}
