//! The module contains the errors the engine can throw.
//!
//! Every variant except [`Database`] is a rejected input: the engine raises
//! them before touching storage (or, for [`UnknownTag`], inside a transaction
//! that is then rolled back), so a caller can always map them to a client
//! error.
//!
//!  [`Database`]: EngineError::Database
//!  [`UnknownTag`]: EngineError::UnknownTag
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown tag: {0}")]
    UnknownTag(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` when the error was caused by the caller's input rather
    /// than by the storage layer.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Database(_))
    }

    /// Prefixes the message of an input error, used to point at the offending
    /// element of a batch.
    pub(crate) fn with_context(self, context: &str) -> Self {
        match self {
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{context}: {msg}")),
            Self::InvalidDirection(msg) => Self::InvalidDirection(format!("{context}: {msg}")),
            Self::InvalidAmount(msg) => Self::InvalidAmount(format!("{context}: {msg}")),
            Self::UnknownTag(msg) => Self::UnknownTag(format!("{context}: {msg}")),
            other => other,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidDirection(a), Self::InvalidDirection(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::UnknownTag(a), Self::UnknownTag(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
