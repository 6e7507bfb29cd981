//! Store error model.

use thiserror::Error;

/// Result type used across the domain and store layers.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy for inventory store operations.
///
/// Keep this focused on deterministic, expected failures (validation,
/// uniqueness, missing rows, the negative-stock rule). Only `Storage`
/// carries unclassified infrastructure faults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed or out-of-range caller data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint violation on course_code.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A referenced id does not exist.
    #[error("not found")]
    NotFound,

    /// Stock deletion blocked by movements that still reference it.
    #[error("stock has dependent movements; delete those movements first")]
    HasDependents,

    /// The requested adjustment would drive quantity below zero.
    #[error("stock would go negative (current {current}, change {delta})")]
    NegativeStock { current: i64, delta: i64 },

    /// Underlying storage fault, not otherwise classified.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn storage(err: impl core::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Short stable name of the failure kind, for display boundaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::DuplicateKey(_) => "DuplicateKey",
            Self::NotFound => "NotFound",
            Self::HasDependents => "HasDependents",
            Self::NegativeStock { .. } => "NegativeStock",
            Self::Storage(_) => "StorageFailure",
        }
    }
}
