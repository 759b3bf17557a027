//! Unified error type for the tariff engine.
//!
//! Validation failures carry the offending field name so callers can point the user
//! at the exact input that was rejected.

use thiserror::Error;

/// All errors produced by the tariff engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Error reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A required field is missing or malformed
    #[error("Invalid value for `{field}`: {message}")]
    Validation {
        /// Name of the rejected field
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// A monetary or day-count field is negative or not finite
    #[error("Invalid amount for `{field}`: {amount}")]
    InvalidAmount {
        /// Name of the rejected field
        field: &'static str,
        /// The rejected amount
        amount: f64,
    },

    /// No tariff exists with the given id
    #[error("Tariff not found: {id}")]
    TariffNotFound {
        /// Requested tariff id
        id: i64,
    },

    /// The tariff exists but is archived and cannot be modified
    #[error("Tariff {id} is archived")]
    TariffArchived {
        /// Archived tariff id
        id: i64,
    },

    /// The partner directory could not complete a request
    #[error("Directory error: {message}")]
    Directory {
        /// Human-readable description
        message: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a field-identified validation error.
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
