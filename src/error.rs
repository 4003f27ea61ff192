//! Custom error types for ledgerbook
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledgerbook operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// No session password is set; encrypted operations cannot proceed
    #[error("No session password is set")]
    NoSessionKey,

    /// Key derivation or encryption failures
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Authentication failure on decrypt: wrong password or corrupted data
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Structural problems with an import envelope (whole import aborted)
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage engine errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for ledger entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "duplicate" error for budgets keyed by period
    pub fn budget_exists(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledgerbook operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Validation("amount must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "Validation error: amount must be greater than 0"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::entry_not_found("abc123");
        assert_eq!(err.to_string(), "Entry not found: abc123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_budget_error() {
        let err = LedgerError::budget_exists("monthly-2026-01");
        assert_eq!(err.to_string(), "Budget already exists: monthly-2026-01");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }

    #[test]
    fn test_decryption_classifier() {
        let err = LedgerError::Decryption("invalid key or corrupted data".into());
        assert!(err.is_decryption());
        assert!(!err.is_validation());
    }
}
