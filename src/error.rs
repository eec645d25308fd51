//! Error types for the Strata library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`StrataError`] enum.
//!
//! # Examples
//!
//! ```
//! use strata::error::{Result, StrataError};
//!
//! fn parse_year(text: &str) -> Result<i64> {
//!     text.parse()
//!         .map_err(|_| StrataError::invalid_field_value("year", text))
//! }
//!
//! assert!(parse_year("19x5").is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Strata operations.
#[derive(Error, Debug)]
pub enum StrataError {
    /// I/O errors raised by a storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another writer already holds the index's write lock.
    #[error("Lock held: {0}")]
    LockHeld(String),

    /// A field value could not be converted to its indexed form.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFieldValue { field: String, message: String },

    /// A segment or commit file failed a magic, version, checksum or structure check.
    #[error("Corrupt segment: {0}")]
    CorruptSegment(String),

    /// A textual query could not be parsed.
    #[error("Query syntax error: {0}")]
    QuerySyntax(String),

    /// No commit point exists in the directory.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query construction or evaluation errors
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with StrataError.
pub type Result<T> = std::result::Result<T, StrataError>;

impl StrataError {
    /// Create a new lock-held error.
    pub fn lock_held<S: Into<String>>(msg: S) -> Self {
        StrataError::LockHeld(msg.into())
    }

    /// Create a new invalid field value error.
    pub fn invalid_field_value<F: Into<String>, S: Into<String>>(field: F, msg: S) -> Self {
        StrataError::InvalidFieldValue {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a new corrupt segment error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        StrataError::CorruptSegment(msg.into())
    }

    /// Create a new query syntax error.
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        StrataError::QuerySyntax(msg.into())
    }

    /// Create a new index-not-found error.
    pub fn index_not_found<S: Into<String>>(msg: S) -> Self {
        StrataError::IndexNotFound(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        StrataError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        StrataError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        StrataError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        StrataError::Storage(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        StrataError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        StrataError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this error is a missing-file I/O error.
    ///
    /// Readers use this to detect a commit that was superseded while it was being loaded.
    pub fn is_not_found(&self) -> bool {
        match self {
            StrataError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            StrataError::Storage(msg) => msg.contains("not found"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = StrataError::index("Test index error");
        assert_eq!(error.to_string(), "Index error: Test index error");

        let error = StrataError::lock_held("write.lock");
        assert_eq!(error.to_string(), "Lock held: write.lock");

        let error = StrataError::invalid_field_value("pubmonth", "not a number: 20x6");
        assert_eq!(
            error.to_string(),
            "Invalid value for field 'pubmonth': not a number: 20x6"
        );

        let error = StrataError::syntax("unterminated phrase");
        assert_eq!(error.to_string(), "Query syntax error: unterminated phrase");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let strata_error = StrataError::from(io_error);

        match &strata_error {
            StrataError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
        assert!(strata_error.is_not_found());
        assert!(!StrataError::corrupt("bad crc").is_not_found());
    }
}
