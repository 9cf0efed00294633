//! Error handling for Vellum.
//!
//! Provides the unified error type and result alias used across all
//! Vellum components, together with stable numeric error codes for
//! programmatic handling.

use std::fmt;

use thiserror::Error;

/// Result type alias for Vellum operations.
pub type VellumResult<T> = std::result::Result<T, VellumError>;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and are
/// stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Invalid argument provided.
    InvalidArgument = 0x0001,

    // Engine errors (0x0100 - 0x01FF)
    /// Key not found in a store.
    KeyNotFound = 0x0100,
    /// Write attempted in a read-only transaction.
    ReadOnly = 0x0101,
    /// Named store not found.
    StoreNotFound = 0x0102,
    /// Named store already exists.
    StoreAlreadyExists = 0x0103,
    /// Operation on a committed or rolled back transaction.
    TransactionClosed = 0x0104,

    // Catalog errors (0x0200 - 0x02FF)
    /// Table not found.
    TableNotFound = 0x0200,
    /// Table already exists.
    TableAlreadyExists = 0x0201,
    /// Index not found.
    IndexNotFound = 0x0202,
    /// Index already exists.
    IndexAlreadyExists = 0x0203,
    /// Document encoding or decoding failed.
    Encoding = 0x0204,

    // Index errors (0x0300 - 0x03FF)
    /// Duplicate value in a unique index.
    DuplicateValue = 0x0300,

    // Query errors (0x0400 - 0x04FF)
    /// SQL syntax error.
    SyntaxError = 0x0400,
    /// Positional and named parameters mixed in one statement.
    MixedParameters = 0x0401,
    /// Integer literal out of range.
    NumberOverflow = 0x0402,
    /// Type mismatch.
    TypeMismatch = 0x0403,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Engine",
            0x02 => "Catalog",
            0x03 => "Index",
            0x04 => "Query",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for Vellum.
///
/// Covers every failure the core can surface. Lookup and conflict
/// failures carry the name they failed on; parse failures carry the
/// token position.
#[derive(Debug, Error)]
pub enum VellumError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Engine Errors
    // ==========================================================================
    /// Key not found.
    #[error("key not found")]
    KeyNotFound,

    /// Write attempted in a read-only transaction.
    #[error("transaction is read-only: {operation} not permitted")]
    ReadOnly {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Named store not found.
    #[error("store not found")]
    StoreNotFound,

    /// Named store already exists.
    #[error("store already exists")]
    StoreAlreadyExists,

    /// Operation on a transaction that was committed or rolled back.
    #[error("transaction is closed")]
    TransactionClosed,

    // ==========================================================================
    // Catalog Errors
    // ==========================================================================
    /// Table not found.
    #[error("table '{table}' not found")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// Table already exists.
    #[error("table '{table}' already exists")]
    TableAlreadyExists {
        /// The conflicting table.
        table: String,
    },

    /// Index not found.
    #[error("index '{index}' not found")]
    IndexNotFound {
        /// The missing index.
        index: String,
    },

    /// Index already exists.
    #[error("index '{index}' already exists")]
    IndexAlreadyExists {
        /// The conflicting index.
        index: String,
    },

    /// Document encoding or decoding failed.
    #[error("encoding error at field '{field}': {reason}")]
    Encoding {
        /// Path of the field being encoded or decoded.
        field: String,
        /// What went wrong.
        reason: String,
    },

    // ==========================================================================
    // Index Errors
    // ==========================================================================
    /// A unique index already holds the value under another rowid.
    #[error("duplicate value in unique index")]
    DuplicateValue,

    // ==========================================================================
    // Query Errors
    // ==========================================================================
    /// SQL syntax error.
    #[error("syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// 1-based line of the offending token.
        line: u32,
        /// 1-based column of the offending token.
        col: u32,
        /// Error message.
        message: String,
    },

    /// Positional and named parameters mixed within one statement.
    #[error("cannot mix positional and named parameters at line {line}, column {col}")]
    MixedParameters {
        /// 1-based line of the offending parameter.
        line: u32,
        /// 1-based column of the offending parameter.
        col: u32,
    },

    /// Integer literal does not fit in a 64-bit signed integer.
    #[error("number out of range at line {line}, column {col}")]
    NumberOverflow {
        /// 1-based line of the literal.
        line: u32,
        /// 1-based column of the literal.
        col: u32,
    },

    /// Type mismatch.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type.
        expected: String,
        /// Actual type.
        actual: String,
    },
}

impl VellumError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::KeyNotFound => ErrorCode::KeyNotFound,
            Self::ReadOnly { .. } => ErrorCode::ReadOnly,
            Self::StoreNotFound => ErrorCode::StoreNotFound,
            Self::StoreAlreadyExists => ErrorCode::StoreAlreadyExists,
            Self::TransactionClosed => ErrorCode::TransactionClosed,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::TableAlreadyExists { .. } => ErrorCode::TableAlreadyExists,
            Self::IndexNotFound { .. } => ErrorCode::IndexNotFound,
            Self::IndexAlreadyExists { .. } => ErrorCode::IndexAlreadyExists,
            Self::Encoding { .. } => ErrorCode::Encoding,
            Self::DuplicateValue => ErrorCode::DuplicateValue,
            Self::SyntaxError { .. } => ErrorCode::SyntaxError,
            Self::MixedParameters { .. } => ErrorCode::MixedParameters,
            Self::NumberOverflow { .. } => ErrorCode::NumberOverflow,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
        }
    }

    /// Returns true if this error is a lookup failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound
                | Self::StoreNotFound
                | Self::TableNotFound { .. }
                | Self::IndexNotFound { .. }
        )
    }

    /// Returns true if this error is a conflict with existing state.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::StoreAlreadyExists
                | Self::TableAlreadyExists { .. }
                | Self::IndexAlreadyExists { .. }
                | Self::DuplicateValue
        )
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an encoding error for the given field path.
    #[must_use]
    pub fn encoding(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a syntax error at the given position.
    #[must_use]
    pub fn syntax(line: u32, col: u32, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            line,
            col,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = VellumError::TableNotFound {
            table: "users".into(),
        };
        assert_eq!(err.code(), ErrorCode::TableNotFound);
        assert_eq!(err.code().category(), "Catalog");

        assert_eq!(VellumError::DuplicateValue.code().category(), "Index");
        assert_eq!(
            VellumError::syntax(1, 1, "boom").code().category(),
            "Query"
        );
    }

    #[test]
    fn test_error_display() {
        let err = VellumError::TableNotFound {
            table: "users".into(),
        };
        assert_eq!(err.to_string(), "table 'users' not found");

        let err = VellumError::syntax(2, 7, "unexpected token");
        assert_eq!(
            err.to_string(),
            "syntax error at line 2, column 7: unexpected token"
        );
    }

    #[test]
    fn test_not_found_and_conflict() {
        assert!(VellumError::KeyNotFound.is_not_found());
        assert!(!VellumError::KeyNotFound.is_conflict());

        let err = VellumError::TableAlreadyExists {
            table: "users".into(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }
}
