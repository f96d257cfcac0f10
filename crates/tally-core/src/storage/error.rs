//! Storage error handling
//!
//! Provides typed errors for the codec, record, migration and store layers.
//! Decode paths never recover silently: a malformed token aborts the whole
//! load so callers always see corruption as an inspectable value.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding a field or a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Token could not be parsed as the requested type
    #[error("field {position}: \"{token}\" is not a valid {expected}")]
    InvalidFormat {
        position: usize,
        token: String,
        expected: &'static str,
    },

    /// A read was requested past the last field of the record
    #[error("no field at position {position}, record has {len}")]
    OutOfFields { position: usize, len: usize },
}

impl DecodeError {
    /// Attach the reader's field position to a codec-level error
    pub(crate) fn at(self, position: usize) -> Self {
        match self {
            DecodeError::InvalidFormat {
                token, expected, ..
            } => DecodeError::InvalidFormat {
                position,
                token,
                expected,
            },
            other => other,
        }
    }
}

/// Errors raised while encoding a field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Value has no textual form in the target format
    #[error("\"{value}\" cannot be written as {expected}")]
    NotRepresentable {
        value: String,
        expected: &'static str,
    },
}

/// Errors raised while upgrading on-disk records between schema versions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// A single migration step rejected its input
    #[error("migration from version {from} failed: {reason}")]
    Step { from: u32, reason: String },

    /// The file version has no registered chain reaching the current version
    #[error("no migration path from version {found} to version {expected}")]
    NoPath { found: u32, expected: u32 },
}

/// Errors raised by [`Store`](super::Store) operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A line of the backing file could not be decoded
    #[error("{path}, line {line}: {source}")]
    Load {
        path: PathBuf,
        line: usize,
        #[source]
        source: DecodeError,
    },

    /// No record carries the requested id
    #[error("no record with id {id}")]
    NotFound { id: u64 },

    /// The backing file could not be migrated to the current version
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// A record could not be serialized
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Reading or writing the backing file failed
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: &std::path::Path, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_display() {
        let err = DecodeError::InvalidFormat {
            position: 3,
            token: "12x34".to_string(),
            expected: "integer",
        };

        let msg = err.to_string();
        assert!(msg.contains("field 3"));
        assert!(msg.contains("12x34"));
        assert!(msg.contains("integer"));
    }

    #[test]
    fn test_at_rewrites_position() {
        let err = DecodeError::InvalidFormat {
            position: 0,
            token: "x".to_string(),
            expected: "bool",
        };

        let err = err.at(5);
        assert!(matches!(err, DecodeError::InvalidFormat { position: 5, .. }));
    }

    #[test]
    fn test_at_leaves_out_of_fields_alone() {
        let err = DecodeError::OutOfFields { position: 2, len: 2 };
        assert_eq!(err.clone().at(7), err);
    }

    #[test]
    fn test_load_error_display() {
        let err = StoreError::Load {
            path: PathBuf::from("/data/debts.data"),
            line: 12,
            source: DecodeError::OutOfFields { position: 7, len: 7 },
        };

        let msg = err.to_string();
        assert!(msg.contains("debts.data"));
        assert!(msg.contains("line 12"));
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound { id: 42 };
        assert_eq!(err.to_string(), "no record with id 42");
    }

    #[test]
    fn test_migration_error_display() {
        let err = MigrationError::NoPath {
            found: 2,
            expected: 4,
        };
        assert!(err.to_string().contains("version 2"));
        assert!(err.to_string().contains("version 4"));
    }
}
