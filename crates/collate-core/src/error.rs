//! Error types for collate-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in collate-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write, rename or remove a table file
    #[error("failed to update file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not valid JSON or lacks required fields
    #[error("failed to parse snapshot '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Mapping override file is not valid
    #[error("failed to parse mappings '{path}': {source}")]
    Mappings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// CSV error from the csv crate while reading or writing a table
    #[error("CSV error in '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    /// Existing table holds the same key twice
    #[error("duplicate key {key} in '{table}'")]
    DuplicateKey { table: String, key: String },

    /// The id embedded in a record disagrees with the id it is filed under
    #[error("{kind}: id mismatch: {key} != {embedded}")]
    IdMismatch {
        kind: &'static str,
        key: String,
        embedded: i64,
    },

    /// A fresh observation disagrees with the stored record for the same key
    #[error("{kind}: {key}: {field} \"{new}\" != \"{old}\"")]
    FieldMismatch {
        kind: &'static str,
        key: String,
        field: &'static str,
        new: String,
        old: String,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification used by callers to pick a continue-or-abort policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Fresh data contradicts stored data; the mapping tables are wrong
    Integrity,
    /// Malformed input snapshot, table or mapping file
    Parse,
    /// Filesystem failure
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> FaultKind {
        match self {
            Error::IdMismatch { .. } | Error::FieldMismatch { .. } => FaultKind::Integrity,
            Error::Snapshot { .. }
            | Error::Mappings { .. }
            | Error::Csv { .. }
            | Error::DuplicateKey { .. } => FaultKind::Parse,
            Error::FileRead { .. } | Error::FileWrite { .. } | Error::WalkDir(_) | Error::Io(_) => {
                FaultKind::Io
            }
        }
    }

    /// Whether this error is an integrity fault
    pub fn is_integrity(&self) -> bool {
        self.kind() == FaultKind::Integrity
    }
}
