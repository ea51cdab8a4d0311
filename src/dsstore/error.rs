//! Error type for the record store.

use std::path::PathBuf;

use crate::common::binary::BinaryError;

/// Errors raised while opening, editing or committing a `.DS_Store` file
#[derive(Debug, thiserror::Error)]
pub enum DsStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a .DS_Store file")]
    NotDsStore,

    #[error("Corrupted store: {0}")]
    Corrupted(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store was opened read-only")]
    ReadOnly,

    #[error("Target directory does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("Record '{name}'/{code} needs {size} bytes but a node page holds {page_size}")]
    RecordTooLarge {
        name: String,
        code: String,
        size: usize,
        page_size: usize,
    },

    #[error("Block allocator cannot satisfy a {0}-byte request")]
    AllocatorExhausted(usize),

    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),
}

impl From<BinaryError> for DsStoreError {
    fn from(err: BinaryError) -> Self {
        DsStoreError::Corrupted(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DsStoreError>;
