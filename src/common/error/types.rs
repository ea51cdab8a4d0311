//! Unified error types for finder-layout.
use thiserror::Error;

use crate::alias::AliasError;
use crate::dsstore::DsStoreError;

/// Main error type for layout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[source] DsStoreError),

    /// Alias could not be built or decoded
    #[error("Alias error: {0}")]
    Alias(#[source] AliasError),

    /// Invalid layout configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Feature disabled at compile time
    #[error("Feature '{0}' is disabled. Enable it with --features {0}")]
    FeatureDisabled(String),
}

impl Error {
    /// True when the error came from a missing path on disk.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Store(DsStoreError::TargetMissing(_)) => true,
            Error::Alias(AliasError::Resolve { source, .. }) => {
                source.kind() == std::io::ErrorKind::NotFound
            },
            _ => false,
        }
    }
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, Error>;
