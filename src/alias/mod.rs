//! Mac alias records
//!
//! An alias is a relocation-tolerant reference to a filesystem object.
//! Finder embeds one in the icon-view options of a window to point at its
//! background picture. This module builds version 2 alias records from
//! paths on disk and parses them back.
//!
//! # Example
//!
//! ```rust,no_run
//! use finder_layout::alias::Alias;
//!
//! let alias = Alias::for_file("/Volumes/Installer/.background/background.png")?;
//! let bytes = alias.to_bytes()?;
//! assert_eq!(Alias::from_bytes(&bytes)?.target.filename, "background.png");
//! # Ok::<(), finder_layout::alias::AliasError>(())
//! ```

pub mod consts;
mod record;
mod resolve;

use std::path::PathBuf;

pub use record::{Alias, DiskType, TargetInfo, TargetKind, VolumeInfo};

use crate::common::binary::BinaryError;

/// Error types for alias encoding and resolution
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Alias record is {0} bytes, more than a record can describe")]
    TooLarge(usize),

    #[error("Alias record is truncated: {0}")]
    Truncated(String),

    #[error("Invalid alias record: {0}")]
    InvalidFormat(String),
}

impl From<BinaryError> for AliasError {
    fn from(err: BinaryError) -> Self {
        AliasError::Truncated(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AliasError>;
