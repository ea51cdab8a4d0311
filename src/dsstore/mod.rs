//! Finder `.DS_Store` record store
//!
//! A `.DS_Store` file holds per-entry display attributes for one directory:
//! icon positions, window geometry, view settings and background images.
//! Each attribute is a record keyed by `(entry name, four-character code)`.
//!
//! The container is a buddy-allocated block file holding a B-tree of
//! records (see [`writer`] for the layout). This module provides:
//!
//! - [`DsStore`]: an editable, scoped handle that commits on close
//! - [`DsStoreFile`]: a parser for existing stores
//! - [`StoreWriter`]: a writer that lays out a complete file from records
//! - codecs for the structured blobs Finder stores ([`IconLocation`],
//!   [`WindowInfo`], property lists)
//!
//! # Example
//!
//! ```rust,no_run
//! use finder_layout::dsstore::{DsStore, IconLocation, OpenMode, consts::CODE_ICON_LOCATION};
//!
//! let mut store = DsStore::open("/Volumes/Installer/.DS_Store", OpenMode::ReadWrite)?;
//! store.set("Applications", CODE_ICON_LOCATION, IconLocation::new(300, 150))?;
//! store.close()?;
//! # Ok::<(), finder_layout::dsstore::DsStoreError>(())
//! ```

pub mod codecs;
pub mod consts;
mod error;
mod file;
pub mod record;
mod store;
pub mod writer;

pub use codecs::{IconLocation, ViewStyle, WindowInfo, plist_from_blob, plist_to_blob};
pub use error::{DsStoreError, Result};
pub use file::{DsStoreFile, TreeInfo};
pub use record::{FourCC, Record, RecordKey, RecordValue};
pub use store::{DsStore, OpenMode, with_store};
pub use writer::StoreWriter;
