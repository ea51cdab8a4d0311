//! finder-layout - Finder window layouts for macOS disk-image installers
//!
//! This library writes the `.DS_Store` metadata Finder reads when it opens a
//! folder, so a mounted installer image shows a fixed-size window with a
//! background picture and hand-placed icons.
//!
//! # Features
//!
//! - **Layout writer**: Lays out an installer window from a [`LayoutConfig`]
//! - **Record store**: Reads and writes `.DS_Store` files (buddy-allocated B-tree)
//! - **Alias records**: Builds the Mac alias that points Finder at the background image
//! - **YAML configuration**: Optional, behind the `yaml` feature (on by default)
//!
//! # Example - Laying out an installer window
//!
//! ```no_run
//! use finder_layout::{LayoutConfig, write_layout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = LayoutConfig::for_target("/Volumes/Installer");
//! config.icons[0].name = "Installer.app".to_string();
//!
//! let summary = write_layout(&config)?;
//! println!("{} records in {}", summary.total_records, summary.store_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Inspecting a store
//!
//! ```no_run
//! use finder_layout::dsstore::{DsStore, OpenMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DsStore::open("/Volumes/Installer/.DS_Store", OpenMode::Read)?;
//! for (key, value) in store.records() {
//!     println!("{} {:?} {:?}", key.name(), key.code(), value);
//! }
//! # Ok(())
//! # }
//! ```

/// Common types, errors and binary helpers
pub mod common;

/// `.DS_Store` record store
///
/// Records, value codecs, the buddy-allocated container writer and a scoped
/// editing handle.
pub mod dsstore;

/// Mac alias records (version 2)
pub mod alias;

/// Installer window layout
pub mod layout;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use layout::{LayoutConfig, LayoutSummary, write_layout};
