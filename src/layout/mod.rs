//! Installer window layout
//!
//! Writes the records that make Finder open a disk-image window with a
//! fixed frame, a background picture and hand-placed icons:
//!
//! | entry          | code   | value                          |
//! |----------------|--------|--------------------------------|
//! | `.`            | `fwi0` | window frame, icon view        |
//! | each icon      | `Iloc` | icon position                  |
//! | `.`            | `icvp` | icon-view plist with the alias |
//! | `.`            | `fwsw` | sidebar width (`long`)         |
//! | `.`            | `fwvh` | window height (`shor`)         |
//! | `.`            | `ICVO` | `bool`                         |
//! | `.`            | `icvt` | label text size (`shor`)       |
//!
//! # Example
//!
//! ```rust,no_run
//! use finder_layout::layout::{LayoutConfig, write_layout};
//!
//! let summary = write_layout(&LayoutConfig::default())?;
//! println!("{} records in {}", summary.total_records, summary.store_path.display());
//! # Ok::<(), finder_layout::Error>(())
//! ```

pub mod config;
mod view_options;
mod writer;

pub use config::{BackgroundColor, IconPlacement, IconViewOptions, LayoutConfig, WindowBounds};
pub use writer::{LayoutSummary, write_layout};
