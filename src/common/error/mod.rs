//! Unified error type for the crate.
//!
//! Store, alias and configuration failures all surface through [`Error`].

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
