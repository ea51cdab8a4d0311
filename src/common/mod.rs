//! Common types and utilities shared by the store and alias codecs.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod time;

// Re-exports for convenience
pub use error::{Error, Result};
