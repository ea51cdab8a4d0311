//! `.DS_Store` file writing module
//!
//! This module serializes a set of records into a complete store file.
//!
//! # Implementation Notes
//!
//! The layout follows the buddy-allocator format documented for
//! `Mac::Finder::DSStore` and produced by Finder itself: a fixed header, an
//! info block with the block table and free lists, a `DSDB` superblock and
//! a B-tree of records.

/// Buddy block allocation
pub(crate) mod allocator;

/// Record tree generation
mod btree;

/// Header, info block and superblock generation
mod header;

/// Core store writer implementation
mod core;

/// Integration tests for the store writer
#[cfg(test)]
mod tests;

// Re-export public types
pub use self::core::StoreWriter;
