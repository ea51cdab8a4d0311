//! Buddy allocator for store blocks
//!
//! The store file is a 2^31-byte address space carved into power-of-two
//! blocks. A block is referred to by its *address*: the offset (always
//! 32-byte aligned) OR'd with log2 of its size. Free blocks are tracked in one
//! list per width; allocating splits the smallest sufficient free block in
//! halves until it has the requested width.
//!
//! A fresh allocator already holds the 32-byte header block at offset 0, so
//! its free lists start as one block of each width from 5 to 30.

use super::super::consts::*;
use super::super::error::{DsStoreError, Result};

/// Pack an offset and width into a block address.
#[inline]
pub fn block_address(offset: u32, width: u32) -> u32 {
    offset | width
}

/// Offset part of a block address.
#[inline]
pub fn block_offset(address: u32) -> u32 {
    address & !ADDRESS_WIDTH_MASK
}

/// Size in bytes of the block at `address`.
#[inline]
pub fn block_size(address: u32) -> usize {
    1usize << (address & ADDRESS_WIDTH_MASK)
}

/// Smallest block width able to hold `size` bytes.
#[inline]
pub fn width_for(size: usize) -> u32 {
    let width = size.max(1).next_power_of_two().trailing_zeros();
    width.max(MIN_BLOCK_WIDTH)
}

/// Buddy allocator state: free block offsets per width.
#[derive(Debug, Clone)]
pub struct BuddyAllocator {
    /// Free block offsets, sorted ascending, indexed by width
    free: Vec<Vec<u32>>,
}

impl BuddyAllocator {
    /// Create an allocator with the header block already taken.
    pub fn new() -> Self {
        let mut free = vec![Vec::new(); FREE_LIST_COUNT];
        free[MAX_BLOCK_WIDTH as usize].push(0);
        let mut allocator = Self { free };

        // The whole space is free, so carving the header block cannot fail.
        let header = allocator.take(MIN_BLOCK_WIDTH);
        debug_assert_eq!(header, Some(0));
        allocator
    }

    /// Allocate a block of at least `size` bytes and return its address.
    pub fn allocate(&mut self, size: usize) -> Result<u32> {
        let width = width_for(size);
        if width >= MAX_BLOCK_WIDTH {
            return Err(DsStoreError::AllocatorExhausted(size));
        }
        let offset = self
            .take(width)
            .ok_or(DsStoreError::AllocatorExhausted(size))?;
        tracing::trace!(size, width, offset, "allocated store block");
        Ok(block_address(offset, width))
    }

    /// Remove a free block of exactly `width`, splitting larger ones as needed.
    fn take(&mut self, width: u32) -> Option<u32> {
        let source = (width..=MAX_BLOCK_WIDTH).find(|w| !self.free[*w as usize].is_empty())?;
        let offset = self.free[source as usize].remove(0);

        let mut current = source;
        while current > width {
            current -= 1;
            let buddy = offset + (1u32 << current);
            insert_sorted(&mut self.free[current as usize], buddy);
        }
        Some(offset)
    }

    /// Free lists, indexed by width.
    pub fn free_lists(&self) -> &[Vec<u32>] {
        &self.free
    }

    /// Total number of free blocks across all widths.
    pub fn free_block_count(&self) -> usize {
        self.free.iter().map(Vec::len).sum()
    }
}

impl Default for BuddyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_sorted(list: &mut Vec<u32>, offset: u32) {
    let pos = list.partition_point(|&o| o < offset);
    list.insert(pos, offset);
}

/// Upper bound on the free blocks a single allocation can add.
pub const MAX_SPLITS_PER_ALLOCATION: usize = (MAX_BLOCK_WIDTH - MIN_BLOCK_WIDTH) as usize;
