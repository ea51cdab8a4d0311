//! File header and allocator info block generation
//!
//! The info block (the allocator's "root" block) holds everything needed to
//! find data in the file:
//!
//! ```text
//! u32                 block count
//! u32                 reserved (0)
//! u32 * n             block addresses, n rounded up to a multiple of 256
//! u32                 table-of-contents count
//!   u8, name, u32     per entry: name length, name, block number
//! 32 * (u32, u32*)    free lists: count then offsets, one per width
//! ```

use bytes::BufMut;
use zerocopy::{BE, IntoBytes, U32};

use super::super::consts::*;
use super::super::file::{RawHeader, RawSuperblock};

/// Builds the 36-byte file header.
pub struct HeaderBuilder {
    info_offset: u32,
    info_size: u32,
}

impl HeaderBuilder {
    pub fn new(info_offset: u32, info_size: u32) -> Self {
        Self {
            info_offset,
            info_size,
        }
    }

    pub fn generate(&self) -> Vec<u8> {
        let header = RawHeader {
            magic: U32::<BE>::new(FILE_MAGIC),
            signature: *BUD1_MAGIC,
            info_offset: U32::<BE>::new(self.info_offset),
            info_size: U32::<BE>::new(self.info_size),
            info_offset_copy: U32::<BE>::new(self.info_offset),
            reserved: HEADER_RESERVED,
        };
        header.as_bytes().to_vec()
    }
}

/// Builds the allocator info block.
#[derive(Debug, Default)]
pub struct InfoBlockBuilder {
    blocks: Vec<u32>,
    toc: Vec<(String, u32)>,
    free_lists: Vec<Vec<u32>>,
}

impl InfoBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block address table (index = block number).
    pub fn set_blocks(&mut self, blocks: Vec<u32>) {
        self.blocks = blocks;
    }

    pub fn add_toc_entry(&mut self, name: &str, block: u32) {
        self.toc.push((name.to_string(), block));
    }

    pub fn set_free_lists(&mut self, free_lists: &[Vec<u32>]) {
        self.free_lists = free_lists.to_vec();
    }

    /// Encoded size for a block table of `block_count` entries, the current
    /// table of contents and `free_blocks` free-list entries.
    pub fn encoded_len(&self, block_count: usize, free_blocks: usize) -> usize {
        let table = block_count.div_ceil(OFFSET_TABLE_CHUNK) * OFFSET_TABLE_CHUNK;
        let toc: usize = self.toc.iter().map(|(name, _)| 1 + name.len() + 4).sum();
        8 + 4 * table + 4 + toc + 4 * FREE_LIST_COUNT + 4 * free_blocks
    }

    pub fn generate(&self) -> Vec<u8> {
        let free_blocks = self.free_lists.iter().map(Vec::len).sum();
        let mut buf = Vec::with_capacity(self.encoded_len(self.blocks.len(), free_blocks));

        buf.put_u32(self.blocks.len() as u32);
        buf.put_u32(0);
        let table = self.blocks.len().div_ceil(OFFSET_TABLE_CHUNK) * OFFSET_TABLE_CHUNK;
        for i in 0..table {
            buf.put_u32(self.blocks.get(i).copied().unwrap_or(0));
        }

        buf.put_u32(self.toc.len() as u32);
        for (name, block) in &self.toc {
            buf.put_u8(name.len() as u8);
            buf.put_slice(name.as_bytes());
            buf.put_u32(*block);
        }

        for width in 0..FREE_LIST_COUNT {
            let list = self.free_lists.get(width).map(Vec::as_slice).unwrap_or(&[]);
            buf.put_u32(list.len() as u32);
            for &offset in list {
                buf.put_u32(offset);
            }
        }

        buf
    }
}

/// Encode the DSDB superblock.
pub fn superblock(root_node: u32, levels: u32, record_count: u32, node_count: u32, page_size: u32) -> Vec<u8> {
    RawSuperblock {
        root_node: U32::<BE>::new(root_node),
        levels: U32::<BE>::new(levels),
        record_count: U32::<BE>::new(record_count),
        node_count: U32::<BE>::new(node_count),
        page_size: U32::<BE>::new(page_size),
    }
    .as_bytes()
    .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_generation() {
        let header = HeaderBuilder::new(2048, 2048).generate();
        assert_eq!(header.len(), HEADER_SIZE);
        assert_eq!(&header[0..4], &[0, 0, 0, 1]);
        assert_eq!(&header[4..8], b"Bud1");
        assert_eq!(&header[8..12], &2048u32.to_be_bytes());
        assert_eq!(&header[12..16], &2048u32.to_be_bytes());
        assert_eq!(&header[16..20], &2048u32.to_be_bytes());
        assert_eq!(&header[20..36], &HEADER_RESERVED);
    }

    #[test]
    fn test_info_block_of_fresh_store_is_1264_bytes() {
        // A fresh Finder store: one block, no TOC, 25 free blocks.
        let builder = InfoBlockBuilder::new();
        assert_eq!(builder.encoded_len(1, 25), 1264);
    }

    #[test]
    fn test_info_block_generation() {
        let mut builder = InfoBlockBuilder::new();
        builder.set_blocks(vec![0x80B, 0x25, 0x100C]);
        builder.add_toc_entry(DSDB_NAME, DSDB_BLOCK_ID);
        let mut free = vec![Vec::new(); FREE_LIST_COUNT];
        free[6] = vec![64];
        builder.set_free_lists(&free);

        let block = builder.generate();
        assert_eq!(block.len(), builder.encoded_len(3, 1));
        assert_eq!(&block[0..4], &3u32.to_be_bytes());
        assert_eq!(&block[8..12], &0x80Bu32.to_be_bytes());
        // Table padded to 256 entries, then the TOC.
        let toc = 8 + 4 * 256;
        assert_eq!(&block[toc..toc + 4], &1u32.to_be_bytes());
        assert_eq!(block[toc + 4], 4);
        assert_eq!(&block[toc + 5..toc + 9], b"DSDB");
        assert_eq!(&block[toc + 9..toc + 13], &1u32.to_be_bytes());
    }

    #[test]
    fn test_superblock_layout() {
        let block = superblock(2, 0, 10, 1, 0x1000);
        assert_eq!(block.len(), DSDB_SIZE);
        assert_eq!(&block[16..20], &0x1000u32.to_be_bytes());
    }
}
