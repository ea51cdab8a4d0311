use super::consts::*;
use super::error::{DsStoreError, Result};
use super::record::Record;
use super::writer::allocator::{block_offset, block_size};
use crate::common::binary::ByteReader;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use zerocopy::{BE, FromBytes, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, IntoBytes, KnownLayout};

/// Raw file header (36 bytes)
///
/// The leading magic sits outside the allocator address space; every offset
/// in the header is relative to byte 4 of the file.
#[derive(Debug, Clone, DeriveFromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub(crate) struct RawHeader {
    /// Always 1
    pub magic: U32<BE>,
    /// "Bud1"
    pub signature: [u8; 4],
    /// Offset of the info block
    pub info_offset: U32<BE>,
    /// Length of the info block
    pub info_size: U32<BE>,
    /// Copy of `info_offset`
    pub info_offset_copy: U32<BE>,
    pub reserved: [u8; 16],
}

/// Raw DSDB superblock (20 bytes)
#[derive(Debug, Clone, DeriveFromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub(crate) struct RawSuperblock {
    /// Block number of the root node
    pub root_node: U32<BE>,
    /// Internal levels above the leaves
    pub levels: U32<BE>,
    pub record_count: U32<BE>,
    pub node_count: U32<BE>,
    pub page_size: U32<BE>,
}

/// Summary of the record tree as described by the DSDB superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeInfo {
    pub root_node: u32,
    pub levels: u32,
    pub record_count: u32,
    pub node_count: u32,
    pub page_size: u32,
}

/// A parsed `.DS_Store` file.
///
/// Parsing walks the allocator info block, locates the `DSDB` superblock
/// through the table of contents and collects every record of the tree in
/// key order.
#[derive(Debug, Clone)]
pub struct DsStoreFile {
    /// Block addresses indexed by block number
    blocks: Vec<u32>,
    /// Table of contents: name to block number
    toc: BTreeMap<String, u32>,
    /// Free block offsets indexed by width
    free_lists: Vec<Vec<u32>>,
    tree: TreeInfo,
    records: Vec<Record>,
}

impl DsStoreFile {
    /// Read and parse a store from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a store from memory.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(DsStoreError::NotDsStore);
        }
        let header = RawHeader::read_from_bytes(&data[..HEADER_SIZE])
            .map_err(|_| DsStoreError::NotDsStore)?;
        if header.magic.get() != FILE_MAGIC || &header.signature != BUD1_MAGIC {
            return Err(DsStoreError::NotDsStore);
        }
        if header.info_offset.get() != header.info_offset_copy.get() {
            return Err(DsStoreError::Corrupted(
                "header info block offsets differ".to_string(),
            ));
        }

        let info_start = ADDRESS_BASE + header.info_offset.get() as usize;
        let info_end = info_start + header.info_size.get() as usize;
        if info_end > data.len() {
            return Err(DsStoreError::Corrupted(format!(
                "info block {}..{} is past the end of a {}-byte file",
                info_start,
                info_end,
                data.len()
            )));
        }
        let mut info = ByteReader::new(&data[info_start..info_end]);

        let block_count = info.read_u32()? as usize;
        info.skip(4)?;
        let mut blocks = Vec::with_capacity(block_count);
        let table_len = block_count.div_ceil(OFFSET_TABLE_CHUNK) * OFFSET_TABLE_CHUNK;
        for i in 0..table_len {
            let address = info.read_u32()?;
            if i < block_count {
                blocks.push(address);
            }
        }

        let mut toc = BTreeMap::new();
        let toc_count = info.read_u32()?;
        for _ in 0..toc_count {
            let name_len = info.read_u8()? as usize;
            let name = String::from_utf8_lossy(info.read_bytes(name_len)?).into_owned();
            let block = info.read_u32()?;
            toc.insert(name, block);
        }

        let mut free_lists = Vec::with_capacity(FREE_LIST_COUNT);
        for _ in 0..FREE_LIST_COUNT {
            let count = info.read_u32()? as usize;
            let mut list = Vec::with_capacity(count.min(info.remaining() / 4));
            for _ in 0..count {
                list.push(info.read_u32()?);
            }
            free_lists.push(list);
        }

        let dsdb = *toc
            .get(DSDB_NAME)
            .ok_or_else(|| DsStoreError::Corrupted("no DSDB entry in table of contents".to_string()))?;

        let mut file = Self {
            blocks,
            toc,
            free_lists,
            tree: TreeInfo {
                root_node: 0,
                levels: 0,
                record_count: 0,
                node_count: 0,
                page_size: 0,
            },
            records: Vec::new(),
        };

        let superblock = file.block(data, dsdb)?;
        if superblock.len() < DSDB_SIZE {
            return Err(DsStoreError::Corrupted("DSDB block is truncated".to_string()));
        }
        let raw = RawSuperblock::read_from_bytes(&superblock[..DSDB_SIZE])
            .map_err(|_| DsStoreError::Corrupted("unreadable DSDB block".to_string()))?;
        file.tree = TreeInfo {
            root_node: raw.root_node.get(),
            levels: raw.levels.get(),
            record_count: raw.record_count.get(),
            node_count: raw.node_count.get(),
            page_size: raw.page_size.get(),
        };

        // The declared count is untrusted; no record is shorter than 12 bytes.
        let capacity = (file.tree.record_count as usize).min(data.len() / 12);
        let mut records = Vec::with_capacity(capacity);
        let mut visited = HashSet::new();
        file.walk(data, file.tree.root_node, 0, &mut visited, &mut records)?;
        if records.len() != file.tree.record_count as usize {
            return Err(DsStoreError::Corrupted(format!(
                "DSDB declares {} records but the tree holds {}",
                file.tree.record_count,
                records.len()
            )));
        }
        file.records = records;

        tracing::debug!(
            records = file.records.len(),
            blocks = file.blocks.len(),
            levels = file.tree.levels,
            "parsed .DS_Store"
        );
        Ok(file)
    }

    /// Bytes of block `id`, clipped to the end of the file.
    fn block<'a>(&self, data: &'a [u8], id: u32) -> Result<&'a [u8]> {
        let address = *self.blocks.get(id as usize).ok_or_else(|| {
            DsStoreError::Corrupted(format!("block {} is not in the offsets table", id))
        })?;
        let start = ADDRESS_BASE + block_offset(address) as usize;
        let end = (start + block_size(address)).min(data.len());
        if start >= end {
            return Err(DsStoreError::Corrupted(format!(
                "block {} at offset {} is past the end of the file",
                id, start
            )));
        }
        Ok(&data[start..end])
    }

    fn walk(
        &self,
        data: &[u8],
        id: u32,
        depth: u32,
        visited: &mut HashSet<u32>,
        out: &mut Vec<Record>,
    ) -> Result<()> {
        if depth > self.tree.levels || !visited.insert(id) {
            return Err(DsStoreError::Corrupted(format!(
                "node {} revisited or deeper than {} levels",
                id, self.tree.levels
            )));
        }

        let mut reader = ByteReader::new(self.block(data, id)?);
        let rightmost = reader.read_u32()?;
        let count = reader.read_u32()?;
        for _ in 0..count {
            if rightmost != 0 {
                let child = reader.read_u32()?;
                self.walk(data, child, depth + 1, visited, out)?;
            }
            out.push(Record::read_from(&mut reader)?);
        }
        if rightmost != 0 {
            self.walk(data, rightmost, depth + 1, visited, out)?;
        }
        Ok(())
    }

    /// Records in on-disk (key) order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn tree_info(&self) -> TreeInfo {
        self.tree
    }

    /// Block addresses indexed by block number.
    pub fn block_addresses(&self) -> &[u32] {
        &self.blocks
    }

    pub fn table_of_contents(&self) -> &BTreeMap<String, u32> {
        &self.toc
    }

    /// Free block offsets indexed by width.
    pub fn free_lists(&self) -> &[Vec<u32>] {
        &self.free_lists
    }
}
