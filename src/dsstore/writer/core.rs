/// `.DS_Store` file writer
///
/// Records are accumulated in memory and the whole file is laid out afresh
/// on every `write_to()`: block allocation starts from an empty address
/// space, so stale blocks from earlier versions of the file never survive.
///
/// # Block numbering
///
/// | Block | Contents |
/// |-------|----------|
/// | 0 | allocator info block |
/// | 1 | DSDB superblock |
/// | 2.. | B-tree nodes, one page each |
///
/// Blocks are *allocated* in a different order (superblock, nodes, then the
/// info block last, because its size depends on the final free lists).
///
/// # Example
///
/// ```rust,no_run
/// use finder_layout::dsstore::{IconLocation, Record, StoreWriter};
///
/// let mut writer = StoreWriter::new();
/// writer.add_record(Record::new("Applications", *b"Iloc", IconLocation::new(300, 150)));
/// writer.save("/tmp/example.DS_Store")?;
/// # Ok::<(), finder_layout::dsstore::DsStoreError>(())
/// ```
use super::super::consts::*;
use super::super::error::{DsStoreError, Result};
use super::super::record::Record;
use super::allocator::{BuddyAllocator, MAX_SPLITS_PER_ALLOCATION, block_offset, block_size};
use super::btree;
use super::header::{HeaderBuilder, InfoBlockBuilder, superblock};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writer for complete store files
#[derive(Debug, Clone)]
pub struct StoreWriter {
    /// B-tree page size in bytes
    page_size: usize,
    /// Records in insertion order; sorted when written
    records: Vec<Record>,
}

impl StoreWriter {
    /// Create a writer with Finder's 4 KiB pages
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a writer with a custom node page size
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is not a power of two of at least 512 bytes
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(
            page_size.is_power_of_two() && page_size >= MIN_PAGE_SIZE,
            "Page size must be a power of two >= 512"
        );
        Self {
            page_size,
            records: Vec::new(),
        }
    }

    /// Add a record, replacing any record with the same key
    pub fn add_record(&mut self, record: Record) {
        let key = record.key();
        if let Some(existing) = self.records.iter_mut().find(|r| r.key() == key) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Add records that are already known to have distinct keys
    pub fn extend_unique<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lay out the complete file in memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut records = self.records.clone();
        records.sort_by_cached_key(Record::key);

        let tree = btree::build(&records, self.page_size)?;
        let mut allocator = BuddyAllocator::new();

        let dsdb_address = allocator.allocate(DSDB_SIZE)?;
        let node_addresses = tree
            .nodes
            .iter()
            .map(|_| allocator.allocate(self.page_size))
            .collect::<Result<Vec<_>>>()?;

        let block_count = 2 + node_addresses.len();
        let mut info = InfoBlockBuilder::new();
        info.add_toc_entry(DSDB_NAME, DSDB_BLOCK_ID);
        let info_bound = info.encoded_len(
            block_count,
            allocator.free_block_count() + MAX_SPLITS_PER_ALLOCATION,
        );
        let info_address = allocator.allocate(info_bound)?;

        let mut blocks = Vec::with_capacity(block_count);
        blocks.push(info_address);
        blocks.push(dsdb_address);
        blocks.extend_from_slice(&node_addresses);
        info.set_blocks(blocks);
        info.set_free_lists(allocator.free_lists());
        let info_bytes = info.generate();
        if info_bytes.len() > block_size(info_address) {
            return Err(DsStoreError::Corrupted(format!(
                "info block grew to {} bytes, past its {}-byte allocation",
                info_bytes.len(),
                block_size(info_address)
            )));
        }

        let block_of = |node: usize| node as u32 + 2;
        let file_len = std::iter::once(info_address)
            .chain(std::iter::once(dsdb_address))
            .chain(node_addresses.iter().copied())
            .map(|a| ADDRESS_BASE + block_offset(a) as usize + block_size(a))
            .max()
            .unwrap_or(HEADER_SIZE);
        let mut out = vec![0u8; file_len];

        // The header records the allocated size of the info block, not its used length.
        let header =
            HeaderBuilder::new(block_offset(info_address), block_size(info_address) as u32);
        out[..HEADER_SIZE].copy_from_slice(&header.generate());
        place(&mut out, info_address, &info_bytes);
        place(
            &mut out,
            dsdb_address,
            &superblock(
                block_of(tree.root),
                tree.levels,
                tree.record_count as u32,
                tree.nodes.len() as u32,
                self.page_size as u32,
            ),
        );
        for (node, &address) in tree.nodes.iter().zip(&node_addresses) {
            place(&mut out, address, &node.encode(block_of));
        }

        tracing::debug!(
            bytes = out.len(),
            records = tree.record_count,
            nodes = tree.nodes.len(),
            "laid out .DS_Store"
        );
        Ok(out)
    }

    /// Write the store to any writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Save the store to a file, replacing it if it exists
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

impl Default for StoreWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `bytes` into the block at `address`.
fn place(out: &mut [u8], address: u32, bytes: &[u8]) {
    let start = ADDRESS_BASE + block_offset(address) as usize;
    out[start..start + bytes.len()].copy_from_slice(bytes);
}
