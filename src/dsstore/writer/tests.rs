//! Integration tests for the store writer
//!
//! These tests verify that written stores parse back with the reader and
//! that the allocator bookkeeping stored in the file is self-consistent.

use super::super::consts::*;
use super::super::file::DsStoreFile;
use super::super::error::DsStoreError;
use super::super::record::{Record, RecordValue};
use super::allocator::{block_offset, block_size};
use super::core::StoreWriter;

/// File offset of the DSDB superblock in `bytes`.
fn superblock_offset(bytes: &[u8]) -> usize {
    let file = DsStoreFile::parse(bytes).unwrap();
    ADDRESS_BASE + block_offset(file.block_addresses()[DSDB_BLOCK_ID as usize]) as usize
}

fn layout_records() -> Vec<Record> {
    vec![
        Record::new(".", CODE_SIDEBAR_WIDTH, 0u32),
        Record::new(".", CODE_WINDOW_HEIGHT, 300u16),
        Record::new(".", CODE_ICON_VIEW_FLAG, true),
        Record::new("Applications", CODE_ICON_LOCATION, vec![1u8; 16]),
        Record::new(".background", CODE_ICON_LOCATION, vec![2u8; 16]),
    ]
}

#[test]
fn test_write_empty_store() {
    let bytes = StoreWriter::new().to_bytes().unwrap();
    assert_eq!(&bytes[0..8], b"\x00\x00\x00\x01Bud1");

    let file = DsStoreFile::parse(&bytes).unwrap();
    assert!(file.records().is_empty());
    let tree = file.tree_info();
    assert_eq!(tree.levels, 0);
    assert_eq!(tree.node_count, 1);
    assert_eq!(tree.page_size, DEFAULT_PAGE_SIZE as u32);
    assert_eq!(file.table_of_contents().get(DSDB_NAME), Some(&DSDB_BLOCK_ID));
}

#[test]
fn test_records_come_back_sorted() {
    let mut writer = StoreWriter::new();
    for record in layout_records() {
        writer.add_record(record);
    }

    let file = DsStoreFile::parse(&writer.to_bytes().unwrap()).unwrap();
    let keys: Vec<(&str, [u8; 4])> = file
        .records()
        .iter()
        .map(|r| (r.name.as_str(), r.code))
        .collect();
    assert_eq!(
        keys,
        vec![
            (".", CODE_ICON_VIEW_FLAG),
            (".", CODE_SIDEBAR_WIDTH),
            (".", CODE_WINDOW_HEIGHT),
            (".background", CODE_ICON_LOCATION),
            ("Applications", CODE_ICON_LOCATION),
        ]
    );
}

#[test]
fn test_add_record_replaces_same_key() {
    let mut writer = StoreWriter::new();
    writer.add_record(Record::new(".", CODE_WINDOW_HEIGHT, 300u16));
    writer.add_record(Record::new(".", CODE_WINDOW_HEIGHT, 480u16));
    assert_eq!(writer.len(), 1);

    let file = DsStoreFile::parse(&writer.to_bytes().unwrap()).unwrap();
    assert_eq!(file.records()[0].value, RecordValue::Short(480));
}

#[test]
fn test_multi_level_store_roundtrip() {
    let mut writer = StoreWriter::new();
    let count = 1500;
    writer.extend_unique((0..count).map(|i| {
        Record::new(
            format!("Item {:04}.png", i),
            CODE_ICON_LOCATION,
            RecordValue::Blob(vec![(i % 251) as u8; 16]),
        )
    }));

    let file = DsStoreFile::parse(&writer.to_bytes().unwrap()).unwrap();
    let tree = file.tree_info();
    assert!(tree.levels >= 1);
    assert!(tree.node_count > 1);
    assert_eq!(tree.record_count as usize, count);
    assert_eq!(file.records().len(), count);
    assert!(
        file.records()
            .windows(2)
            .all(|pair| pair[0].key() < pair[1].key())
    );
    assert_eq!(file.records()[42].value, RecordValue::Blob(vec![42; 16]));
}

#[test]
fn test_blocks_and_free_lists_are_disjoint() {
    let mut writer = StoreWriter::with_page_size(512);
    writer.extend_unique((0..300).map(|i| {
        Record::new(format!("f{:03}", i), CODE_ICON_LOCATION, vec![0u8; 16])
    }));
    let bytes = writer.to_bytes().unwrap();
    let file = DsStoreFile::parse(&bytes).unwrap();

    let mut spans: Vec<(u64, u64)> = vec![(0, 32)];
    for &address in file.block_addresses() {
        let start = block_offset(address) as u64;
        spans.push((start, start + block_size(address) as u64));
        assert!(ADDRESS_BASE + block_offset(address) as usize <= bytes.len());
    }
    for (width, list) in file.free_lists().iter().enumerate() {
        for &offset in list {
            assert_eq!(offset as u64 % (1u64 << width), 0);
            spans.push((offset as u64, offset as u64 + (1u64 << width)));
        }
    }
    spans.sort();
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
    // Everything below 2^31 is either allocated or free.
    let covered: u64 = spans.iter().map(|(s, e)| e - s).sum();
    assert_eq!(covered, 1u64 << 31);
}

#[test]
fn test_rejects_foreign_data() {
    assert!(DsStoreFile::parse(b"not a store at all, definitely not one").is_err());
    let mut bytes = StoreWriter::new().to_bytes().unwrap();
    bytes[16..20].copy_from_slice(&[0, 0, 0, 0x40]);
    assert!(DsStoreFile::parse(&bytes).is_err());
}

#[test]
fn test_header_records_allocated_info_size() {
    let mut writer = StoreWriter::new();
    for record in layout_records() {
        writer.add_record(record);
    }
    let bytes = writer.to_bytes().unwrap();
    let file = DsStoreFile::parse(&bytes).unwrap();

    let info_address = file.block_addresses()[INFO_BLOCK_ID as usize];
    assert_eq!(block_size(info_address), 0x800);
    assert_eq!(&bytes[8..12], &block_offset(info_address).to_be_bytes());
    assert_eq!(&bytes[12..16], &0x800u32.to_be_bytes());
    assert!(ADDRESS_BASE + block_offset(info_address) as usize + 0x800 <= bytes.len());
}

#[test]
fn test_oversized_record_count_is_corruption() {
    let mut writer = StoreWriter::new();
    for record in layout_records() {
        writer.add_record(record);
    }
    let mut bytes = writer.to_bytes().unwrap();
    let superblock = superblock_offset(&bytes);
    bytes[superblock + 8..superblock + 12].copy_from_slice(&u32::MAX.to_be_bytes());

    assert!(matches!(
        DsStoreFile::parse(&bytes),
        Err(DsStoreError::Corrupted(_))
    ));
}

#[test]
fn test_save_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".DS_Store");

    let mut writer = StoreWriter::new();
    writer.add_record(Record::new(".", CODE_ICON_TEXT_SIZE, 12u16));
    writer.save(&path).unwrap();

    let file = DsStoreFile::open(&path).unwrap();
    assert_eq!(file.records().len(), 1);
    assert_eq!(file.records()[0].value.as_short(), Some(12));
}
