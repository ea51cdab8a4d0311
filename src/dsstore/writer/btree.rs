//! B-tree generation for the DSDB record tree
//!
//! Records are bulk-loaded bottom-up. Sorted records are packed greedily into
//! leaf pages; the record that would overflow a page becomes the separator
//! between two leaves and moves up a level. The same packing runs on each
//! level of separators until a single root remains.
//!
//! Node layout:
//!
//! ```text
//! u32  P      0 for a leaf, otherwise the rightmost child block
//! u32  count  number of records
//! leaf:      record * count
//! internal:  (u32 child, record) * count
//! ```

use bytes::BufMut;
use std::ops::Range;

use super::super::consts::*;
use super::super::error::{DsStoreError, Result};
use super::super::record::{Record, fourcc_to_string};

/// One node of the tree, with children referenced by node index.
#[derive(Debug, Clone)]
pub struct Node {
    /// Records in key order
    pub records: Vec<Record>,
    /// Child node indices; empty for leaves, otherwise `records.len() + 1`
    pub children: Vec<usize>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Serialize this node, mapping child indices through `block_of`.
    pub fn encode(&self, block_of: impl Fn(usize) -> u32) -> Vec<u8> {
        let mut buf = Vec::new();
        match self.children.last() {
            Some(&rightmost) => buf.put_u32(block_of(rightmost)),
            None => buf.put_u32(0),
        }
        buf.put_u32(self.records.len() as u32);
        for (i, record) in self.records.iter().enumerate() {
            if !self.is_leaf() {
                buf.put_u32(block_of(self.children[i]));
            }
            record.write_to(&mut buf);
        }
        buf
    }
}

/// A fully built tree, ready to be assigned blocks.
#[derive(Debug, Clone)]
pub struct BTree {
    pub nodes: Vec<Node>,
    /// Index of the root node in `nodes`
    pub root: usize,
    /// Number of internal levels above the leaves
    pub levels: u32,
    pub record_count: usize,
}

/// Bulk-load sorted records into pages of `page_size` bytes.
pub fn build(records: &[Record], page_size: usize) -> Result<BTree> {
    for record in records {
        let needed = NODE_HEADER_SIZE + CHILD_POINTER_SIZE + record.encoded_len();
        if needed > page_size {
            return Err(DsStoreError::RecordTooLarge {
                name: record.name.clone(),
                code: fourcc_to_string(&record.code),
                size: needed,
                page_size,
            });
        }
    }

    let mut nodes = Vec::new();
    let mut children = Vec::new();
    let mut separators = Vec::new();

    let groups = partition(records, 0, page_size);
    for (i, group) in groups.iter().enumerate() {
        nodes.push(Node {
            records: records[group.clone()].to_vec(),
            children: Vec::new(),
        });
        children.push(nodes.len() - 1);
        if i + 1 < groups.len() {
            separators.push(records[group.end].clone());
        }
    }

    let mut levels = 0;
    while children.len() > 1 {
        levels += 1;
        let groups = partition(&separators, CHILD_POINTER_SIZE, page_size);
        let mut next_children = Vec::with_capacity(groups.len());
        let mut next_separators = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            nodes.push(Node {
                records: separators[group.clone()].to_vec(),
                children: children[group.start..=group.end].to_vec(),
            });
            next_children.push(nodes.len() - 1);
            if i + 1 < groups.len() {
                next_separators.push(separators[group.end].clone());
            }
        }
        children = next_children;
        separators = next_separators;
    }

    tracing::debug!(
        records = records.len(),
        nodes = nodes.len(),
        levels,
        "built record tree"
    );

    Ok(BTree {
        root: children[0],
        nodes,
        levels,
        record_count: records.len(),
    })
}

/// Split `records` into node-sized groups.
///
/// Consecutive groups are separated by exactly one record (the one at
/// `group.end`), which the caller promotes to the next level. `overhead` is
/// the per-record cost on top of the record itself.
fn partition(records: &[Record], overhead: usize, page_size: usize) -> Vec<Range<usize>> {
    let n = records.len();
    let mut groups = Vec::new();
    let mut start = 0;

    loop {
        let mut used = NODE_HEADER_SIZE;
        let mut end = start;
        while end < n && used + overhead + records[end].encoded_len() <= page_size {
            used += overhead + records[end].encoded_len();
            end += 1;
        }
        if end >= n {
            groups.push(start..n);
            break;
        }

        // Keep the last group non-empty when only the separator would be left.
        if end + 1 == n && end > start + 1 {
            end -= 1;
        }
        groups.push(start..end);
        start = end + 1;
        if start >= n {
            groups.push(n..n);
            break;
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsstore::record::RecordValue;

    fn blob_records(count: usize, blob_len: usize) -> Vec<Record> {
        let mut records: Vec<Record> = (0..count)
            .map(|i| {
                Record::new(
                    format!("file-{:05}", i),
                    CODE_ICON_LOCATION,
                    RecordValue::Blob(vec![i as u8; blob_len]),
                )
            })
            .collect();
        records.sort_by_key(Record::key);
        records
    }

    fn in_order(tree: &BTree, index: usize, out: &mut Vec<String>) {
        let node = &tree.nodes[index];
        for (i, record) in node.records.iter().enumerate() {
            if !node.is_leaf() {
                in_order(tree, node.children[i], out);
            }
            out.push(record.name.clone());
        }
        if let Some(&last) = node.children.last() {
            in_order(tree, last, out);
        }
    }

    #[test]
    fn test_empty_tree_is_single_leaf() {
        let tree = build(&[], DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.levels, 0);
        assert!(tree.nodes[0].is_leaf());
        assert_eq!(tree.nodes[0].encode(|_| 0), vec![0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_small_set_fits_one_leaf() {
        let records = blob_records(10, 16);
        let tree = build(&records, DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.levels, 0);
        assert_eq!(tree.nodes[tree.root].records.len(), 10);
    }

    #[test]
    fn test_multi_level_tree_preserves_order() {
        let records = blob_records(2000, 24);
        let tree = build(&records, 512).unwrap();
        assert!(tree.levels >= 2, "levels = {}", tree.levels);

        let mut names = Vec::new();
        in_order(&tree, tree.root, &mut names);
        let expected: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, expected);

        for node in &tree.nodes {
            let block_len = node.encode(|i| i as u32).len();
            assert!(block_len <= 512, "node of {} bytes", block_len);
            if !node.is_leaf() {
                assert_eq!(node.children.len(), node.records.len() + 1);
            }
        }
    }

    #[test]
    fn test_trailing_separator_is_not_orphaned() {
        // Each record is 44 bytes and a 512-byte page holds 11 of them, so a
        // greedy split of 12 would leave the last record with no right leaf.
        let records = blob_records(12, 8);
        assert_eq!(records[0].encoded_len(), 44);
        let tree = build(&records, 512).unwrap();
        assert_eq!(tree.levels, 1);
        let root = &tree.nodes[tree.root];
        assert_eq!(root.records.len(), 1);
        for &child in &root.children {
            assert!(!tree.nodes[child].records.is_empty());
        }
    }

    #[test]
    fn test_record_larger_than_page() {
        let records = blob_records(1, 5000);
        let err = build(&records, DEFAULT_PAGE_SIZE).unwrap_err();
        assert!(matches!(err, DsStoreError::RecordTooLarge { .. }));
    }
}
