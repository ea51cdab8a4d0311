//! Constants for the `.DS_Store` buddy-allocator container.

use super::record::FourCC;

/// First four bytes of every store file (outside the allocator address space)
pub const FILE_MAGIC: u32 = 1;

/// Allocator signature that follows [`FILE_MAGIC`]
pub const BUD1_MAGIC: &[u8; 4] = b"Bud1";

/// Size of the on-disk header, including the leading [`FILE_MAGIC`]
pub const HEADER_SIZE: usize = 36;

/// Bytes between the file start and allocator offset zero
pub const ADDRESS_BASE: usize = 4;

/// Reserved header bytes as written by Finder
pub const HEADER_RESERVED: [u8; 16] = [
    0x00, 0x00, 0x10, 0x0C, 0x00, 0x00, 0x00, 0x87, 0x00, 0x00, 0x20, 0x0B, 0x00, 0x00, 0x00, 0x00,
];

/// Smallest block the allocator hands out (2^5 = 32 bytes)
pub const MIN_BLOCK_WIDTH: u32 = 5;

/// Largest block width; the address space is 2^31 bytes
pub const MAX_BLOCK_WIDTH: u32 = 31;

/// Number of free lists stored in the info block (one per width 0..=31)
pub const FREE_LIST_COUNT: usize = 32;

/// Low bits of a block address that encode log2 of the block size
pub const ADDRESS_WIDTH_MASK: u32 = 0x1F;

/// The offsets table is stored in chunks of this many entries
pub const OFFSET_TABLE_CHUNK: usize = 256;

/// Table-of-contents name of the B-tree superblock
pub const DSDB_NAME: &str = "DSDB";

/// Size of the DSDB superblock
pub const DSDB_SIZE: usize = 20;

/// B-tree page size used for every node
pub const DEFAULT_PAGE_SIZE: usize = 0x1000;

/// Smallest page size a store may use
pub const MIN_PAGE_SIZE: usize = 0x200;

/// Largest page size kept when reopening a store
pub const MAX_PAGE_SIZE: usize = 0x10000;

/// `P` field plus record count at the start of every node
pub const NODE_HEADER_SIZE: usize = 8;

/// Child pointer stored in front of each record in internal nodes
pub const CHILD_POINTER_SIZE: usize = 4;

/// Block number of the info block in the offsets table
pub const INFO_BLOCK_ID: u32 = 0;

/// Block number of the DSDB superblock in the offsets table
pub const DSDB_BLOCK_ID: u32 = 1;

/// Entry name that refers to the directory the store belongs to
pub const ROOT_ENTRY: &str = ".";

// Field codes
/// Icon location within the enclosing window (`blob`, 16 bytes)
pub const CODE_ICON_LOCATION: FourCC = *b"Iloc";
/// Window frame and view style (`blob`, 16 bytes)
pub const CODE_WINDOW_INFO: FourCC = *b"fwi0";
/// Icon view options property list (`blob`)
pub const CODE_ICON_VIEW_PLIST: FourCC = *b"icvp";
/// Sidebar width (`long`)
pub const CODE_SIDEBAR_WIDTH: FourCC = *b"fwsw";
/// Window height (`shor`)
pub const CODE_WINDOW_HEIGHT: FourCC = *b"fwvh";
/// Icon view options flag (`bool`)
pub const CODE_ICON_VIEW_FLAG: FourCC = *b"ICVO";
/// Icon label text size (`shor`)
pub const CODE_ICON_TEXT_SIZE: FourCC = *b"icvt";
/// Browser window settings property list (`blob`)
pub const CODE_BROWSER_WINDOW_PLIST: FourCC = *b"bwsp";
/// List view settings property list (`blob`)
pub const CODE_LIST_VIEW_PLIST: FourCC = *b"lsvp";
/// List view settings property list, newer variant (`blob`)
pub const CODE_LIST_VIEW_PLIST_ALT: FourCC = *b"lsvP";

// Value type tags
pub const TYPE_BOOL: FourCC = *b"bool";
pub const TYPE_LONG: FourCC = *b"long";
pub const TYPE_SHORT: FourCC = *b"shor";
pub const TYPE_BLOB: FourCC = *b"blob";
pub const TYPE_TYPE: FourCC = *b"type";
pub const TYPE_USTR: FourCC = *b"ustr";
pub const TYPE_COMP: FourCC = *b"comp";
pub const TYPE_DUTC: FourCC = *b"dutc";

/// Field codes whose blobs hold binary property lists
pub const PLIST_CODES: [FourCC; 4] = [
    CODE_ICON_VIEW_PLIST,
    CODE_BROWSER_WINDOW_PLIST,
    CODE_LIST_VIEW_PLIST,
    CODE_LIST_VIEW_PLIST_ALT,
];
