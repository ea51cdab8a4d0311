//! Alias record constants.

/// Size of the fixed part of a version 2 alias record
pub const ALIAS_V2_FIXED_SIZE: usize = 150;

/// Alias record format version written by this crate
pub const ALIAS_VERSION_2: u16 = 2;

/// Pascal string slot for the volume name (length byte + 27 bytes)
pub const VOLUME_NAME_SLOT: usize = 28;

/// Pascal string slot for the file name (length byte + 63 bytes)
pub const FILE_NAME_SLOT: usize = 64;

/// Filesystem signature for HFS+ (also reported for APFS volumes)
pub const FS_TYPE_HFS_PLUS: [u8; 2] = *b"H+";

/// Volume name used when a target lives on the boot volume
pub const ROOT_VOLUME_NAME: &str = "Macintosh HD";

/// Mount directory for non-boot volumes
pub const VOLUMES_DIR: &str = "Volumes";

/// Terminator tag of the extras list
pub const TAG_END: u16 = 0xFFFF;

// Extra field tags
pub const TAG_FOLDER_NAME: u16 = 0;
pub const TAG_CNID_PATH: u16 = 1;
pub const TAG_CARBON_PATH: u16 = 2;
pub const TAG_APPLESHARE_ZONE: u16 = 3;
pub const TAG_APPLESHARE_SERVER_NAME: u16 = 4;
pub const TAG_APPLESHARE_USERNAME: u16 = 5;
pub const TAG_DRIVER_NAME: u16 = 6;
pub const TAG_NETWORK_MOUNT_INFO: u16 = 9;
pub const TAG_DIALUP_INFO: u16 = 10;
pub const TAG_UNICODE_FILENAME: u16 = 14;
pub const TAG_UNICODE_VOLUME_NAME: u16 = 15;
pub const TAG_HIGH_RES_VOLUME_CREATION_DATE: u16 = 16;
pub const TAG_HIGH_RES_CREATION_DATE: u16 = 17;
pub const TAG_POSIX_PATH: u16 = 18;
pub const TAG_POSIX_PATH_TO_MOUNTPOINT: u16 = 19;
pub const TAG_RECURSIVE_ALIAS_OF_DISK_IMAGE: u16 = 20;
pub const TAG_USER_HOME_LENGTH_PREFIX: u16 = 21;
