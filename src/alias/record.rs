//! Alias record encoding and decoding
//!
//! Version 2 layout (big-endian):
//!
//! ```text
//! 0    4   application info (usually zero)
//! 4    2   total record length
//! 6    2   version (2)
//! 8    2   target kind (0 file, 1 folder)
//! 10   28  volume name, Pascal string
//! 38   4   volume creation date (HFS seconds)
//! 42   2   filesystem type ("H+")
//! 44   2   disk type
//! 46   4   parent folder CNID
//! 50   64  target name, Pascal string
//! 114  4   target CNID
//! 118  4   target creation date (HFS seconds)
//! 122  4   creator code
//! 126  4   type code
//! 130  2   levels from
//! 132  2   levels to
//! 134  4   volume attributes
//! 138  2   volume filesystem id
//! 140  10  reserved
//! 150  ..  tagged extras: (u16 tag, u16 length, data, pad to even), 0xFFFF ends
//! ```

use bytes::BufMut;

use super::consts::*;
use super::{AliasError, Result};
use crate::common::binary::{ByteReader, encode_utf16be};

/// Whether the alias points at a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Folder,
}

impl TargetKind {
    pub fn code(self) -> u16 {
        match self {
            TargetKind::File => 0,
            TargetKind::Folder => 1,
        }
    }

    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(TargetKind::File),
            1 => Ok(TargetKind::Folder),
            other => Err(AliasError::InvalidFormat(format!(
                "unknown target kind {}",
                other
            ))),
        }
    }
}

/// Kind of disk the target volume lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskType {
    Fixed,
    Network,
    Floppy400K,
    Floppy800K,
    Floppy1440K,
    Ejectable,
    Other(u16),
}

impl DiskType {
    pub fn code(self) -> u16 {
        match self {
            DiskType::Fixed => 0,
            DiskType::Network => 1,
            DiskType::Floppy400K => 2,
            DiskType::Floppy800K => 3,
            DiskType::Floppy1440K => 4,
            DiskType::Ejectable => 5,
            DiskType::Other(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            0 => DiskType::Fixed,
            1 => DiskType::Network,
            2 => DiskType::Floppy400K,
            3 => DiskType::Floppy800K,
            4 => DiskType::Floppy1440K,
            5 => DiskType::Ejectable,
            other => DiskType::Other(other),
        }
    }
}

/// Volume half of an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub name: String,
    /// HFS seconds
    pub creation_date: u32,
    /// 48.16 fixed-point HFS seconds
    pub high_res_creation_date: Option<u64>,
    pub fs_type: [u8; 2],
    pub disk_type: DiskType,
    pub attribute_flags: u32,
    pub fs_id: [u8; 2],
    pub posix_mount_point: Option<String>,
}

/// Target half of an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub kind: TargetKind,
    pub filename: String,
    pub folder_cnid: u32,
    pub cnid: u32,
    /// HFS seconds
    pub creation_date: u32,
    /// 48.16 fixed-point HFS seconds
    pub high_res_creation_date: Option<u64>,
    pub creator_code: [u8; 4],
    pub type_code: [u8; 4],
    pub levels_from: i16,
    pub levels_to: i16,
    /// Name of the containing folder
    pub folder_name: Option<String>,
    /// CNIDs of the containing folders, nearest first
    pub cnid_path: Vec<u32>,
    /// `Volume:folder:name` form of the path
    pub carbon_path: Option<String>,
    /// Path relative to the volume mount point, starting with `/`
    pub posix_path: Option<String>,
}

/// A version 2 alias record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub app_info: [u8; 4],
    pub volume: VolumeInfo,
    pub target: TargetInfo,
}

impl Alias {
    /// Encode the alias record.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(ALIAS_V2_FIXED_SIZE + 256);
        buf.put_slice(&self.app_info);
        buf.put_u16(0);
        buf.put_u16(ALIAS_VERSION_2);
        buf.put_u16(self.target.kind.code());
        put_pascal(&mut buf, &to_carbon(&self.volume.name), VOLUME_NAME_SLOT);
        buf.put_u32(self.volume.creation_date);
        buf.put_slice(&self.volume.fs_type);
        buf.put_u16(self.volume.disk_type.code());
        buf.put_u32(self.target.folder_cnid);
        put_pascal(&mut buf, &to_carbon(&self.target.filename), FILE_NAME_SLOT);
        buf.put_u32(self.target.cnid);
        buf.put_u32(self.target.creation_date);
        buf.put_slice(&self.target.creator_code);
        buf.put_slice(&self.target.type_code);
        buf.put_i16(self.target.levels_from);
        buf.put_i16(self.target.levels_to);
        buf.put_u32(self.volume.attribute_flags);
        buf.put_slice(&self.volume.fs_id);
        buf.put_bytes(0, 10);
        debug_assert_eq!(buf.len(), ALIAS_V2_FIXED_SIZE);

        if let Some(folder) = &self.target.folder_name {
            put_extra(&mut buf, TAG_FOLDER_NAME, to_carbon(folder).as_bytes());
        }
        if !self.target.cnid_path.is_empty() {
            let mut ids = Vec::with_capacity(self.target.cnid_path.len() * 4);
            for id in &self.target.cnid_path {
                ids.put_u32(*id);
            }
            put_extra(&mut buf, TAG_CNID_PATH, &ids);
        }
        if let Some(path) = &self.target.carbon_path {
            put_extra(&mut buf, TAG_CARBON_PATH, path.as_bytes());
        }
        put_extra(&mut buf, TAG_UNICODE_FILENAME, &unicode_extra(&self.target.filename));
        put_extra(&mut buf, TAG_UNICODE_VOLUME_NAME, &unicode_extra(&self.volume.name));
        if let Some(date) = self.volume.high_res_creation_date {
            put_extra(&mut buf, TAG_HIGH_RES_VOLUME_CREATION_DATE, &date.to_be_bytes());
        }
        if let Some(date) = self.target.high_res_creation_date {
            put_extra(&mut buf, TAG_HIGH_RES_CREATION_DATE, &date.to_be_bytes());
        }
        if let Some(path) = &self.target.posix_path {
            put_extra(&mut buf, TAG_POSIX_PATH, path.as_bytes());
        }
        if let Some(mount) = &self.volume.posix_mount_point {
            put_extra(&mut buf, TAG_POSIX_PATH_TO_MOUNTPOINT, mount.as_bytes());
        }
        buf.put_u16(TAG_END);
        buf.put_u16(0);

        let len = u16::try_from(buf.len()).map_err(|_| AliasError::TooLarge(buf.len()))?;
        buf[4..6].copy_from_slice(&len.to_be_bytes());
        Ok(buf)
    }

    /// Decode a version 2 alias record.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(data);
        let app_info = r.read_fourcc()?;
        let length = r.read_u16()? as usize;
        let version = r.read_u16()?;
        if version != ALIAS_VERSION_2 {
            return Err(AliasError::InvalidFormat(format!(
                "unsupported alias version {}",
                version
            )));
        }
        if length < ALIAS_V2_FIXED_SIZE || length > data.len() {
            return Err(AliasError::Truncated(format!(
                "record claims {} bytes, {} available",
                length,
                data.len()
            )));
        }

        let kind = TargetKind::from_code(r.read_u16()?)?;
        let volume_name = read_pascal(&mut r, VOLUME_NAME_SLOT)?;
        let volume_date = r.read_u32()?;
        let fs_type = read_array::<2>(&mut r)?;
        let disk_type = DiskType::from_code(r.read_u16()?);
        let folder_cnid = r.read_u32()?;
        let filename = read_pascal(&mut r, FILE_NAME_SLOT)?;
        let cnid = r.read_u32()?;
        let creation_date = r.read_u32()?;
        let creator_code = r.read_fourcc()?;
        let type_code = r.read_fourcc()?;
        let levels_from = r.read_i16()?;
        let levels_to = r.read_i16()?;
        let attribute_flags = r.read_u32()?;
        let fs_id = read_array::<2>(&mut r)?;
        r.skip(10)?;

        let mut alias = Alias {
            app_info,
            volume: VolumeInfo {
                name: volume_name,
                creation_date: volume_date,
                high_res_creation_date: None,
                fs_type,
                disk_type,
                attribute_flags,
                fs_id,
                posix_mount_point: None,
            },
            target: TargetInfo {
                kind,
                filename,
                folder_cnid,
                cnid,
                creation_date,
                high_res_creation_date: None,
                creator_code,
                type_code,
                levels_from,
                levels_to,
                folder_name: None,
                cnid_path: Vec::new(),
                carbon_path: None,
                posix_path: None,
            },
        };

        while r.position() + 4 <= length {
            let tag = r.read_u16()?;
            let len = r.read_u16()? as usize;
            if tag == TAG_END {
                break;
            }
            let value = r.read_bytes(len)?;
            if len % 2 == 1 && r.position() < length {
                r.skip(1)?;
            }
            alias.apply_extra(tag, value)?;
        }

        Ok(alias)
    }

    fn apply_extra(&mut self, tag: u16, value: &[u8]) -> Result<()> {
        match tag {
            TAG_FOLDER_NAME => self.target.folder_name = Some(from_carbon(value)),
            TAG_CNID_PATH => {
                let mut r = ByteReader::new(value);
                let mut ids = Vec::with_capacity(value.len() / 4);
                while r.remaining() >= 4 {
                    ids.push(r.read_u32()?);
                }
                self.target.cnid_path = ids;
            },
            TAG_CARBON_PATH => {
                self.target.carbon_path = Some(String::from_utf8_lossy(value).into_owned())
            },
            TAG_UNICODE_FILENAME => self.target.filename = read_unicode(value)?,
            TAG_UNICODE_VOLUME_NAME => self.volume.name = read_unicode(value)?,
            TAG_HIGH_RES_VOLUME_CREATION_DATE => {
                self.volume.high_res_creation_date = Some(ByteReader::new(value).read_u64()?)
            },
            TAG_HIGH_RES_CREATION_DATE => {
                self.target.high_res_creation_date = Some(ByteReader::new(value).read_u64()?)
            },
            TAG_POSIX_PATH => {
                self.target.posix_path = Some(String::from_utf8_lossy(value).into_owned())
            },
            TAG_POSIX_PATH_TO_MOUNTPOINT => {
                self.volume.posix_mount_point = Some(String::from_utf8_lossy(value).into_owned())
            },
            other => tracing::trace!(tag = other, len = value.len(), "skipping alias extra"),
        }
        Ok(())
    }
}

/// Carbon names use `:` as the path separator, so a `:` inside a name is
/// stored as `/`.
fn to_carbon(name: &str) -> String {
    name.replace(':', "/")
}

fn from_carbon(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('/', ":")
}

fn put_pascal(buf: &mut Vec<u8>, s: &str, slot: usize) {
    let mut end = s.len().min(slot - 1);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    buf.put_u8(end as u8);
    buf.put_slice(&s.as_bytes()[..end]);
    buf.put_bytes(0, slot - 1 - end);
}

fn read_pascal(r: &mut ByteReader<'_>, slot: usize) -> Result<String> {
    let len = r.read_u8()? as usize;
    let bytes = r.read_bytes(slot - 1)?;
    Ok(from_carbon(&bytes[..len.min(slot - 1)]))
}

fn read_array<const N: usize>(r: &mut ByteReader<'_>) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(r.read_bytes(N)?);
    Ok(out)
}

fn put_extra(buf: &mut Vec<u8>, tag: u16, data: &[u8]) {
    buf.put_u16(tag);
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);
    if data.len() % 2 == 1 {
        buf.put_u8(0);
    }
}

fn unicode_extra(s: &str) -> Vec<u8> {
    let (bytes, units) = encode_utf16be(s);
    let mut out = Vec::with_capacity(2 + bytes.len());
    out.put_u16(units as u16);
    out.put_slice(&bytes);
    out
}

fn read_unicode(value: &[u8]) -> Result<String> {
    let mut r = ByteReader::new(value);
    let units = r.read_u16()? as usize;
    Ok(r.read_utf16be(units)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Alias {
        Alias {
            app_info: [0; 4],
            volume: VolumeInfo {
                name: "GitHub Copilot for Xcode".to_string(),
                creation_date: 3_800_000_000,
                high_res_creation_date: Some(3_800_000_000u64 << 16),
                fs_type: FS_TYPE_HFS_PLUS,
                disk_type: DiskType::Ejectable,
                attribute_flags: 0,
                fs_id: [0; 2],
                posix_mount_point: Some("/Volumes/GitHub Copilot for Xcode".to_string()),
            },
            target: TargetInfo {
                kind: TargetKind::File,
                filename: "background.png".to_string(),
                folder_cnid: 18,
                cnid: 21,
                creation_date: 3_800_000_100,
                high_res_creation_date: Some(3_800_000_100u64 << 16),
                creator_code: [0; 4],
                type_code: [0; 4],
                levels_from: -1,
                levels_to: -1,
                folder_name: Some(".background".to_string()),
                cnid_path: vec![18],
                carbon_path: Some(
                    "GitHub Copilot for Xcode:.background:background.png".to_string(),
                ),
                posix_path: Some("/.background/background.png".to_string()),
            },
        }
    }

    #[test]
    fn test_fixed_header_fields() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(
            u16::from_be_bytes([bytes[4], bytes[5]]) as usize,
            bytes.len()
        );
        assert_eq!(&bytes[6..8], &[0, 2]);
        assert_eq!(bytes[10], 24);
        assert_eq!(&bytes[11..35], b"GitHub Copilot for Xcode");
        assert_eq!(&bytes[42..44], b"H+");
        assert_eq!(&bytes[44..46], &[0, 5]);
        assert_eq!(bytes[50], 14);
        assert_eq!(&bytes[51..65], b"background.png");
        assert_eq!(&bytes[130..134], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[bytes.len() - 4..], &[0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_extras_are_padded_to_even_length() {
        let mut alias = sample();
        alias.target.folder_name = Some("odd".to_string());
        let bytes = alias.to_bytes().unwrap();
        // First extra starts right after the fixed part.
        assert_eq!(&bytes[150..154], &[0, 0, 0, 3]);
        assert_eq!(&bytes[154..158], b"odd\0");
        assert_eq!(&bytes[158..160], &[0, 1]);
    }

    #[test]
    fn test_decode_roundtrip() {
        let alias = sample();
        let decoded = Alias::from_bytes(&alias.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, alias);
    }

    #[test]
    fn test_long_names_survive_in_unicode_extra() {
        let mut alias = sample();
        alias.target.filename = format!("{}.png", "a".repeat(80));
        let bytes = alias.to_bytes().unwrap();
        assert_eq!(bytes[50], 63);
        let decoded = Alias::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.target.filename, alias.target.filename);
    }

    #[test]
    fn test_colon_in_name_uses_carbon_slash() {
        let mut alias = sample();
        alias.target.filename = "a:b".to_string();
        let bytes = alias.to_bytes().unwrap();
        assert_eq!(&bytes[51..54], b"a/b");
    }

    #[test]
    fn test_rejects_other_versions_and_truncation() {
        let mut bytes = sample().to_bytes().unwrap();
        assert!(matches!(
            Alias::from_bytes(&bytes[..100]),
            Err(AliasError::Truncated(_))
        ));
        bytes[7] = 3;
        assert!(matches!(
            Alias::from_bytes(&bytes),
            Err(AliasError::InvalidFormat(_))
        ));
    }
}
