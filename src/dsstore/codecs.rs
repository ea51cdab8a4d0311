//! Structured blob values Finder stores under specific field codes.
//!
//! - `Iloc`: icon position inside the window
//! - `fwi0`: window frame rectangle and view style
//! - `icvp`, `bwsp`, `lsvp`, `lsvP`: binary property lists

use bytes::BufMut;
use std::io::Cursor;

use super::consts::PLIST_CODES;
use super::error::{DsStoreError, Result};
use super::record::{FourCC, RecordValue, fourcc_to_string};
use crate::common::binary::{read_u16_be, read_u32_be};

/// Size of an `Iloc` blob
pub const ICON_LOCATION_SIZE: usize = 16;

/// Size of an `fwi0` blob
pub const WINDOW_INFO_SIZE: usize = 16;

/// Trailer Finder writes after the coordinates of an `Iloc` blob
const ICON_LOCATION_TRAILER: [u32; 2] = [0xFFFF_FFFF, 0xFFFF_0000];

/// Position of an icon inside its containing window, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconLocation {
    pub x: u32,
    pub y: u32,
}

impl IconLocation {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn to_blob(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ICON_LOCATION_SIZE);
        buf.put_u32(self.x);
        buf.put_u32(self.y);
        for word in ICON_LOCATION_TRAILER {
            buf.put_u32(word);
        }
        buf
    }

    /// Decode an `Iloc` blob. Only the coordinates are interpreted.
    pub fn from_blob(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(DsStoreError::InvalidRecord(format!(
                "Iloc blob is {} bytes, expected at least 8",
                data.len()
            )));
        }
        Ok(Self {
            x: read_u32_be(data, 0)?,
            y: read_u32_be(data, 4)?,
        })
    }
}

impl From<IconLocation> for RecordValue {
    fn from(loc: IconLocation) -> Self {
        RecordValue::Blob(loc.to_blob())
    }
}

/// View style tag stored in `fwi0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStyle {
    Icon,
    List,
    Column,
    Gallery,
    Other(FourCC),
}

impl ViewStyle {
    pub fn code(&self) -> FourCC {
        match self {
            ViewStyle::Icon => *b"icnv",
            ViewStyle::List => *b"Nlsv",
            ViewStyle::Column => *b"clmv",
            ViewStyle::Gallery => *b"Flwv",
            ViewStyle::Other(code) => *code,
        }
    }

    pub fn from_code(code: FourCC) -> Self {
        match &code {
            b"icnv" => ViewStyle::Icon,
            b"Nlsv" => ViewStyle::List,
            b"clmv" => ViewStyle::Column,
            b"Flwv" => ViewStyle::Gallery,
            _ => ViewStyle::Other(code),
        }
    }
}

/// Finder window frame (`fwi0`).
///
/// The rectangle is stored as four big-endian `u16` values in the classic
/// QuickDraw order, followed by the view style and four reserved bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
    pub view: ViewStyle,
}

impl WindowInfo {
    pub fn to_blob(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(WINDOW_INFO_SIZE);
        buf.put_u16(self.top);
        buf.put_u16(self.left);
        buf.put_u16(self.bottom);
        buf.put_u16(self.right);
        buf.put_slice(&self.view.code());
        buf.put_bytes(0, 4);
        buf
    }

    pub fn from_blob(data: &[u8]) -> Result<Self> {
        if data.len() < 12 {
            return Err(DsStoreError::InvalidRecord(format!(
                "fwi0 blob is {} bytes, expected at least 12",
                data.len()
            )));
        }
        Ok(Self {
            top: read_u16_be(data, 0)?,
            left: read_u16_be(data, 2)?,
            bottom: read_u16_be(data, 4)?,
            right: read_u16_be(data, 6)?,
            view: ViewStyle::from_code([data[8], data[9], data[10], data[11]]),
        })
    }
}

impl From<WindowInfo> for RecordValue {
    fn from(info: WindowInfo) -> Self {
        RecordValue::Blob(info.to_blob())
    }
}

/// Serialize a property list the way Finder stores it: binary format.
pub fn plist_to_blob(value: &plist::Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.to_writer_binary(&mut buf)?;
    Ok(buf)
}

/// Parse a property-list blob (binary or XML).
pub fn plist_from_blob(data: &[u8]) -> Result<plist::Value> {
    Ok(plist::Value::from_reader(Cursor::new(data))?)
}

/// Decode a blob record as a property list, naming the code on failure.
///
/// Only the codes in [`PLIST_CODES`] hold property lists.
pub fn plist_from_value(code: FourCC, value: &RecordValue) -> Result<plist::Value> {
    if !PLIST_CODES.contains(&code) {
        return Err(DsStoreError::InvalidRecord(format!(
            "{} does not hold a property list",
            fourcc_to_string(&code)
        )));
    }
    let blob = value.as_blob().ok_or_else(|| {
        DsStoreError::InvalidRecord(format!("{} is not a blob", fourcc_to_string(&code)))
    })?;
    plist_from_blob(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_location_layout() {
        let blob = IconLocation::new(100, 150).to_blob();
        assert_eq!(blob.len(), ICON_LOCATION_SIZE);
        assert_eq!(&blob[0..8], &[0, 0, 0, 100, 0, 0, 0, 150]);
        assert_eq!(&blob[8..16], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00]);
        assert_eq!(IconLocation::from_blob(&blob).unwrap(), IconLocation::new(100, 150));
    }

    #[test]
    fn test_icon_location_short_blob() {
        assert!(IconLocation::from_blob(&[0, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_window_info_layout() {
        let info = WindowInfo {
            top: 100,
            left: 200,
            bottom: 400,
            right: 600,
            view: ViewStyle::Icon,
        };
        let blob = info.to_blob();
        assert_eq!(
            blob,
            vec![0x00, 0x64, 0x00, 0xC8, 0x01, 0x90, 0x02, 0x58, b'i', b'c', b'n', b'v', 0, 0, 0, 0]
        );
        assert_eq!(WindowInfo::from_blob(&blob).unwrap(), info);
    }

    #[test]
    fn test_view_style_unknown_code_is_preserved() {
        assert_eq!(ViewStyle::from_code(*b"abcd").code(), *b"abcd");
        assert_eq!(ViewStyle::from_code(*b"Nlsv"), ViewStyle::List);
    }

    #[test]
    fn test_plist_blob_is_binary() {
        let mut dict = plist::Dictionary::new();
        dict.insert("iconSize".into(), plist::Value::Integer(128.into()));
        let blob = plist_to_blob(&plist::Value::Dictionary(dict)).unwrap();
        assert!(blob.starts_with(b"bplist00"));

        let value = plist_from_blob(&blob).unwrap();
        let size = value
            .as_dictionary()
            .and_then(|d| d.get("iconSize"))
            .and_then(|v| v.as_signed_integer());
        assert_eq!(size, Some(128));
    }

    #[test]
    fn test_plist_from_non_blob_value() {
        let err = plist_from_value(*b"icvp", &RecordValue::Long(3)).unwrap_err();
        assert!(matches!(err, DsStoreError::InvalidRecord(_)));
    }

    #[test]
    fn test_plist_codes() {
        let blob = plist_to_blob(&plist::Value::Dictionary(plist::Dictionary::new())).unwrap();
        let value = RecordValue::Blob(blob);
        for code in [*b"icvp", *b"bwsp", *b"lsvp", *b"lsvP"] {
            assert!(plist_from_value(code, &value).unwrap().as_dictionary().is_some());
        }
        let err = plist_from_value(*b"Iloc", &value).unwrap_err();
        assert!(matches!(err, DsStoreError::InvalidRecord(_)));
    }
}
