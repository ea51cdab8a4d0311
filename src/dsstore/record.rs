//! Store records: an entry name, a four-character field code and a typed value.
//!
//! On disk a record is laid out as:
//!
//! ```text
//! u32     name length in UTF-16 code units
//! [u16]   name, UTF-16BE
//! [u8;4]  field code (e.g. "Iloc")
//! [u8;4]  type tag (e.g. "blob")
//! ...     value, shape depends on the type tag
//! ```

use bytes::BufMut;
use std::cmp::Ordering;

use super::consts::*;
use super::error::{DsStoreError, Result};
use crate::common::binary::{ByteReader, encode_utf16be};

/// Four-character code used for field codes and type tags
pub type FourCC = [u8; 4];

/// Render a four-character code for messages and logs.
pub fn fourcc_to_string(code: &FourCC) -> String {
    String::from_utf8_lossy(code).into_owned()
}

/// Typed value of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    /// `bool`: one byte
    Bool(bool),
    /// `long`: 32-bit integer
    Long(u32),
    /// `shor`: 16-bit integer stored in a 4-byte slot
    Short(u16),
    /// `blob`: length-prefixed opaque bytes
    Blob(Vec<u8>),
    /// `type`: four-character code
    Type(FourCC),
    /// `ustr`: length-prefixed UTF-16BE string
    UStr(String),
    /// `comp`: 64-bit integer
    Comp(u64),
    /// `dutc`: 64-bit timestamp in 1/65536 s since 1904
    Dutc(u64),
}

impl RecordValue {
    /// Type tag written in front of the value.
    pub fn type_tag(&self) -> FourCC {
        match self {
            RecordValue::Bool(_) => TYPE_BOOL,
            RecordValue::Long(_) => TYPE_LONG,
            RecordValue::Short(_) => TYPE_SHORT,
            RecordValue::Blob(_) => TYPE_BLOB,
            RecordValue::Type(_) => TYPE_TYPE,
            RecordValue::UStr(_) => TYPE_USTR,
            RecordValue::Comp(_) => TYPE_COMP,
            RecordValue::Dutc(_) => TYPE_DUTC,
        }
    }

    /// Encoded size of the value, excluding the type tag.
    pub fn encoded_len(&self) -> usize {
        match self {
            RecordValue::Bool(_) => 1,
            RecordValue::Long(_) | RecordValue::Short(_) | RecordValue::Type(_) => 4,
            RecordValue::Blob(data) => 4 + data.len(),
            RecordValue::UStr(s) => 4 + 2 * s.encode_utf16().count(),
            RecordValue::Comp(_) | RecordValue::Dutc(_) => 8,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            RecordValue::Blob(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<u32> {
        match self {
            RecordValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<u16> {
        match self {
            RecordValue::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RecordValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.type_tag());
        match self {
            RecordValue::Bool(v) => buf.put_u8(u8::from(*v)),
            RecordValue::Long(v) => buf.put_u32(*v),
            RecordValue::Short(v) => {
                buf.put_u16(0);
                buf.put_u16(*v);
            },
            RecordValue::Blob(data) => {
                buf.put_u32(data.len() as u32);
                buf.put_slice(data);
            },
            RecordValue::Type(code) => buf.put_slice(code),
            RecordValue::UStr(s) => {
                let (bytes, units) = encode_utf16be(s);
                buf.put_u32(units as u32);
                buf.put_slice(&bytes);
            },
            RecordValue::Comp(v) | RecordValue::Dutc(v) => buf.put_u64(*v),
        }
    }

    pub(crate) fn read_from(tag: FourCC, reader: &mut ByteReader<'_>) -> Result<Self> {
        let value = match &tag {
            b"bool" => RecordValue::Bool(reader.read_u8()? != 0),
            b"long" => RecordValue::Long(reader.read_u32()?),
            b"shor" => {
                reader.skip(2)?;
                RecordValue::Short(reader.read_u16()?)
            },
            b"blob" => {
                let len = reader.read_u32()? as usize;
                RecordValue::Blob(reader.read_bytes(len)?.to_vec())
            },
            b"type" => RecordValue::Type(reader.read_fourcc()?),
            b"ustr" => {
                let units = reader.read_u32()? as usize;
                RecordValue::UStr(reader.read_utf16be(units)?)
            },
            b"comp" => RecordValue::Comp(reader.read_u64()?),
            b"dutc" => RecordValue::Dutc(reader.read_u64()?),
            _ => {
                return Err(DsStoreError::InvalidRecord(format!(
                    "unknown type tag '{}'",
                    fourcc_to_string(&tag)
                )));
            },
        };
        Ok(value)
    }
}

impl From<bool> for RecordValue {
    fn from(v: bool) -> Self {
        RecordValue::Bool(v)
    }
}

impl From<u32> for RecordValue {
    fn from(v: u32) -> Self {
        RecordValue::Long(v)
    }
}

impl From<u16> for RecordValue {
    fn from(v: u16) -> Self {
        RecordValue::Short(v)
    }
}

impl From<Vec<u8>> for RecordValue {
    fn from(v: Vec<u8>) -> Self {
        RecordValue::Blob(v)
    }
}

/// Key of a record inside the store.
///
/// Keys order the way Finder expects inside B-tree nodes: by case-folded
/// entry name, then by field code. The exact name breaks ties so that
/// entries differing only in case stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    folded: String,
    name: String,
    code: FourCC,
}

impl RecordKey {
    pub fn new(name: impl Into<String>, code: FourCC) -> Self {
        let name = name.into();
        Self {
            folded: name.to_lowercase(),
            name,
            code,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> FourCC {
        self.code
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded
            .cmp(&other.folded)
            .then_with(|| self.code.cmp(&other.code))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single store record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub code: FourCC,
    pub value: RecordValue,
}

impl Record {
    pub fn new(name: impl Into<String>, code: FourCC, value: impl Into<RecordValue>) -> Self {
        Self {
            name: name.into(),
            code,
            value: value.into(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.name.clone(), self.code)
    }

    /// Bytes this record occupies inside a B-tree node.
    pub fn encoded_len(&self) -> usize {
        4 + 2 * self.name.encode_utf16().count() + 4 + 4 + self.value.encoded_len()
    }

    pub(crate) fn write_to<B: BufMut>(&self, buf: &mut B) {
        let (name, units) = encode_utf16be(&self.name);
        buf.put_u32(units as u32);
        buf.put_slice(&name);
        buf.put_slice(&self.code);
        self.value.write_to(buf);
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        let units = reader.read_u32()? as usize;
        let name = reader.read_utf16be(units)?;
        let code = reader.read_fourcc()?;
        let tag = reader.read_fourcc()?;
        let value = RecordValue::read_from(tag, reader).map_err(|e| match e {
            DsStoreError::InvalidRecord(msg) => {
                DsStoreError::InvalidRecord(format!("{}/{}: {}", name, fourcc_to_string(&code), msg))
            },
            other => other,
        })?;
        Ok(Self { name, code, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(record: &Record) -> Vec<u8> {
        let mut buf = Vec::new();
        record.write_to(&mut buf);
        buf
    }

    #[test]
    fn test_short_layout() {
        let bytes = encode(&Record::new(".", CODE_WINDOW_HEIGHT, 300u16));
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 1, 0, b'.', b'f', b'w', b'v', b'h', b's', b'h', b'o', b'r', 0, 0, 0x01,
                0x2C
            ]
        );
    }

    #[test]
    fn test_encoded_len_matches_output() {
        let records = [
            Record::new("App.app", CODE_ICON_LOCATION, vec![0u8; 16]),
            Record::new(".", CODE_ICON_VIEW_FLAG, true),
            Record::new(".", CODE_SIDEBAR_WIDTH, 0u32),
            Record::new("Résumé", *b"cmmt", RecordValue::UStr("note".into())),
            Record::new("x", *b"modD", RecordValue::Dutc(7)),
        ];
        for record in &records {
            assert_eq!(encode(record).len(), record.encoded_len(), "{:?}", record);
        }
    }

    #[test]
    fn test_unknown_type_tag_is_rejected() {
        let mut bytes = encode(&Record::new("a", CODE_SIDEBAR_WIDTH, 1u32));
        bytes[10..14].copy_from_slice(b"zzzz");
        let err = Record::read_from(&mut ByteReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, DsStoreError::InvalidRecord(msg) if msg.contains("zzzz")));
    }

    #[test]
    fn test_key_order_is_case_insensitive() {
        let mut keys = vec![
            RecordKey::new("b", CODE_ICON_LOCATION),
            RecordKey::new("A", CODE_ICON_LOCATION),
            RecordKey::new(".", CODE_WINDOW_INFO),
            RecordKey::new(".", CODE_ICON_VIEW_FLAG),
        ];
        keys.sort();
        let names: Vec<_> = keys.iter().map(|k| (k.name(), k.code())).collect();
        assert_eq!(
            names,
            vec![
                (".", CODE_ICON_VIEW_FLAG),
                (".", CODE_WINDOW_INFO),
                ("A", CODE_ICON_LOCATION),
                ("b", CODE_ICON_LOCATION),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_record_roundtrip(name in "[a-zA-Z0-9 ._-]{0,40}", blob in proptest::collection::vec(any::<u8>(), 0..64), long in any::<u32>()) {
            for value in [RecordValue::Blob(blob.clone()), RecordValue::Long(long), RecordValue::Short(long as u16)] {
                let record = Record::new(name.clone(), CODE_ICON_LOCATION, value);
                let bytes = encode(&record);
                let decoded = Record::read_from(&mut ByteReader::new(&bytes)).unwrap();
                prop_assert_eq!(decoded, record);
            }
        }
    }
}
