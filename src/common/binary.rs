//! Big-endian binary helpers shared by the store and alias codecs.
//!
//! Everything Finder writes into `.DS_Store` files and alias records is
//! big-endian, and names are stored as UTF-16BE. This module provides checked
//! readers over byte slices plus the matching string encoders.

use zerocopy::{BE, FromBytes, I16, U16, U32, U64};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
            BinaryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn check_bounds(data: &[u8], offset: usize, len: usize) -> BinaryResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(BinaryError::InsufficientData {
            expected: offset.saturating_add(len),
            available: data.len(),
        }),
    }
}

/// Read a big-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use finder_layout::common::binary::read_u16_be;
/// let data = [0x12, 0x34, 0x56, 0x78];
/// assert_eq!(read_u16_be(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_be(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_be(data: &[u8], offset: usize) -> BinaryResult<u16> {
    check_bounds(data, offset, 2)?;
    U16::<BE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u16".to_string()))
}

/// Read a big-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_be(data: &[u8], offset: usize) -> BinaryResult<i16> {
    check_bounds(data, offset, 2)?;
    I16::<BE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read i16".to_string()))
}

/// Read a big-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use finder_layout::common::binary::read_u32_be;
/// let data = [0x00, 0x00, 0x00, 0x01, b'B', b'u', b'd', b'1'];
/// assert_eq!(read_u32_be(&data, 0).unwrap(), 1);
/// assert!(read_u32_be(&data, 6).is_err());
/// ```
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> BinaryResult<u32> {
    check_bounds(data, offset, 4)?;
    U32::<BE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
}

/// Read a big-endian u64 from a byte slice at the given offset.
#[inline]
pub fn read_u64_be(data: &[u8], offset: usize) -> BinaryResult<u64> {
    check_bounds(data, offset, 8)?;
    U64::<BE>::read_from_bytes(&data[offset..offset + 8])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u64".to_string()))
}

/// Decode `units` UTF-16BE code units starting at `offset`.
///
/// Unpaired surrogates are replaced with U+FFFD.
pub fn parse_utf16be_string_len(data: &[u8], offset: usize, units: usize) -> BinaryResult<String> {
    check_bounds(data, offset, units * 2)?;
    let raw = &data[offset..offset + units * 2];
    let code_units = raw.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
    Ok(char::decode_utf16(code_units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// Encode a string as UTF-16BE, returning the bytes and the number of code units.
///
/// # Examples
///
/// ```
/// use finder_layout::common::binary::encode_utf16be;
/// let (bytes, units) = encode_utf16be("Ab");
/// assert_eq!(bytes, vec![0x00, b'A', 0x00, b'b']);
/// assert_eq!(units, 2);
/// ```
pub fn encode_utf16be(s: &str) -> (Vec<u8>, usize) {
    let mut bytes = Vec::with_capacity(s.len() * 2);
    let mut units = 0;
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
        units += 1;
    }
    (bytes, units)
}

/// Sequential big-endian reader over a byte slice.
///
/// Every read is bounds-checked; running off the end yields
/// [`BinaryError::InsufficientData`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn skip(&mut self, len: usize) -> BinaryResult<()> {
        check_bounds(self.data, self.pos, len)?;
        self.pos += len;
        Ok(())
    }

    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        check_bounds(self.data, self.pos, 1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        let v = read_u16_be(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_i16(&mut self) -> BinaryResult<i16> {
        let v = read_i16_be(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        let v = read_u32_be(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> BinaryResult<u64> {
        let v = read_u64_be(self.data, self.pos)?;
        self.pos += 8;
        Ok(v)
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> BinaryResult<&'a [u8]> {
        check_bounds(self.data, self.pos, len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a four-character code such as `Iloc` or `blob`.
    pub fn read_fourcc(&mut self) -> BinaryResult<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read `units` UTF-16BE code units.
    pub fn read_utf16be(&mut self, units: usize) -> BinaryResult<String> {
        let s = parse_utf16be_string_len(self.data, self.pos, units)?;
        self.pos += units * 2;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u16_be() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert!(read_u16_be(&data, 0).is_ok_and(|v| v == 0x1234));
        assert!(read_u16_be(&data, 2).is_ok_and(|v| v == 0x5678));
        assert!(read_u16_be(&data, 3).is_err());
    }

    #[test]
    fn test_read_u32_be_overflowing_offset() {
        let data = [0u8; 4];
        assert!(read_u32_be(&data, usize::MAX - 1).is_err());
    }

    #[test]
    fn test_utf16be_roundtrip_with_surrogates() {
        let (bytes, units) = encode_utf16be("a\u{1F600}");
        assert_eq!(units, 3);
        assert_eq!(parse_utf16be_string_len(&bytes, 0, units).unwrap(), "a\u{1F600}");
    }

    #[test]
    fn test_byte_reader_sequence() {
        let data = [0x00, 0x00, 0x00, 0x05, b'b', b'l', b'o', b'b', 0xFF];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 5);
        assert_eq!(&r.read_fourcc().unwrap(), b"blob");
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.read_u8().unwrap(), 0xFF);
        assert!(matches!(
            r.read_u8(),
            Err(BinaryError::InsufficientData { .. })
        ));
    }
}
