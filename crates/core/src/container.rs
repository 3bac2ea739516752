//! Container serialization and parsing.
//!
//! A container is the self-describing artifact produced by compression.
//!
//! # Container Format
//!
//! All integers are little-endian.
//!
//! ```text
//! +----------------------+
//! | mode (1)             |  0 = identity, 1 = hybrid
//! +----------------------+
//! | original_len (8)     |  u64 length of the original bytes
//! +----------------------+
//! | crc32 (4)            |  u32 checksum of the original bytes
//! +======================+  identity: raw bytes follow, nothing else
//! | dictionary_limit (4) |  u32 LZW code limit, 256..=2^24
//! +----------------------+
//! | code_count (8)       |  u64 number of LZW codes in the payload
//! +----------------------+
//! | entry_count (4)      |  u32 code table entries (0 iff code_count == 0)
//! +----------------------+
//! | entries (variable)   |  symbol (2 or 3 bytes), length (1),
//! |                      |  code bits MSB-first in ceil(length / 8) bytes
//! +----------------------+
//! | padding (1)          |  zero bits appended to the payload (0-7)
//! +----------------------+
//! | payload (variable)   |  Huffman-packed code stream
//! +----------------------+
//! ```
//!
//! Entries are written in strictly ascending symbol order. Symbols take two
//! bytes when the dictionary limit is at most 2^16 and three bytes above it.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{FormatError, Result};
use crate::huffman::{Code, CodeTable, MAX_CODE_LEN};
use crate::lzw;

/// Size of the fixed header shared by both modes.
pub const HEADER_SIZE: usize = 13;

/// Fixed fields of the hybrid body before the table entries.
const HYBRID_PREFIX_SIZE: usize = 16;

/// Storage mode recorded in the leading flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Identity,
    Hybrid,
}

impl Mode {
    pub fn flag(self) -> u8 {
        match self {
            Mode::Identity => 0,
            Mode::Hybrid => 1,
        }
    }

    /// # Errors
    /// `FormatError::UnknownMode` for any flag other than 0 or 1.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Mode::Identity),
            1 => Ok(Mode::Hybrid),
            other => Err(FormatError::UnknownMode(other).into()),
        }
    }
}

/// Hybrid-mode payload and the metadata needed to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridBody {
    pub dictionary_limit: u32,
    pub code_count: u64,
    pub table: CodeTable,
    pub padding: u8,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Identity(Vec<u8>),
    Hybrid(HybridBody),
}

/// A parsed or freshly built container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub original_len: u64,
    pub checksum: u32,
    pub body: Body,
}

/// CRC-32 used for the container checksum.
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Bytes per symbol in the serialized code table.
pub fn symbol_width(dictionary_limit: u32) -> usize {
    if dictionary_limit <= 1 << 16 {
        2
    } else {
        3
    }
}

impl Container {
    /// Identity container storing `original` verbatim.
    pub fn identity(original: &[u8]) -> Self {
        Self {
            original_len: original.len() as u64,
            checksum: checksum(original),
            body: Body::Identity(original.to_vec()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self.body {
            Body::Identity(_) => Mode::Identity,
            Body::Hybrid(_) => Mode::Hybrid,
        }
    }

    /// Exact length of `serialize()` without building it.
    pub fn serialized_len(&self) -> usize {
        HEADER_SIZE
            + match &self.body {
                Body::Identity(raw) => raw.len(),
                Body::Hybrid(hybrid) => {
                    let width = symbol_width(hybrid.dictionary_limit);
                    let table: usize = hybrid
                        .table
                        .iter()
                        .map(|(_, code)| width + 1 + (code.len as usize).div_ceil(8))
                        .sum();
                    HYBRID_PREFIX_SIZE + table + 1 + hybrid.payload.len()
                }
            }
    }

    /// Serialize into the wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.push(self.mode().flag());
        out.extend_from_slice(&self.original_len.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());

        match &self.body {
            Body::Identity(raw) => out.extend_from_slice(raw),
            Body::Hybrid(hybrid) => {
                out.extend_from_slice(&hybrid.dictionary_limit.to_le_bytes());
                out.extend_from_slice(&hybrid.code_count.to_le_bytes());
                out.extend_from_slice(&(hybrid.table.len() as u32).to_le_bytes());
                write_table(&hybrid.table, symbol_width(hybrid.dictionary_limit), &mut out);
                out.push(hybrid.padding);
                out.extend_from_slice(&hybrid.payload);
            }
        }

        out
    }

    /// Parse a container.
    ///
    /// Only structure is validated here; decoding verifies length and
    /// checksum against the reconstructed bytes.
    ///
    /// # Errors
    /// - `FormatError::Truncated` if a field is cut short
    /// - `FormatError::UnknownMode` for an undefined flag
    /// - `FormatError::InvalidDictionaryLimit`, `InvalidCodeTable` or
    ///   `InvalidPadding` for inconsistent hybrid metadata
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let mode = Mode::from_flag(cursor.u8()?)?;
        let original_len = cursor.u64()?;
        let checksum = cursor.u32()?;

        let body = match mode {
            Mode::Identity => Body::Identity(cursor.rest().to_vec()),
            Mode::Hybrid => Body::Hybrid(parse_hybrid(&mut cursor)?),
        };

        Ok(Self {
            original_len,
            checksum,
            body,
        })
    }
}

fn parse_hybrid(cursor: &mut Cursor<'_>) -> Result<HybridBody> {
    let dictionary_limit = cursor.u32()?;
    if !lzw::is_valid_limit(dictionary_limit) {
        return Err(FormatError::InvalidDictionaryLimit(dictionary_limit).into());
    }
    let code_count = cursor.u64()?;
    let entry_count = cursor.u32()?;

    if (code_count == 0) != (entry_count == 0)
        || entry_count > dictionary_limit
        || entry_count as u64 > code_count
    {
        return Err(FormatError::InvalidCodeTable(format!(
            "{entry_count} entries for {code_count} codes"
        ))
        .into());
    }

    let table = read_table(cursor, entry_count, dictionary_limit)?;
    let padding = cursor.u8()?;
    if padding > 7 {
        return Err(FormatError::InvalidPadding(padding).into());
    }

    Ok(HybridBody {
        dictionary_limit,
        code_count,
        table,
        padding,
        payload: cursor.rest().to_vec(),
    })
}

fn write_table(table: &CodeTable, width: usize, out: &mut Vec<u8>) {
    for (symbol, code) in table.iter() {
        out.extend_from_slice(&symbol.to_le_bytes()[..width]);
        out.push(code.len);

        let mut writer = BitWriter::new();
        for shift in (0..code.len).rev() {
            writer.write_bit((code.bits >> shift) & 1 == 1);
        }
        out.extend_from_slice(&writer.finish().bytes);
    }
}

fn read_table(cursor: &mut Cursor<'_>, entries: u32, dictionary_limit: u32) -> Result<CodeTable> {
    let width = symbol_width(dictionary_limit);
    let mut table = CodeTable::new();
    let mut previous: Option<u32> = None;

    for _ in 0..entries {
        let mut symbol_bytes = [0u8; 4];
        symbol_bytes[..width].copy_from_slice(cursor.take(width)?);
        let symbol = u32::from_le_bytes(symbol_bytes);

        if symbol >= dictionary_limit || previous.is_some_and(|p| symbol <= p) {
            return Err(FormatError::InvalidCodeTable(format!(
                "symbol {symbol} out of order or beyond limit {dictionary_limit}"
            ))
            .into());
        }

        let len = cursor.u8()?;
        if len == 0 || len as usize > MAX_CODE_LEN {
            return Err(FormatError::InvalidCodeTable(format!(
                "symbol {symbol} has code length {len}"
            ))
            .into());
        }

        let code_bytes = cursor.take((len as usize).div_ceil(8))?;
        let mut reader = BitReader::new(code_bytes);
        let bits = reader.read_bits(len as usize)?;
        let filler = reader.bits_remaining();
        if filler > 0 && reader.read_bits(filler)? != 0 {
            return Err(FormatError::InvalidCodeTable(format!(
                "symbol {symbol} has non-zero filler bits"
            ))
            .into());
        }
        table.insert(symbol, Code { bits, len });
        previous = Some(symbol);
    }

    Ok(table)
}

/// Bounds-checked little-endian reader over a byte slice.
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.position.saturating_add(n);
        if end > self.bytes.len() {
            return Err(FormatError::Truncated {
                required: end,
                actual: self.bytes.len(),
            }
            .into());
        }
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.position..];
        self.position = self.bytes.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_hybrid(dictionary_limit: u32) -> Container {
        let mut table = CodeTable::new();
        table.insert(65, Code { bits: 0b0, len: 1 });
        table.insert(300, Code { bits: 0b10, len: 2 });
        table.insert(dictionary_limit - 1, Code { bits: 0b11, len: 2 });

        Container {
            original_len: 42,
            checksum: 0xDEADBEEF,
            body: Body::Hybrid(HybridBody {
                dictionary_limit,
                code_count: 4,
                table,
                padding: 1,
                payload: vec![0b0101_1000],
            }),
        }
    }

    #[test]
    fn test_identity_round_trip() {
        let container = Container::identity(b"raw bytes");
        let bytes = container.serialize();

        assert_eq!(bytes.len(), HEADER_SIZE + 9);
        assert_eq!(bytes[0], 0);
        assert_eq!(container.serialized_len(), bytes.len());
        assert_eq!(Container::parse(&bytes).unwrap(), container);
    }

    #[test]
    fn test_hybrid_round_trip() {
        let container = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT);
        let bytes = container.serialize();

        assert_eq!(bytes[0], 1);
        assert_eq!(container.serialized_len(), bytes.len());
        // 13 header + 16 prefix + 3 entries * (2 + 1 + 1) + 1 padding + 1 payload
        assert_eq!(bytes.len(), 13 + 16 + 12 + 1 + 1);
        assert_eq!(Container::parse(&bytes).unwrap(), container);
    }

    #[test]
    fn test_wide_symbols() {
        let container = sample_hybrid(lzw::MAX_DICTIONARY_LIMIT);
        let bytes = container.serialize();
        assert_eq!(bytes.len(), 13 + 16 + 15 + 1 + 1);
        assert_eq!(Container::parse(&bytes).unwrap(), container);
    }

    #[test]
    fn test_unknown_mode() {
        let mut bytes = Container::identity(b"abc").serialize();
        bytes[0] = 0x7F;
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::Format(FormatError::UnknownMode(0x7F)))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let bytes = Container::identity(b"abc").serialize();
        assert!(matches!(
            Container::parse(&bytes[..HEADER_SIZE - 1]),
            Err(Error::Format(FormatError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_truncated_table() {
        let bytes = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT).serialize();
        for cut in HEADER_SIZE..bytes.len() - 2 {
            assert!(Container::parse(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_invalid_limit() {
        let mut bytes = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT).serialize();
        bytes[13..17].copy_from_slice(&10u32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::Format(FormatError::InvalidDictionaryLimit(10)))
        ));
    }

    #[test]
    fn test_entry_count_mismatch() {
        let mut bytes = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT).serialize();
        // code_count = 0 while entries remain
        bytes[17..25].copy_from_slice(&0u64.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::Format(FormatError::InvalidCodeTable(_)))
        ));
    }

    #[test]
    fn test_symbol_beyond_limit() {
        let mut table = CodeTable::new();
        table.insert(1, Code { bits: 0, len: 1 });
        table.insert(300, Code { bits: 1, len: 1 });
        let container = Container {
            original_len: 2,
            checksum: 0,
            body: Body::Hybrid(HybridBody {
                dictionary_limit: lzw::SEED_CODES,
                code_count: 2,
                table,
                padding: 6,
                payload: vec![0b0100_0000],
            }),
        };
        assert!(matches!(
            Container::parse(&container.serialize()),
            Err(Error::Format(FormatError::InvalidCodeTable(_)))
        ));
    }

    #[test]
    fn test_code_filler_bits_rejected() {
        let mut bytes = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT).serialize();
        // First entry: symbol at 29..31, length at 31, code byte at 32.
        assert_eq!(bytes[31], 1);
        bytes[32] |= 0b0000_0001;
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::Format(FormatError::InvalidCodeTable(_)))
        ));
    }

    #[test]
    fn test_bad_padding() {
        let container = sample_hybrid(lzw::DEFAULT_DICTIONARY_LIMIT);
        let mut bytes = container.serialize();
        let padding_at = bytes.len() - 2;
        bytes[padding_at] = 9;
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::Format(FormatError::InvalidPadding(9)))
        ));
    }

    #[test]
    fn test_checksum_helper() {
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"123456789"), 0xCBF43926);
    }
}
