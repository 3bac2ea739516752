//! Bit-level I/O for packing Huffman codes into bytes.
//!
//! Both directions are MSB-first: the first bit written lands in the most
//! significant bit of the first byte.
//!
//! # Padding Rules
//! - `BitWriter::finish` pads the final partial byte with zero bits and
//!   reports how many were added (0-7).
//! - `BitReader::with_limit` stops at the last data bit, so padding can
//!   never be read back as data.
//!
//! # Example
//! ```
//! use lzh_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//!
//! let packed = writer.finish();
//! assert_eq!(packed.bytes, vec![0b1011_1000]);
//! assert_eq!(packed.padding, 3);
//!
//! let mut reader = BitReader::with_limit(&packed.bytes, packed.bit_len()).unwrap();
//! assert_eq!(reader.read_bits(5).unwrap(), 0b10111);
//! assert!(reader.read_bit().is_err());
//! ```

use crate::error::{BitIoError, Result};

/// Output of a finished `BitWriter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    /// Byte-aligned data, last byte zero-padded
    pub bytes: Vec<u8>,
    /// Number of padding bits in the last byte (0-7)
    pub padding: u8,
}

impl PackedBits {
    /// Number of data bits, padding excluded.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 - self.padding as usize
    }
}

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8; a full accumulator is flushed immediately
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Write the lowest `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.bit_count as usize;
            let take = remaining.min(free);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            self.bit_buffer |= bits << (free - take);
            self.bit_count += take as u8;
            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }
            remaining = shift;
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.bit_buffer |= (bit as u8) << (7 - self.bit_count);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Flush the partial byte (zero padded) and return the result.
    pub fn finish(mut self) -> PackedBits {
        let padding = if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
            8 - self.bit_count
        } else {
            0
        };
        PackedBits {
            bytes: self.bytes,
            padding,
        }
    }
}

/// Reads bits MSB-first from a byte buffer, up to a fixed bit limit.
///
/// # Invariants
/// - `bit_position <= bit_limit <= data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
    bit_limit: usize,
}

impl<'a> BitReader<'a> {
    /// Reader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
            bit_limit: data.len() * 8,
        }
    }

    /// Reader that treats only the first `bit_limit` bits as data.
    ///
    /// # Errors
    /// `BitIoError::LimitOutOfRange` if the limit exceeds the buffer.
    pub fn with_limit(data: &'a [u8], bit_limit: usize) -> Result<Self> {
        let available = data.len() * 8;
        if bit_limit > available {
            return Err(BitIoError::LimitOutOfRange {
                limit: bit_limit,
                available,
            }
            .into());
        }
        Ok(Self {
            data,
            bit_position: 0,
            bit_limit,
        })
    }

    /// Read up to 64 bits, most significant first.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if fewer than `count` bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut result = 0u64;
        let mut remaining = count;
        while remaining > 0 {
            let bit_offset = self.bit_position % 8;
            let bits_in_byte = 8 - bit_offset;
            let take = remaining.min(bits_in_byte);

            let byte = self.data[self.bit_position / 8];
            let mask = ((1u16 << take) - 1) as u8;
            let bits = (byte >> (bits_in_byte - take)) & mask;

            result = (result << take) | bits as u64;
            self.bit_position += take;
            remaining -= take;
        }

        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_position >= self.bit_limit {
            return Err(BitIoError::UnexpectedEof.into());
        }
        let byte = self.data[self.bit_position / 8];
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    pub fn bits_remaining(&self) -> usize {
        self.bit_limit - self.bit_position
    }

    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.bit_limit
    }
}
