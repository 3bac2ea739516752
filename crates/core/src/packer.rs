//! Bitstream packer and unpacker for Huffman-coded symbol streams.
//!
//! Packing concatenates each symbol's code into a zero-padded byte buffer.
//! Unpacking walks the decode trie one bit at a time and stops after the
//! declared number of symbols; the reader never sees the padding bits.

use crate::bitio::{BitReader, BitWriter, PackedBits};
use crate::error::{Error, FormatError, HuffmanError, Result};
use crate::huffman::{CodeTable, DecodeTrie};

/// Pack `symbols` using `table`.
///
/// # Errors
/// `HuffmanError::UnknownSymbol` if a symbol has no code.
pub fn pack(symbols: &[u32], table: &CodeTable) -> Result<PackedBits> {
    let mut writer = BitWriter::with_capacity(symbols.len());
    for &symbol in symbols {
        let code = table
            .get(symbol)
            .ok_or(HuffmanError::UnknownSymbol(symbol))?;
        writer.write_bits(code.bits, code.len as usize)?;
    }
    Ok(writer.finish())
}

/// Recover exactly `count` symbols from `payload`.
///
/// A single-entry table is decoded without tree descent: the payload must
/// hold one bit per symbol.
///
/// # Errors
/// - `FormatError::InvalidPadding` if `padding > 7`, exceeds the payload
///   or covers non-zero bits
/// - `FormatError::InvalidCodeTable` if the table is empty but `count > 0`,
///   or is not prefix-free
/// - `FormatError::InvalidCode` if a bit path leaves the trie
/// - `FormatError::TruncatedPayload` if bits run out early
/// - `FormatError::TrailingBits` if data bits remain after `count` symbols
pub fn unpack(payload: &[u8], padding: u8, table: &CodeTable, count: u64) -> Result<Vec<u32>> {
    if padding > 7 || (padding > 0 && payload.is_empty()) {
        return Err(FormatError::InvalidPadding(padding).into());
    }
    if let Some(&last) = payload.last() {
        if last & ((1u8 << padding) - 1) != 0 {
            return Err(FormatError::InvalidPadding(padding).into());
        }
    }
    let bit_len = payload.len() * 8 - padding as usize;
    let mut reader = BitReader::with_limit(payload, bit_len)?;

    if count == 0 {
        return finish(Vec::new(), &reader);
    }
    if table.is_empty() {
        return Err(FormatError::InvalidCodeTable("no codes for a non-empty stream".into()).into());
    }

    if let Some(symbol) = table.single_symbol() {
        if (bit_len as u64) < count {
            return Err(FormatError::TruncatedPayload {
                decoded: bit_len as u64,
                expected: count,
            }
            .into());
        }
        let remaining = bit_len - count as usize;
        if remaining > 0 {
            return Err(FormatError::TrailingBits { remaining }.into());
        }
        return Ok(vec![symbol; count as usize]);
    }

    let trie = DecodeTrie::from_table(table)?;
    // Every symbol costs at least one bit, so the payload bounds the output.
    let mut symbols = Vec::with_capacity(count.min(bit_len as u64) as usize);
    let mut node = DecodeTrie::ROOT;

    while (symbols.len() as u64) < count {
        let position = reader.position();
        let bit = match reader.read_bit() {
            Ok(bit) => bit,
            Err(Error::BitIo(_)) => {
                return Err(FormatError::TruncatedPayload {
                    decoded: symbols.len() as u64,
                    expected: count,
                }
                .into())
            }
            Err(err) => return Err(err),
        };

        node = trie
            .step(node, bit)
            .ok_or(FormatError::InvalidCode { position })?;
        if let Some(symbol) = trie.symbol(node) {
            symbols.push(symbol);
            node = DecodeTrie::ROOT;
        }
    }

    finish(symbols, &reader)
}

fn finish(symbols: Vec<u32>, reader: &BitReader<'_>) -> Result<Vec<u32>> {
    if !reader.is_empty() {
        return Err(FormatError::TrailingBits {
            remaining: reader.bits_remaining(),
        }
        .into());
    }
    Ok(symbols)
}
