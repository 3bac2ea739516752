//! Container codec: orchestrates the LZW, Huffman and packing stages.
//!
//! # Pipeline
//!
//! ```text
//! compress:   bytes -> lzw::encode -> FrequencyTable -> HuffmanTree
//!                   -> packer::pack -> Container -> identity guard
//! decompress: Container -> packer::unpack -> lzw::decode -> verify
//! ```
//!
//! Every call is self-contained: no dictionary, tree or buffer survives
//! between calls, so a `Codec` can be shared freely across threads.

use crate::container::{self, Body, Container, HybridBody};
use crate::error::{Error, FormatError, InputError, Result};
use crate::frequency::FrequencyTable;
use crate::guard::{self, IdentityRule};
use crate::huffman::{CodeTable, HuffmanTree};
use crate::introspect::{self, Introspection};
use crate::lzw;
use crate::packer;

/// Tunables for compression. Decompression reads everything it needs from
/// the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Total LZW codes (seeds included) before the dictionary freezes
    pub dictionary_limit: u32,
    /// Identity guard comparison
    pub identity_rule: IdentityRule,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            dictionary_limit: lzw::DEFAULT_DICTIONARY_LIMIT,
            identity_rule: IdentityRule::default(),
        }
    }
}

impl CodecConfig {
    /// # Errors
    /// `Error::Config` if the dictionary limit is outside `256..=2^24`.
    pub fn validate(&self) -> Result<()> {
        if !lzw::is_valid_limit(self.dictionary_limit) {
            return Err(Error::Config(format!(
                "dictionary limit {} outside {}..={}",
                self.dictionary_limit,
                lzw::SEED_CODES,
                lzw::MAX_DICTIONARY_LIMIT
            )));
        }
        Ok(())
    }
}

/// Result of a compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    /// Serialized container
    pub container: Vec<u8>,
    pub original_size: u64,
    /// Container length in bytes
    pub processed_size: u64,
    /// Whether the identity guard stored the input raw
    pub is_identity: bool,
}

impl Compressed {
    /// processed / original; 0.0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            self.processed_size as f64 / self.original_size as f64
        }
    }
}

/// Hybrid LZW + Huffman codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// # Errors
    /// `Error::Config` if `config` fails validation.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compress `input`, falling back to identity storage when the hybrid
    /// container would not be smaller.
    pub fn compress(&self, input: &[u8]) -> Result<Compressed> {
        let container = if input.is_empty() {
            log::debug!("empty input, skipping hybrid stage");
            Container::identity(input)
        } else {
            let trial = encode_hybrid(input, self.config.dictionary_limit)?;
            guard::apply(trial, input, self.config.identity_rule)
        };

        let bytes = container.serialize();
        Ok(Compressed {
            original_size: input.len() as u64,
            processed_size: bytes.len() as u64,
            is_identity: matches!(container.body, Body::Identity(_)),
            container: bytes,
        })
    }

    /// Reconstruct the original bytes from a serialized container.
    ///
    /// # Errors
    /// - `InputError::Empty` for a zero-length buffer
    /// - any `FormatError` from parsing, unpacking or dictionary decoding
    /// - `FormatError::LengthMismatch` / `ChecksumMismatch` if the result
    ///   differs from what the header declares
    pub fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        if bytes.is_empty() {
            return Err(InputError::Empty.into());
        }

        let container = Container::parse(bytes)?;
        let output = match container.body {
            Body::Identity(raw) => raw,
            Body::Hybrid(hybrid) => decode_hybrid(&hybrid, container.original_len)?,
        };

        verify(&output, container.original_len, container.checksum)?;
        Ok(output)
    }

    /// Export the internal structures for `input` without compressing it.
    pub fn introspect(&self, input: &[u8]) -> Result<Introspection> {
        introspect::introspect_with(input, &self.config)
    }
}

/// Compress with the default configuration.
pub fn compress(input: &[u8]) -> Result<Compressed> {
    Codec::default().compress(input)
}

/// Decompress a container produced by any configuration.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    Codec::default().decompress(bytes)
}

/// Run the full hybrid pipeline without the identity guard.
///
/// # Errors
/// `Error::Config` if `dictionary_limit` is outside `256..=2^24`.
pub fn encode_hybrid(input: &[u8], dictionary_limit: u32) -> Result<Container> {
    CodecConfig {
        dictionary_limit,
        ..CodecConfig::default()
    }
    .validate()?;

    let encoding = lzw::encode(input, dictionary_limit);
    let table = code_table_for(&encoding.codes)?;
    assemble_hybrid(input, &encoding.codes, &table, dictionary_limit)
}

/// Huffman code table for a code stream; empty for an empty stream.
pub(crate) fn code_table_for(codes: &[u32]) -> Result<CodeTable> {
    if codes.is_empty() {
        return Ok(CodeTable::new());
    }
    HuffmanTree::from_frequencies(&FrequencyTable::from_codes(codes))?.code_table()
}

pub(crate) fn assemble_hybrid(
    input: &[u8],
    codes: &[u32],
    table: &CodeTable,
    dictionary_limit: u32,
) -> Result<Container> {
    let packed = packer::pack(codes, table)?;
    log::debug!(
        "hybrid trial: {} bytes -> {} codes, {} table entries, {} payload bytes",
        input.len(),
        codes.len(),
        table.len(),
        packed.bytes.len()
    );

    Ok(Container {
        original_len: input.len() as u64,
        checksum: container::checksum(input),
        body: Body::Hybrid(HybridBody {
            dictionary_limit,
            code_count: codes.len() as u64,
            table: table.clone(),
            padding: packed.padding,
            payload: packed.bytes,
        }),
    })
}

fn decode_hybrid(hybrid: &HybridBody, original_len: u64) -> Result<Vec<u8>> {
    // Every code expands to at least one byte.
    if hybrid.code_count > original_len {
        return Err(FormatError::LengthMismatch {
            expected: original_len,
            actual: hybrid.code_count,
        }
        .into());
    }

    let codes = packer::unpack(
        &hybrid.payload,
        hybrid.padding,
        &hybrid.table,
        hybrid.code_count,
    )?;
    let max_len = usize::try_from(original_len).unwrap_or(usize::MAX);
    lzw::decode_bounded(&codes, hybrid.dictionary_limit, max_len)
}

fn verify(output: &[u8], original_len: u64, expected: u32) -> Result<()> {
    if output.len() as u64 != original_len {
        return Err(FormatError::LengthMismatch {
            expected: original_len,
            actual: output.len() as u64,
        }
        .into());
    }
    let actual = container::checksum(output);
    if actual != expected {
        return Err(FormatError::ChecksumMismatch { expected, actual }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HEADER_SIZE;

    fn repetitive(len: usize) -> Vec<u8> {
        b"the rain in spain stays mainly in the plain. "
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect()
    }

    #[test]
    fn test_round_trip_hybrid() {
        let input = repetitive(10_000);
        let compressed = compress(&input).unwrap();

        assert!(!compressed.is_identity);
        assert!(compressed.processed_size < compressed.original_size);
        assert_eq!(compressed.container[0], 1);
        assert_eq!(decompress(&compressed.container).unwrap(), input);
    }

    #[test]
    fn test_empty_input_is_identity() {
        let compressed = compress(b"").unwrap();
        assert!(compressed.is_identity);
        assert_eq!(compressed.original_size, 0);
        assert_eq!(compressed.processed_size, HEADER_SIZE as u64);
        assert!(decompress(&compressed.container).unwrap().is_empty());
    }

    #[test]
    fn test_short_input_falls_back() {
        let compressed = compress(b"ABABABABAB").unwrap();
        assert!(compressed.is_identity);
        assert_eq!(compressed.processed_size, 10 + HEADER_SIZE as u64);
        assert_eq!(decompress(&compressed.container).unwrap(), b"ABABABABAB");
    }

    #[test]
    fn test_forced_hybrid_small_input() {
        let trial = encode_hybrid(b"ABABABABAB", lzw::DEFAULT_DICTIONARY_LIMIT).unwrap();
        let Body::Hybrid(hybrid) = &trial.body else {
            panic!("expected hybrid body");
        };
        assert!(hybrid.code_count < 10);
        assert_eq!(decompress(&trial.serialize()).unwrap(), b"ABABABABAB");
    }

    #[test]
    fn test_forced_hybrid_single_symbol() {
        let trial = encode_hybrid(b"A", lzw::DEFAULT_DICTIONARY_LIMIT).unwrap();
        let Body::Hybrid(hybrid) = &trial.body else {
            panic!("expected hybrid body");
        };
        assert_eq!(hybrid.table.single_symbol(), Some(65));
        assert_eq!(decompress(&trial.serialize()).unwrap(), b"A");
    }

    #[test]
    fn test_forced_hybrid_empty() {
        let trial = encode_hybrid(b"", lzw::DEFAULT_DICTIONARY_LIMIT).unwrap();
        let Body::Hybrid(hybrid) = &trial.body else {
            panic!("expected hybrid body");
        };
        assert!(hybrid.table.is_empty());
        assert_eq!(hybrid.code_count, 0);
        assert!(decompress(&trial.serialize()).unwrap().is_empty());
    }

    #[test]
    fn test_decompress_empty_buffer() {
        assert!(matches!(
            decompress(&[]),
            Err(Error::Input(InputError::Empty))
        ));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut container = compress(&repetitive(2000)).unwrap().container;
        container[0] = 2;
        let err = decompress(&container).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_identity_length_mismatch() {
        let mut container = compress(b"short").unwrap().container;
        container.push(b'!');
        assert!(matches!(
            decompress(&container),
            Err(Error::Format(FormatError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut container = compress(b"identity payload").unwrap().container;
        let last = container.len() - 1;
        container[last] ^= 0x20;
        assert!(matches!(
            decompress(&container),
            Err(Error::Format(FormatError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_declared_length_too_small() {
        let mut container = compress(&repetitive(5000)).unwrap().container;
        container[1..9].copy_from_slice(&10u64.to_le_bytes());
        assert!(decompress(&container).unwrap_err().is_format());
    }

    #[test]
    fn test_config_validation() {
        let config = CodecConfig {
            dictionary_limit: 100,
            ..CodecConfig::default()
        };
        assert!(matches!(Codec::new(config), Err(Error::Config(_))));
        assert!(Codec::new(CodecConfig::default()).is_ok());
    }

    #[test]
    fn test_encode_hybrid_rejects_invalid_limit() {
        for limit in [0, 100, lzw::SEED_CODES - 1, lzw::MAX_DICTIONARY_LIMIT + 1] {
            assert!(matches!(
                encode_hybrid(b"hello hello hello hello", limit),
                Err(Error::Config(_))
            ));
        }

        let container = encode_hybrid(b"hello hello hello hello", lzw::SEED_CODES).unwrap();
        assert_eq!(
            decompress(&container.serialize()).unwrap(),
            b"hello hello hello hello"
        );
    }

    #[test]
    fn test_small_dictionary_round_trip() {
        let codec = Codec::new(CodecConfig {
            dictionary_limit: 300,
            ..CodecConfig::default()
        })
        .unwrap();
        let input = repetitive(20_000);
        let compressed = codec.compress(&input).unwrap();
        // Any codec instance decodes any container.
        assert_eq!(decompress(&compressed.container).unwrap(), input);
    }

    #[test]
    fn test_larger_rule_keeps_break_even_hybrid() {
        let input = repetitive(3000);
        let trial_len = encode_hybrid(&input, lzw::DEFAULT_DICTIONARY_LIMIT)
            .unwrap()
            .serialized_len();
        assert!(trial_len < input.len());

        let codec = Codec::new(CodecConfig {
            identity_rule: IdentityRule::Larger,
            ..CodecConfig::default()
        })
        .unwrap();
        assert!(!codec.compress(&input).unwrap().is_identity);
    }

    #[test]
    fn test_ratio() {
        let compressed = compress(&repetitive(10_000)).unwrap();
        assert!(compressed.ratio() > 0.0 && compressed.ratio() < 1.0);
        assert_eq!(compress(b"").unwrap().ratio(), 0.0);
    }
}
