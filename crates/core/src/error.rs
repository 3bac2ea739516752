//! Error types for the lzh codec.
//!
//! Every codec operation returns a structured error instead of panicking.
//! Failures fall into three families that callers care about:
//! - Input: the request itself is unusable (e.g. decompressing zero bytes)
//! - Format: a container is malformed, truncated or corrupt
//! - Capacity: a Huffman code outgrew the 64-bit code representation
//!
//! The dictionary never runs out of space: it freezes at its limit, so no
//! LZW capacity error exists.

use thiserror::Error;

/// Top-level error type for all operations in the system.
#[derive(Debug, Error)]
pub enum Error {
    /// The request cannot be processed (empty or otherwise unusable input)
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Malformed, truncated or corrupt container
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Huffman table construction or lookup failed
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the failure means the container is malformed.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// True when the request itself was unusable.
    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }
}

/// Errors caused by an unusable request.
#[derive(Debug, Error)]
pub enum InputError {
    /// Operation needs at least one byte of input
    #[error("input is empty")]
    Empty,
}

/// Container and stream format errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Buffer ends before a required field
    #[error("container truncated: need at least {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },

    /// Leading flag byte is not a known storage mode
    #[error("unknown mode flag {0:#04x}")]
    UnknownMode(u8),

    /// Reconstructed length differs from the declared original length
    #[error("length mismatch: header says {expected}, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    /// Reconstructed bytes do not hash to the stored checksum
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Dictionary limit outside the supported range
    #[error("dictionary limit {0} outside supported range")]
    InvalidDictionaryLimit(u32),

    /// Serialized code table cannot describe a prefix-free code
    #[error("invalid code table: {0}")]
    InvalidCodeTable(String),

    /// Pad count is not in 0..=7 or exceeds the payload
    #[error("invalid padding count {0}")]
    InvalidPadding(u8),

    /// LZW code neither defined nor the next code to be assigned
    #[error("undefined dictionary code {code} (next assignable {next})")]
    UndefinedCode { code: u32, next: u32 },

    /// Bit path leads outside the decode trie
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// Payload ran out of bits before the declared symbol count
    #[error("payload truncated: decoded {decoded} of {expected} symbols")]
    TruncatedPayload { decoded: u64, expected: u64 },

    /// Data bits remain after the declared symbol count
    #[error("{remaining} unconsumed payload bits after last symbol")]
    TrailingBits { remaining: usize },
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbols with non-zero frequency (cannot build a tree)
    #[error("empty frequency table: cannot build tree")]
    EmptyFrequencyTable,

    /// A code grew past the representable length
    #[error("code length {length} exceeds maximum {max}")]
    CodeLengthTooLong { length: usize, max: usize },

    /// Symbol to encode has no entry in the code table
    #[error("symbol {0} missing from code table")]
    UnknownSymbol(u32),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (e.g., requesting more than 64 bits)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),

    /// Bit limit larger than the backing buffer
    #[error("bit limit {limit} exceeds buffer of {available} bits")]
    LimitOutOfRange { limit: usize, available: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
