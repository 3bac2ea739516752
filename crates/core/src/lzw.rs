//! LZW dictionary stage.
//!
//! Turns a byte sequence into a stream of dictionary codes and back. Codes
//! `0..=255` are the pre-seeded single-byte phrases; every learned phrase is
//! stored as `(parent code, appended byte)` so no prefix is ever copied.
//!
//! # Freeze policy
//!
//! The dictionary holds at most `limit` codes (seeds included). Once the
//! next code would equal `limit`, insertion stops and matching continues
//! against the existing entries. The decoder applies the same rule, so the
//! limit must travel with the code stream.
//!
//! # Example
//! ```
//! use lzh_core::lzw::{self, DEFAULT_DICTIONARY_LIMIT};
//!
//! let codes = lzw::encode(b"ABABABABAB", DEFAULT_DICTIONARY_LIMIT).codes;
//! assert_eq!(codes, vec![65, 66, 256, 258, 257, 66]);
//! assert_eq!(lzw::decode(&codes, DEFAULT_DICTIONARY_LIMIT).unwrap(), b"ABABABABAB");
//! ```

use crate::error::{FormatError, Result};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of pre-seeded single-byte codes; the first learned code.
pub const SEED_CODES: u32 = 256;

/// Default dictionary limit: every code fits in 16 bits.
pub const DEFAULT_DICTIONARY_LIMIT: u32 = 1 << 16;

/// Largest supported dictionary limit (codes fit in 24 bits).
pub const MAX_DICTIONARY_LIMIT: u32 = 1 << 24;

/// Dictionary key: a known phrase extended by one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhraseKey {
    pub parent: u32,
    pub byte: u8,
}

/// One learned dictionary entry, recorded for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEntry {
    pub code: u32,
    pub parent: u32,
    pub byte: u8,
    /// Fully expanded phrase
    pub phrase: Vec<u8>,
}

/// Result of one encode pass.
#[derive(Debug, Clone, Default)]
pub struct Encoding {
    pub codes: Vec<u32>,
    /// Codes assigned when the pass ended, seeds included
    pub dictionary_size: u32,
    /// Whether the pass hit the dictionary limit
    pub frozen: bool,
    /// Learned entries in code order; empty unless tracing was requested
    pub trace: Vec<TraceEntry>,
}

/// Whether `limit` is a dictionary limit the codec supports.
pub fn is_valid_limit(limit: u32) -> bool {
    (SEED_CODES..=MAX_DICTIONARY_LIMIT).contains(&limit)
}

/// Encode `input` with a fresh dictionary.
pub fn encode(input: &[u8], limit: u32) -> Encoding {
    Encoder::new(limit).encode(input)
}

/// Encode `input` and record every learned entry.
pub fn encode_traced(input: &[u8], limit: u32) -> Encoding {
    Encoder::traced(limit).encode(input)
}

/// Single-use LZW encoder.
///
/// Consumed by `encode`, so a dictionary can never leak between inputs.
#[derive(Debug)]
pub struct Encoder {
    limit: u32,
    next_code: u32,
    table: HashMap<PhraseKey, u32>,
    trace: Option<Vec<TraceEntry>>,
}

impl Encoder {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.clamp(SEED_CODES, MAX_DICTIONARY_LIMIT),
            next_code: SEED_CODES,
            table: HashMap::new(),
            trace: None,
        }
    }

    /// Encoder that keeps a trace of learned phrases.
    pub fn traced(limit: u32) -> Self {
        Self {
            trace: Some(Vec::new()),
            ..Self::new(limit)
        }
    }

    fn is_frozen(&self) -> bool {
        self.next_code >= self.limit
    }

    pub fn encode(mut self, input: &[u8]) -> Encoding {
        let mut codes = Vec::new();
        let mut current: Option<u32> = None;

        for &byte in input {
            let Some(matched) = current else {
                current = Some(byte as u32);
                continue;
            };

            let key = PhraseKey {
                parent: matched,
                byte,
            };
            match self.table.get(&key) {
                Some(&code) => current = Some(code),
                None => {
                    codes.push(matched);
                    self.learn(key);
                    current = Some(byte as u32);
                }
            }
        }

        if let Some(matched) = current {
            codes.push(matched);
        }

        let frozen = self.is_frozen();
        if frozen {
            log::debug!("lzw dictionary frozen at {} codes", self.limit);
        }

        Encoding {
            codes,
            dictionary_size: self.next_code,
            frozen,
            trace: self.trace.unwrap_or_default(),
        }
    }

    fn learn(&mut self, key: PhraseKey) {
        if self.is_frozen() {
            return;
        }
        let code = self.next_code;
        self.table.insert(key, code);
        self.next_code += 1;

        if let Some(trace) = self.trace.as_mut() {
            let mut phrase = if key.parent < SEED_CODES {
                vec![key.parent as u8]
            } else {
                trace[(key.parent - SEED_CODES) as usize].phrase.clone()
            };
            phrase.push(key.byte);
            trace.push(TraceEntry {
                code,
                parent: key.parent,
                byte: key.byte,
                phrase,
            });
        }
    }
}

/// Decode a code stream produced with the same `limit`.
///
/// # Errors
/// - `FormatError::InvalidDictionaryLimit` for an unsupported limit
/// - `FormatError::UndefinedCode` for a code that is neither defined nor
///   the self-referencing next code
pub fn decode(codes: &[u32], limit: u32) -> Result<Vec<u8>> {
    decode_bounded(codes, limit, usize::MAX)
}

/// Decode like [`decode`], failing as soon as the output exceeds `max_len`.
///
/// # Errors
/// As [`decode`], plus `FormatError::LengthMismatch` once `max_len` is
/// passed.
pub fn decode_bounded(codes: &[u32], limit: u32, max_len: usize) -> Result<Vec<u8>> {
    if !is_valid_limit(limit) {
        return Err(FormatError::InvalidDictionaryLimit(limit).into());
    }

    // entries[code - SEED_CODES]
    let mut entries: Vec<PhraseKey> = Vec::new();
    let mut output = Vec::with_capacity(codes.len().saturating_mul(2).min(max_len));
    let mut previous: Option<u32> = None;

    for &code in codes {
        let next = SEED_CODES + entries.len() as u32;
        let frozen = next >= limit;
        let start = output.len();

        let self_reference = previous.filter(|_| code == next && !frozen);

        if code < next {
            expand(&entries, code, &mut output);
        } else if let Some(prev) = self_reference {
            // Self-reference: phrase(prev) + first byte of phrase(prev).
            expand(&entries, prev, &mut output);
            output.push(output[start]);
        } else {
            return Err(FormatError::UndefinedCode { code, next }.into());
        }
        if output.len() > max_len {
            return Err(FormatError::LengthMismatch {
                expected: max_len as u64,
                actual: output.len() as u64,
            }
            .into());
        }

        if let Some(prev) = previous.filter(|_| !frozen) {
            entries.push(PhraseKey {
                parent: prev,
                byte: output[start],
            });
        }
        previous = Some(code);
    }

    Ok(output)
}

/// Append the phrase for `code` to `output` by walking its parent chain.
fn expand(entries: &[PhraseKey], code: u32, output: &mut Vec<u8>) {
    let start = output.len();
    let mut code = code;
    while code >= SEED_CODES {
        let entry = entries[(code - SEED_CODES) as usize];
        output.push(entry.byte);
        code = entry.parent;
    }
    output.push(code as u8);
    output[start..].reverse();
}
