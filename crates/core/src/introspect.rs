//! Plain-data export of the codec's internal structures.
//!
//! Nothing here is needed to compress or decompress. It exists so a
//! collaborator can show how an input was modelled: which phrases the
//! dictionary learned, what the Huffman trees look like over raw bytes and
//! over the code stream, and how large each strategy's output would be.

use crate::codec::{self, CodecConfig};
use crate::container::{self, Body, Container, HEADER_SIZE};
use crate::error::{InputError, Result};
use crate::frequency::FrequencyTable;
use crate::huffman::{HuffmanTree, NodeKind};
use crate::lzw::{self, TraceEntry};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Payload bits kept in a [`BitPreview`].
pub const PREVIEW_BITS: usize = 256;

/// Storage strategy compared by [`SizeComparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Strategy {
    Identity,
    HuffmanOnly,
    Hybrid,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Identity => "identity",
            Strategy::HuffmanOnly => "huffman-only",
            Strategy::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Output sizes in bytes for each way of storing the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeComparison {
    pub original: u64,
    /// Identity container (original + header)
    pub identity: u64,
    /// Container with byte-level Huffman coding only
    pub huffman_only: u64,
    /// LZW codes at fixed symbol width, no entropy coding or header
    pub lzw_only: u64,
    /// Full hybrid container
    pub hybrid: u64,
    /// Smallest container; identity wins ties
    pub best: Strategy,
}

impl SizeComparison {
    fn new(original: u64, huffman_only: u64, lzw_only: u64, hybrid: u64) -> Self {
        let identity = original + HEADER_SIZE as u64;
        let best = if identity <= huffman_only.min(hybrid) {
            Strategy::Identity
        } else if hybrid <= huffman_only {
            Strategy::Hybrid
        } else {
            Strategy::HuffmanOnly
        };
        Self {
            original,
            identity,
            huffman_only,
            lzw_only,
            hybrid,
            best,
        }
    }
}

/// One node of an exported tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNodeExport {
    pub weight: u64,
    /// Set for leaves only
    pub symbol: Option<u32>,
    /// Indices into `TreeExport::nodes`, left first
    pub children: Vec<usize>,
}

/// A Huffman tree as index-linked plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeExport {
    pub nodes: Vec<TreeNodeExport>,
    pub root: usize,
}

impl TreeExport {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let nodes = tree
            .nodes()
            .iter()
            .map(|node| match node.kind {
                NodeKind::Leaf { symbol } => TreeNodeExport {
                    weight: node.weight,
                    symbol: Some(symbol),
                    children: Vec::new(),
                },
                NodeKind::Internal { left, right } => TreeNodeExport {
                    weight: node.weight,
                    symbol: None,
                    children: vec![left, right],
                },
            })
            .collect();
        Self {
            nodes,
            root: tree.root(),
        }
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for &child in &self.nodes[index].children {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }
}

/// Leading bits of an encoded payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitPreview {
    /// Payload length in bits, padding excluded
    pub total_bits: u64,
    /// First `min(total_bits, PREVIEW_BITS)` bits as '0'/'1'
    pub bits: String,
}

impl BitPreview {
    fn from_container(container: &Container, freqs: &FrequencyTable) -> Self {
        let Body::Hybrid(body) = &container.body else {
            return Self::default();
        };
        let total_bits = body.table.encoded_bits(freqs);
        let shown = total_bits.min(PREVIEW_BITS as u64) as usize;
        let bits = (0..shown)
            .map(|i| {
                if (body.payload[i / 8] >> (7 - i % 8)) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect();
        Self { total_bits, bits }
    }

    pub fn is_truncated(&self) -> bool {
        (self.bits.len() as u64) < self.total_bits
    }
}

/// Everything the codec derives from one input.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Introspection {
    /// Learned dictionary entries in code order
    pub dictionary: Vec<TraceEntry>,
    pub codes: Vec<u32>,
    pub byte_frequencies: FrequencyTable,
    pub byte_tree: TreeExport,
    pub code_frequencies: FrequencyTable,
    pub code_tree: TreeExport,
    /// Hybrid-stage codewords as bit-strings, ascending symbol order
    pub code_table: Vec<(u32, String)>,
    /// Byte-level Huffman payload
    pub huffman_bits: BitPreview,
    /// Hybrid payload
    pub hybrid_bits: BitPreview,
    pub sizes: SizeComparison,
}

impl Introspection {
    /// Human-readable label for a code: the byte itself when printable,
    /// `xHH` otherwise, or the expanded phrase for learned codes.
    pub fn label(&self, symbol: u32) -> String {
        if symbol < lzw::SEED_CODES {
            return byte_label(symbol as u8);
        }
        match self
            .dictionary
            .get((symbol - lzw::SEED_CODES) as usize)
        {
            Some(entry) => entry.phrase.iter().map(|&b| byte_label(b)).collect(),
            None => format!("#{symbol}"),
        }
    }
}

fn byte_label(byte: u8) -> String {
    if byte.is_ascii_graphic() || byte == b' ' {
        (byte as char).to_string()
    } else {
        format!("x{byte:02X}")
    }
}

/// Introspect with the default configuration.
pub fn introspect(input: &[u8]) -> Result<Introspection> {
    introspect_with(input, &CodecConfig::default())
}

/// # Errors
/// `InputError::Empty` for zero-length input; `Error::Config` for an
/// invalid `config`.
pub fn introspect_with(input: &[u8], config: &CodecConfig) -> Result<Introspection> {
    if input.is_empty() {
        return Err(InputError::Empty.into());
    }
    config.validate()?;

    let byte_frequencies = FrequencyTable::from_bytes(input);
    let byte_tree = HuffmanTree::from_frequencies(&byte_frequencies)?;
    let huffman_trial = codec::encode_hybrid(input, lzw::SEED_CODES)?;
    let huffman_bits = BitPreview::from_container(&huffman_trial, &byte_frequencies);

    let encoding = lzw::encode_traced(input, config.dictionary_limit);
    let code_frequencies = FrequencyTable::from_codes(&encoding.codes);
    let code_tree = HuffmanTree::from_frequencies(&code_frequencies)?;
    let table = code_tree.code_table()?;
    let hybrid_trial =
        codec::assemble_hybrid(input, &encoding.codes, &table, config.dictionary_limit)?;
    let hybrid_bits = BitPreview::from_container(&hybrid_trial, &code_frequencies);

    let lzw_only =
        encoding.codes.len() as u64 * container::symbol_width(config.dictionary_limit) as u64;

    log::trace!(
        "introspected {} bytes: {} codes, {} learned phrases",
        input.len(),
        encoding.codes.len(),
        encoding.trace.len()
    );

    Ok(Introspection {
        sizes: SizeComparison::new(
            input.len() as u64,
            huffman_trial.serialized_len() as u64,
            lzw_only,
            hybrid_trial.serialized_len() as u64,
        ),
        dictionary: encoding.trace,
        codes: encoding.codes,
        byte_frequencies,
        byte_tree: TreeExport::from_tree(&byte_tree),
        code_frequencies,
        code_tree: TreeExport::from_tree(&code_tree),
        code_table: table
            .iter()
            .map(|(symbol, code)| (symbol, code.to_bit_string()))
            .collect(),
        huffman_bits,
        hybrid_bits,
    })
}
