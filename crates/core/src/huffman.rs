//! Huffman tree construction, code assignment and decode trie.
//!
//! Trees live in a flat arena (`Vec<Node>`) with index links, so the tree,
//! its code table and its export never contend over ownership.
//!
//! # Determinism
//!
//! Leaves enter the arena in ascending symbol order and every merged node is
//! appended after them. The min-heap is keyed by `(weight, arena index)`, so
//! equal weights always resolve toward the node created first. The same
//! frequencies therefore always produce the same tree and code table.
//!
//! # Bit convention
//!
//! Left edge = 0, right edge = 1. The first node popped from the heap becomes
//! the left child. A tree with a single leaf assigns that symbol the one-bit
//! code `0`.

use crate::error::{FormatError, HuffmanError, Result};
use crate::frequency::FrequencyTable;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Longest code the table can represent.
pub const MAX_CODE_LEN: usize = 64;

/// A codeword: the low `len` bits of `bits`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    /// The code as a string of '0' and '1'.
    pub fn to_bit_string(&self) -> String {
        (0..self.len)
            .rev()
            .map(|i| if (self.bits >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// What an arena node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { symbol: u32 },
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub weight: u64,
    pub kind: NodeKind,
}

/// Huffman tree stored as an arena.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build a minimum weighted path length tree.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if no symbol has a non-zero count.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        if freqs.is_empty() {
            return Err(HuffmanError::EmptyFrequencyTable.into());
        }

        let mut nodes = Vec::with_capacity(freqs.distinct() * 2 - 1);
        let mut heap = BinaryHeap::with_capacity(freqs.distinct());

        for (symbol, count) in freqs.iter() {
            heap.push(Reverse((count, nodes.len())));
            nodes.push(Node {
                weight: count,
                kind: NodeKind::Leaf { symbol },
            });
        }

        while heap.len() > 1 {
            let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };

            let weight = left_weight + right_weight;
            heap.push(Reverse((weight, nodes.len())));
            nodes.push(Node {
                weight,
                kind: NodeKind::Internal { left, right },
            });
        }

        let Some(Reverse((_, root))) = heap.pop() else {
            return Err(HuffmanError::EmptyFrequencyTable.into());
        };

        Ok(Self { nodes, root })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// Total weight (number of coded symbols).
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight
    }

    /// Derive the code table by walking root to leaves.
    ///
    /// # Errors
    /// `HuffmanError::CodeLengthTooLong` if a leaf sits deeper than
    /// `MAX_CODE_LEN`.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut codes = BTreeMap::new();

        if let NodeKind::Leaf { symbol } = self.nodes[self.root].kind {
            codes.insert(symbol, Code { bits: 0, len: 1 });
            return Ok(CodeTable { codes });
        }

        let mut stack = vec![(self.root, 0u64, 0usize)];
        while let Some((index, bits, len)) = stack.pop() {
            match self.nodes[index].kind {
                NodeKind::Leaf { symbol } => {
                    codes.insert(symbol, Code { bits, len: len as u8 });
                }
                NodeKind::Internal { left, right } => {
                    if len + 1 > MAX_CODE_LEN {
                        return Err(HuffmanError::CodeLengthTooLong {
                            length: len + 1,
                            max: MAX_CODE_LEN,
                        }
                        .into());
                    }
                    stack.push((right, (bits << 1) | 1, len + 1));
                    stack.push((left, bits << 1, len + 1));
                }
            }
        }

        Ok(CodeTable { codes })
    }
}

/// Symbol → codeword mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u32, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code without validation; `DecodeTrie::from_table` checks
    /// prefix-freeness for tables read from untrusted input.
    pub fn insert(&mut self, symbol: u32, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: u32) -> Option<Code> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The only symbol of a single-entry table.
    pub fn single_symbol(&self) -> Option<u32> {
        if self.codes.len() == 1 {
            self.codes.keys().next().copied()
        } else {
            None
        }
    }

    /// `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Code)> + '_ {
        self.codes.iter().map(|(&symbol, &code)| (symbol, code))
    }

    /// Number of bits needed to encode every symbol of `freqs`.
    pub fn encoded_bits(&self, freqs: &FrequencyTable) -> u64 {
        freqs
            .iter()
            .map(|(symbol, count)| {
                self.get(symbol).map_or(0, |code| code.len as u64 * count)
            })
            .sum()
    }
}

/// Binary trie rebuilt from a code table for bit-by-bit decoding.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

#[derive(Debug, Clone, Copy, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<u32>,
}

impl DecodeTrie {
    /// Root node index.
    pub const ROOT: usize = 0;

    /// Build the trie, rejecting tables that are not prefix-free.
    ///
    /// # Errors
    /// `FormatError::InvalidCodeTable` for an empty table, a zero-length or
    /// oversized code, or any code that is a prefix of (or equal to) another.
    pub fn from_table(table: &CodeTable) -> Result<Self> {
        if table.is_empty() {
            return Err(FormatError::InvalidCodeTable("table has no entries".into()).into());
        }

        let mut nodes = vec![TrieNode::default()];
        for (symbol, code) in table.iter() {
            if code.len == 0 || code.len as usize > MAX_CODE_LEN {
                return Err(FormatError::InvalidCodeTable(format!(
                    "symbol {symbol} has code length {}",
                    code.len
                ))
                .into());
            }

            let mut current = Self::ROOT;
            for shift in (0..code.len).rev() {
                if nodes[current].symbol.is_some() {
                    return Err(prefix_conflict(symbol));
                }
                let bit = ((code.bits >> shift) & 1) as usize;
                current = match nodes[current].children[bit] {
                    Some(child) => child,
                    None => {
                        nodes.push(TrieNode::default());
                        let child = nodes.len() - 1;
                        nodes[current].children[bit] = Some(child);
                        child
                    }
                };
            }

            let node = &mut nodes[current];
            if node.symbol.is_some() || node.children.iter().any(Option::is_some) {
                return Err(prefix_conflict(symbol));
            }
            node.symbol = Some(symbol);
        }

        Ok(Self { nodes })
    }

    /// Follow one edge; `None` if the path does not exist.
    pub fn step(&self, node: usize, bit: bool) -> Option<usize> {
        self.nodes[node].children[bit as usize]
    }

    /// Symbol stored at `node`, if it is a leaf.
    pub fn symbol(&self, node: usize) -> Option<u32> {
        self.nodes[node].symbol
    }
}

fn prefix_conflict(symbol: u32) -> crate::Error {
    FormatError::InvalidCodeTable(format!("code for symbol {symbol} collides with another prefix"))
        .into()
}
