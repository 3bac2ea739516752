//! Frequency analysis over code streams and raw bytes.
//!
//! Counts are kept in an ordered map so iteration is always in ascending
//! symbol order; the Huffman builder relies on that for deterministic
//! tie-breaking.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Occurrence counts per symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencyTable {
    counts: BTreeMap<u32, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every code in an LZW code stream.
    pub fn from_codes(codes: &[u32]) -> Self {
        let mut table = Self::new();
        for &code in codes {
            table.add(code, 1);
        }
        table
    }

    /// Count raw byte values (used by introspection).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut histogram = [0u64; 256];
        for &byte in bytes {
            histogram[byte as usize] += 1;
        }

        let mut table = Self::new();
        for (symbol, &count) in histogram.iter().enumerate() {
            table.add(symbol as u32, count);
        }
        table
    }

    /// Add `count` occurrences of `symbol`. Zero counts are ignored.
    pub fn add(&mut self, symbol: u32, count: u64) {
        if count == 0 {
            return;
        }
        *self.counts.entry(symbol).or_insert(0) += count;
        self.total += count;
    }

    pub fn get(&self, symbol: u32) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(symbol, count)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }

    /// Shannon entropy in bits per symbol; 0.0 for an empty table.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.counts
            .values()
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_codes() {
        let table = FrequencyTable::from_codes(&[300, 65, 300, 66, 300]);
        assert_eq!(table.get(300), 3);
        assert_eq!(table.get(65), 1);
        assert_eq!(table.get(999), 0);
        assert_eq!(table.total(), 5);
        assert_eq!(table.distinct(), 3);
    }

    #[test]
    fn test_from_bytes() {
        let table = FrequencyTable::from_bytes(b"hello");
        assert_eq!(table.get(b'l' as u32), 2);
        assert_eq!(table.distinct(), 4);
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let table = FrequencyTable::from_codes(&[9, 3, 700, 3, 1]);
        let symbols: Vec<u32> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec![1, 3, 9, 700]);
    }

    #[test]
    fn test_empty() {
        let table = FrequencyTable::from_bytes(b"");
        assert!(table.is_empty());
        assert_eq!(table.entropy(), 0.0);
    }

    #[test]
    fn test_entropy() {
        let uniform = FrequencyTable::from_bytes(b"abcd");
        assert!((uniform.entropy() - 2.0).abs() < 1e-9);

        let single = FrequencyTable::from_bytes(b"aaaa");
        assert_eq!(single.entropy(), 0.0);
    }

    #[test]
    fn test_add_ignores_zero() {
        let mut table = FrequencyTable::new();
        table.add(5, 0);
        assert!(table.is_empty());
        table.add(5, 2);
        table.add(5, 3);
        assert_eq!(table.get(5), 5);
    }
}
