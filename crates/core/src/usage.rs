//! Compress/decompress usage counters.
//!
//! Counters are owned by whoever constructs them and passed by reference;
//! there is no process-global instance. Increments are atomic so concurrent
//! callers never lose a count.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the counters. With the `serde` feature, missing
/// fields deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsageSnapshot {
    pub compressed: u64,
    pub decompressed: u64,
}

#[derive(Debug, Default)]
pub struct UsageCounters {
    compressed: AtomicU64,
    decompressed: AtomicU64,
}

impl UsageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from previously persisted values.
    pub fn from_snapshot(snapshot: UsageSnapshot) -> Self {
        Self {
            compressed: AtomicU64::new(snapshot.compressed),
            decompressed: AtomicU64::new(snapshot.decompressed),
        }
    }

    /// Count one successful compression; returns the new total.
    pub fn record_compress(&self) -> u64 {
        self.compressed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count one successful decompression; returns the new total.
    pub fn record_decompress(&self) -> u64 {
        self.decompressed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            compressed: self.compressed.load(Ordering::Relaxed),
            decompressed: self.decompressed.load(Ordering::Relaxed),
        }
    }

    /// Zero both counters and return the values they held.
    pub fn reset(&self) -> UsageSnapshot {
        UsageSnapshot {
            compressed: self.compressed.swap(0, Ordering::Relaxed),
            decompressed: self.decompressed.swap(0, Ordering::Relaxed),
        }
    }
}
