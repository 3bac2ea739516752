//! Per-run metrics for codec invocations.
//!
//! Tracks bytes in and out, how many containers fell back to identity
//! storage, failures and elapsed time for one run of the tool. Unlike
//! [`UsageCounters`](crate::usage::UsageCounters) these are not persisted.
//!
//! # Thread Safety
//!
//! `Metrics` is NOT thread-safe. The CLI keeps one per process and records
//! into it from the command that runs.

use crate::codec::Compressed;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    pub start_time: Instant,
    /// Set by `complete`
    pub end_time: Option<Instant>,

    // === Input/Output ===
    /// Bytes handed to the codec
    pub input_bytes: u64,
    /// Bytes produced by the codec
    pub output_bytes: u64,

    // === Operations ===
    pub compressions: u64,
    pub decompressions: u64,
    /// Compressions stored as identity containers
    pub identity_fallbacks: u64,
    /// Operations that returned an error
    pub failures: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            compressions: 0,
            decompressions: 0,
            identity_fallbacks: 0,
            failures: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration, or elapsed time so far if not complete.
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    pub fn record_compress(&mut self, compressed: &Compressed) {
        self.compressions += 1;
        self.input_bytes += compressed.original_size;
        self.output_bytes += compressed.processed_size;
        if compressed.is_identity {
            self.identity_fallbacks += 1;
        }
    }

    pub fn record_decompress(&mut self, container_len: u64, restored_len: u64) {
        self.decompressions += 1;
        self.input_bytes += container_len;
        self.output_bytes += restored_len;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Output over input bytes. Returns 0.0 if nothing was processed.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Input bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("Input:  {} bytes ({:.2} KiB)", self.input_bytes, self.input_bytes as f64 / 1024.0);
        println!("Output: {} bytes ({:.2} KiB)", self.output_bytes, self.output_bytes as f64 / 1024.0);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Operations ===");
        println!("Compressions: {}", self.compressions);
        println!("Decompressions: {}", self.decompressions);
        println!("Identity fallbacks: {}", self.identity_fallbacks);
        println!("Failures: {}", self.failures);
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export metrics as `key=value` lines.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             compression_ratio={:.4}\n\
             compressions={}\n\
             decompressions={}\n\
             identity_fallbacks={}\n\
             failures={}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.compression_ratio(),
            self.compressions,
            self.decompressions,
            self.identity_fallbacks,
            self.failures,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
