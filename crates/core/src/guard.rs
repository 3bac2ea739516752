//! Identity guard: keep raw bytes when hybrid coding does not pay off.
//!
//! The guard runs once per compression, after a complete trial encode. It
//! compares the full hybrid container (header, table and payload) with the
//! original input length; content type is never inspected.

use crate::container::Container;

/// When to discard a hybrid trial in favour of identity storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityRule {
    /// Fall back unless the hybrid container is strictly smaller than the
    /// original (`processed >= original`).
    #[default]
    NotSmaller,
    /// Fall back only when the hybrid container is larger than the
    /// original (`processed > original`).
    Larger,
}

impl IdentityRule {
    /// Whether a hybrid container of `processed` bytes should be replaced.
    pub fn prefers_identity(self, processed: u64, original: u64) -> bool {
        match self {
            IdentityRule::NotSmaller => processed >= original,
            IdentityRule::Larger => processed > original,
        }
    }
}

/// Choose between the hybrid `trial` and an identity container for `original`.
pub fn apply(trial: Container, original: &[u8], rule: IdentityRule) -> Container {
    let processed = trial.serialized_len() as u64;
    let original_len = original.len() as u64;

    if rule.prefers_identity(processed, original_len) {
        log::debug!(
            "identity guard: hybrid {processed} bytes vs original {original_len}, storing raw"
        );
        Container::identity(original)
    } else {
        log::debug!("identity guard: hybrid {processed} bytes vs original {original_len}, keeping hybrid");
        trial
    }
}
