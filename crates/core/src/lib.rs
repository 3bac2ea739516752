//! lzh-core: hybrid LZW + Huffman compression with an identity fallback
//!
//! This library turns an arbitrary byte stream into a compact,
//! self-describing container and back:
//! - An LZW pass replaces repeated phrases with dictionary codes
//! - A Huffman pass entropy-codes the resulting code stream
//! - An identity guard stores the input raw whenever the hybrid container
//!   would not be smaller
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: Low-level bit reading/writing
//! - `lzw`: Dictionary coding with a bounded, freezing dictionary
//! - `frequency`: Symbol counting
//! - `huffman`: Arena Huffman tree, code tables and the decode trie
//! - `packer`: Code stream packing and unpacking
//! - `guard`: Identity fallback decision
//! - `container`: Binary container layout
//! - `codec`: Compression pipeline and configuration
//! - `introspect`: Plain-data export of internal structures
//! - `usage`: Atomic compress/decompress counters
//! - `metrics`: Per-run statistics
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Stateless**: Every call builds its own dictionary and tree
//! - **Deterministic**: Identical input and configuration give identical bytes
//! - **Verified**: Decoded output is checked against the declared length and CRC
//!
//! # Example
//! ```
//! let input = b"abracadabra abracadabra abracadabra abracadabra".repeat(20);
//! let compressed = lzh_core::compress(&input).unwrap();
//! assert!(!compressed.is_identity);
//! assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), input);
//! ```

pub mod bitio;
pub mod codec;
pub mod container;
pub mod error;
pub mod frequency;
pub mod guard;
pub mod huffman;
pub mod introspect;
pub mod lzw;
pub mod metrics;
pub mod packer;
pub mod usage;

// Re-export commonly used types
pub use codec::{compress, decompress, Codec, CodecConfig, Compressed};
pub use error::{Error, Result};
pub use guard::IdentityRule;
pub use introspect::{introspect, Introspection};
pub use metrics::Metrics;
pub use usage::{UsageCounters, UsageSnapshot};
