//! Sample input generation for `inspect --sample`.
//!
//! Generated data mixes sections that favour different strategies so the
//! size comparison has something to show:
//! - Runs of one byte (Huffman-only already does well)
//! - Sentences drawn from a small vocabulary (LZW phrases pay off)
//! - Short repeating patterns
//! - Random bytes (only identity storage avoids expansion)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SECTION_BYTES: usize = 1024;

const WORDS: &[&str] = &[
    "the", "dictionary", "learns", "every", "phrase", "once", "and", "codes", "repeat",
    "while", "huffman", "shortens", "frequent", "symbols", "input", "output",
];

/// Generate `size_bytes` of mixed-compressibility data. Same seed, same bytes.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes + SECTION_BYTES);

    while data.len() < size_bytes {
        let section = SECTION_BYTES.min(size_bytes - data.len());
        let start = data.len();

        match rng.gen_range(0..10) {
            // 20% runs
            0..=1 => {
                let byte: u8 = rng.gen();
                data.resize(start + section, byte);
            }
            // 40% word salad
            2..=5 => {
                while data.len() - start < section {
                    data.extend_from_slice(WORDS[rng.gen_range(0..WORDS.len())].as_bytes());
                    data.push(if rng.gen_ratio(1, 8) { b'\n' } else { b' ' });
                }
            }
            // 20% repeating pattern
            6..=7 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(section));
            }
            // 20% random
            _ => data.extend((0..section).map(|_| rng.gen::<u8>())),
        }
    }

    data.truncate(size_bytes);
    data
}

fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let len = rng.gen_range(3..=24);
    (0..len).map(|_| rng.gen()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_sizes() {
        for size in [0, 1, 100, 1000, 10_000, 100_000] {
            assert_eq!(generate_sample_data(999, size).len(), size);
        }
    }

    #[test]
    fn test_determinism() {
        assert_eq!(generate_sample_data(12345, 5000), generate_sample_data(12345, 5000));
    }

    #[test]
    fn test_different_seeds() {
        assert_ne!(generate_sample_data(1, 4096), generate_sample_data(2, 4096));
    }

    #[test]
    fn test_sample_round_trips() {
        let data = generate_sample_data(42, 32 * 1024);
        let compressed = lzh_core::compress(&data).unwrap();
        assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), data);
    }
}
