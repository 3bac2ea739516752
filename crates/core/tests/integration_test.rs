//! Integration tests for the full lzh-core pipeline.
//!
//! These tests verify end-to-end behavior: input -> compress -> container ->
//! decompress -> output, with verification that output matches input, plus
//! the structural properties every container must satisfy.

use lzh_core::{
    codec::{self, Codec, CodecConfig},
    container::HEADER_SIZE,
    error::{Error, FormatError},
    frequency::FrequencyTable,
    huffman::{DecodeTrie, HuffmanTree},
    lzw, IdentityRule,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

fn text_like(len: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Empty, single-byte, repetitive and random inputs all survive a round trip.
#[test]
fn test_round_trip_basic_inputs() {
    let inputs: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0],
        vec![255],
        b"AAAAAAAAAA".to_vec(),
        b"ABABABABAB".to_vec(),
        text_like(50_000),
        random_bytes(42, 10_000),
        (0..=255).collect(),
    ];

    for input in inputs {
        let compressed = lzh_core::compress(&input).expect("compression failed");
        let restored = lzh_core::decompress(&compressed.container).expect("decompression failed");
        assert_eq!(restored, input, "round trip failed for {} bytes", input.len());
    }
}

/// Random data does not compress, so it must be stored raw with only the
/// header as overhead.
#[test]
fn test_identity_on_random_data() {
    for seed in [1, 2, 3] {
        let input = random_bytes(seed, 8192);
        let compressed = lzh_core::compress(&input).unwrap();

        assert!(compressed.is_identity);
        assert_eq!(compressed.container[0], 0);
        assert_eq!(
            compressed.processed_size,
            input.len() as u64 + HEADER_SIZE as u64
        );
    }
}

/// Text with repetition is stored in hybrid mode and shrinks.
#[test]
fn test_hybrid_on_repetitive_text() {
    let input = text_like(100_000);
    let compressed = lzh_core::compress(&input).unwrap();

    assert!(!compressed.is_identity);
    assert_eq!(compressed.container[0], 1);
    assert!(compressed.processed_size * 4 < compressed.original_size);
}

#[test]
fn test_compression_is_deterministic() {
    let input = text_like(20_000);
    let a = lzh_core::compress(&input).unwrap();
    let b = lzh_core::compress(&input).unwrap();
    assert_eq!(a.container, b.container);
}

/// Ten bytes of "ABAB..." need fewer than ten codes and decode exactly.
#[test]
fn test_abab_scenario() {
    let encoding = lzw::encode(b"ABABABABAB", lzw::DEFAULT_DICTIONARY_LIMIT);
    assert!(encoding.codes.len() < 10);

    let trial = codec::encode_hybrid(b"ABABABABAB", lzw::DEFAULT_DICTIONARY_LIMIT).unwrap();
    assert_eq!(
        lzh_core::decompress(&trial.serialize()).unwrap(),
        b"ABABABABAB"
    );

    let compressed = lzh_core::compress(b"ABABABABAB").unwrap();
    assert_eq!(
        lzh_core::decompress(&compressed.container).unwrap(),
        b"ABABABABAB"
    );
}

/// A single repeated byte with no learned phrases exercises the
/// one-symbol code table.
#[test]
fn test_single_symbol_stream() {
    let codec = Codec::new(CodecConfig {
        dictionary_limit: lzw::SEED_CODES,
        identity_rule: IdentityRule::Larger,
    })
    .unwrap();

    let input = vec![b'A'; 4096];
    let compressed = codec.compress(&input).unwrap();
    assert!(!compressed.is_identity);
    // 4096 one-bit codes
    assert!(compressed.processed_size < 600);
    assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), input);
}

#[test]
fn test_unknown_mode_flag_rejected() {
    for input in [b"short".to_vec(), text_like(5000)] {
        let mut container = lzh_core::compress(&input).unwrap().container;
        container[0] = 0x7F;

        let err = lzh_core::decompress(&container).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::UnknownMode(0x7F))));
    }
}

#[test]
fn test_truncated_container_rejected() {
    let container = lzh_core::compress(&text_like(5000)).unwrap().container;
    for cut in [1, HEADER_SIZE - 1, HEADER_SIZE + 3, container.len() / 2, container.len() - 1] {
        let err = lzh_core::decompress(&container[..cut]).unwrap_err();
        assert!(err.is_format(), "cut at {cut} gave {err:?}");
    }
}

/// Flipping any payload byte of a hybrid container never decodes silently.
#[test]
fn test_payload_corruption_detected() {
    let input = text_like(5000);
    let container = lzh_core::compress(&input).unwrap().container;

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..50 {
        let mut corrupted = container.clone();
        let index = rng.gen_range(HEADER_SIZE..corrupted.len());
        corrupted[index] ^= 1 << rng.gen_range(0..8);

        match lzh_core::decompress(&corrupted) {
            Ok(output) => panic!("corruption at {index} decoded to {} bytes", output.len()),
            Err(err) => assert!(err.is_format(), "unexpected error {err:?}"),
        }
    }
}

#[test]
fn test_checksum_mismatch_detected() {
    let mut container = lzh_core::compress(&text_like(5000)).unwrap().container;
    container[9] ^= 0xFF;
    assert!(matches!(
        lzh_core::decompress(&container),
        Err(Error::Format(FormatError::ChecksumMismatch { .. }))
    ));
}

/// A small dictionary freezes early; decoding still recovers the input.
#[test]
fn test_frozen_dictionary_round_trip() {
    let codec = Codec::new(CodecConfig {
        dictionary_limit: 512,
        ..CodecConfig::default()
    })
    .unwrap();

    let mut input = text_like(30_000);
    input.extend(random_bytes(9, 2000));
    input.extend(text_like(30_000));

    assert!(lzw::encode(&input, 512).frozen);
    let compressed = codec.compress(&input).unwrap();
    assert!(!compressed.is_identity);
    assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), input);
}

/// Limits above 2^16 widen table symbols to three bytes.
#[test]
fn test_wide_dictionary_round_trip() {
    let codec = Codec::new(CodecConfig {
        dictionary_limit: lzw::MAX_DICTIONARY_LIMIT,
        ..CodecConfig::default()
    })
    .unwrap();
    let input = text_like(200_000);
    let compressed = codec.compress(&input).unwrap();
    assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), input);
}

#[test]
fn test_codec_shared_across_threads() {
    let codec = Codec::default();
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            std::thread::spawn(move || {
                let mut input = text_like(10_000);
                input.extend(random_bytes(seed, 500));
                let compressed = codec.compress(&input).unwrap();
                assert_eq!(codec.decompress(&compressed.container).unwrap(), input);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..4000)) {
        let compressed = lzh_core::compress(&data).unwrap();
        prop_assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), data);
    }

    #[test]
    fn prop_round_trip_low_entropy(data in proptest::collection::vec(0u8..4, 0..8000)) {
        let compressed = lzh_core::compress(&data).unwrap();
        prop_assert_eq!(lzh_core::decompress(&compressed.container).unwrap(), data);
    }

    #[test]
    fn prop_never_expands_past_header(data in proptest::collection::vec(any::<u8>(), 0..4000)) {
        let compressed = lzh_core::compress(&data).unwrap();
        prop_assert!(compressed.processed_size <= data.len() as u64 + HEADER_SIZE as u64);
    }

    #[test]
    fn prop_deterministic(data in proptest::collection::vec(0u8..16, 0..4000)) {
        let a = lzh_core::compress(&data).unwrap();
        let b = lzh_core::compress(&data).unwrap();
        prop_assert_eq!(a.container, b.container);
    }

    #[test]
    fn prop_codes_prefix_free(symbols in proptest::collection::vec(0u32..600, 1..2000)) {
        let table = HuffmanTree::from_frequencies(&FrequencyTable::from_codes(&symbols))
            .unwrap()
            .code_table()
            .unwrap();
        // The trie rejects any code that prefixes another.
        prop_assert!(DecodeTrie::from_table(&table).is_ok());
        for (_, code) in table.iter() {
            prop_assert!(code.len >= 1);
        }
    }

    #[test]
    fn prop_dictionary_monotonic(data in proptest::collection::vec(0u8..8, 0..3000)) {
        let encoding = lzw::encode(&data, lzw::DEFAULT_DICTIONARY_LIMIT);
        for (k, &code) in encoding.codes.iter().enumerate() {
            prop_assert!(code < lzw::SEED_CODES + k as u32);
        }
    }
}
