//! # Compression Tests

use super::*;
use crate::config::{BlockOptions, HAVE_SNAPPY, HAVE_ZSTD};
use crate::errors::PortError;

/// Sorted key/value run, the shape of a data block.
fn compressible() -> Vec<u8> {
    (0..82u32)
        .flat_map(|i| format!("key-{i:06}:value-{:0>32}|", i % 5).into_bytes())
        .collect()
}

/// xorshift bytes: no codec gets 12.5% out of these.
fn incompressible(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

// =============================================================================
// COMPRESSION TYPE
// =============================================================================

#[test]
fn test_trailer_byte_mapping() {
    for kind in CompressionType::ALL {
        assert_eq!(CompressionType::from_u8(kind.as_u8()), Some(kind));
    }
    assert_eq!(CompressionType::None.as_u8(), 0x0);
    assert_eq!(CompressionType::Snappy.as_u8(), 0x1);
    assert_eq!(CompressionType::Zstd.as_u8(), 0x2);
    assert_eq!(CompressionType::from_u8(0x3), None);
}

#[test]
fn test_available_codecs_follow_flags() {
    let codecs = available_codecs();

    assert_eq!(codecs[0], CompressionType::None);
    assert_eq!(codecs.contains(&CompressionType::Snappy), HAVE_SNAPPY);
    assert_eq!(codecs.contains(&CompressionType::Zstd), HAVE_ZSTD);
}

#[test]
fn test_codec_for_matches_availability() {
    let options = BlockOptions::default();

    for kind in CompressionType::ALL {
        match codec_for(kind, &options) {
            Ok(codec) => {
                assert!(kind.is_available());
                assert_eq!(codec.kind(), kind);
            }
            Err(PortError::Unsupported { capability }) => {
                assert!(!kind.is_available());
                assert_eq!(Some(capability), kind.capability());
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

// =============================================================================
// COMPRESS / DECOMPRESS
// =============================================================================

#[test]
fn test_none_stores_raw() {
    let options = BlockOptions::new().with_compression(CompressionType::None);
    let raw = compressible();

    let (kind, contents) = compress_block(&options, &raw);
    assert_eq!(kind, CompressionType::None);
    assert_eq!(contents, raw);
}

#[test]
fn test_compressible_block_uses_codec_when_available() {
    let raw = compressible();

    for requested in [CompressionType::Snappy, CompressionType::Zstd] {
        let options = BlockOptions::new().with_compression(requested);
        let (kind, contents) = compress_block(&options, &raw);

        if requested.is_available() {
            assert_eq!(kind, requested);
            assert!(contents.len() < raw.len());
        } else {
            assert_eq!(kind, CompressionType::None);
            assert_eq!(contents, raw);
        }
        assert_eq!(kind, options.effective_compression());

        let restored = decompress_block(kind.as_u8(), &contents, &options).expect("decompress");
        assert_eq!(restored, raw);
    }
}

#[test]
fn test_incompressible_block_stored_raw() {
    let raw = incompressible(4096);

    for requested in CompressionType::ALL {
        let options = BlockOptions::new().with_compression(requested);
        let (kind, contents) = compress_block(&options, &raw);

        assert_eq!(kind, CompressionType::None);
        assert_eq!(contents, raw);
    }
}

#[test]
fn test_empty_block() {
    let options = BlockOptions::default();
    let (kind, contents) = compress_block(&options, b"");

    assert_eq!(kind, CompressionType::None);
    assert!(contents.is_empty());
    assert!(decompress_block(kind.as_u8(), &contents, &options)
        .expect("decompress")
        .is_empty());
}

#[test]
fn test_unknown_type_rejected() {
    let err = decompress_block(0x7f, b"contents", &BlockOptions::default()).expect_err("unknown");

    assert!(matches!(err, PortError::UnknownCompression(0x7f)));
    assert!(err.is_corruption());
}

#[cfg(not(have_snappy))]
#[test]
fn test_snappy_block_unsupported_without_flag() {
    let err = decompress_block(CompressionType::Snappy.as_u8(), b"x", &BlockOptions::default())
        .expect_err("unsupported");

    assert!(matches!(
        err,
        PortError::Unsupported {
            capability: crate::config::Capability::Snappy
        }
    ));
}

#[cfg(not(have_zstd))]
#[test]
fn test_zstd_block_unsupported_without_flag() {
    let err = decompress_block(CompressionType::Zstd.as_u8(), b"x", &BlockOptions::default())
        .expect_err("unsupported");

    assert!(matches!(
        err,
        PortError::Unsupported {
            capability: crate::config::Capability::Zstd
        }
    ));
}

#[test]
fn test_raw_block_over_limit_rejected() {
    let options = BlockOptions::new().with_max_decompressed_size(16);
    let err = decompress_block(CompressionType::None.as_u8(), &[0u8; 32], &options)
        .expect_err("limit");

    assert!(matches!(
        err,
        PortError::DecompressionLimit { size: 32, limit: 16 }
    ));
}

#[test]
fn test_raw_block_ratio_is_one() {
    let options = BlockOptions::new().with_max_compression_ratio(1);
    let raw = compressible();

    let restored = decompress_block(CompressionType::None.as_u8(), &raw, &options)
        .expect("raw block");
    assert_eq!(restored, raw);
}

#[cfg(have_snappy)]
mod snappy_raw {
    use super::*;

    #[test]
    fn test_corrupt_contents() {
        let err = SnappyCodec
            .decompress(&[0xff; 10], &DecompressionGuard::default())
            .expect_err("corrupt");
        assert!(matches!(err, PortError::Corruption(_)));
        assert!(err
            .to_string()
            .starts_with("corruption: corrupted compressed block contents"));
    }

    #[test]
    fn test_limit_checked_before_decoding() {
        let compressed = SnappyCodec.compress(&[0u8; 10_000]).expect("compress");
        let err = SnappyCodec
            .decompress(&compressed, &DecompressionGuard::new(100, usize::MAX))
            .expect_err("limit");

        assert!(matches!(
            err,
            PortError::DecompressionLimit {
                size: 10_000,
                limit: 100
            }
        ));
    }

    #[test]
    fn test_bomb_header_rejected_before_decoding() {
        // Varint length 1_000_000 followed by a single literal byte.
        let mut contents = vec![0xc0, 0x84, 0x3d];
        contents.extend_from_slice(&[0x00, b'x']);

        let err = SnappyCodec
            .decompress(&contents, &DecompressionGuard::default())
            .expect_err("bomb");
        assert!(matches!(
            err,
            PortError::CompressionRatio {
                ratio: 200_000,
                limit: 100
            }
        ));
    }

    #[test]
    fn test_normal_block_within_ratio() {
        let raw = compressible();
        let compressed = SnappyCodec.compress(&raw).expect("compress");

        let restored = SnappyCodec
            .decompress(&compressed, &DecompressionGuard::default())
            .expect("decompress");
        assert_eq!(restored, raw);
    }
}

#[cfg(have_zstd)]
mod zstd_frames {
    use super::*;

    #[test]
    fn test_level_from_options() {
        let options = BlockOptions::new()
            .with_compression(CompressionType::Zstd)
            .with_zstd_level(9);
        let raw = compressible();

        let (kind, contents) = compress_block(&options, &raw);
        assert_eq!(kind, CompressionType::Zstd);
        assert_eq!(ZstdCodec::new(9).compress(&raw).expect("compress"), contents);
    }

    #[test]
    fn test_corrupt_contents() {
        let err = ZstdCodec::default()
            .decompress(b"definitely not a zstd frame", &DecompressionGuard::default())
            .expect_err("corrupt");
        assert!(matches!(err, PortError::Corruption(_)));
        assert!(err
            .to_string()
            .starts_with("corruption: corrupted compressed block contents"));
    }

    #[test]
    fn test_limit_enforced_while_decoding() {
        let compressed = ZstdCodec::default().compress(&[0u8; 10_000]).expect("compress");

        let err = ZstdCodec::default()
            .decompress(&compressed, &DecompressionGuard::new(100, usize::MAX))
            .expect_err("limit");
        assert!(matches!(err, PortError::DecompressionLimit { limit: 100, .. }));

        let exact = ZstdCodec::default()
            .decompress(&compressed, &DecompressionGuard::new(10_000, usize::MAX))
            .expect("exact limit");
        assert_eq!(exact.len(), 10_000);
    }

    #[test]
    fn test_unbounded_size_limit_round_trip() {
        let options = BlockOptions::new()
            .with_compression(CompressionType::Zstd)
            .with_max_decompressed_size(usize::MAX);
        let raw = compressible();

        let (kind, contents) = compress_block(&options, &raw);
        assert_eq!(kind, CompressionType::Zstd);

        let restored = decompress_block(kind.as_u8(), &contents, &options).expect("decompress");
        assert_eq!(restored, raw);
    }

    #[test]
    fn test_bomb_rejected() {
        let compressed = ZstdCodec::default()
            .compress(&vec![0u8; 1024 * 1024])
            .expect("compress");

        let err = ZstdCodec::default()
            .decompress(&compressed, &DecompressionGuard::default())
            .expect_err("bomb");
        assert!(matches!(err, PortError::CompressionRatio { limit: 100, .. }));
        assert!(err.is_corruption());

        let options = BlockOptions::new().with_max_compression_ratio(usize::MAX);
        let restored = decompress_block(CompressionType::Zstd.as_u8(), &compressed, &options)
            .expect("ratio check disabled");
        assert_eq!(restored.len(), 1024 * 1024);
    }

    #[test]
    fn test_normal_block_within_ratio() {
        let raw = compressible();
        let compressed = ZstdCodec::default().compress(&raw).expect("compress");

        let restored = ZstdCodec::default()
            .decompress(&compressed, &DecompressionGuard::default())
            .expect("decompress");
        assert_eq!(restored, raw);
    }
}

// =============================================================================
// BLOCK ENCODING
// =============================================================================

#[test]
fn test_encode_decode_block() {
    let options = BlockOptions::default();
    let raw = compressible();

    let block = encode_block(&options, &raw);
    let type_byte = block[block.len() - BLOCK_TRAILER_SIZE];
    assert_eq!(type_byte, options.effective_compression().as_u8());

    assert_eq!(decode_block(&block, &options, true).expect("decode"), raw);
}

#[test]
fn test_decode_detects_checksum_mismatch() {
    let options = BlockOptions::new().with_compression(CompressionType::None);
    let mut block = encode_block(&options, b"some block contents");
    block[3] ^= 0x01;

    let err = decode_block(&block, &options, true).expect_err("mismatch");
    assert!(matches!(err, PortError::Corruption(_)));
    assert!(err.to_string().starts_with("corruption: block checksum mismatch"));

    // Unverified reads hand back whatever is stored.
    let unverified = decode_block(&block, &options, false).expect("decode");
    assert_eq!(unverified.len(), b"some block contents".len());
}

#[test]
fn test_decode_truncated_block() {
    let err = decode_block(&[0u8; 3], &BlockOptions::default(), true).expect_err("truncated");
    assert!(err.is_corruption());
    assert_eq!(err.to_string(), "corruption: truncated block read");
}

#[test]
fn test_trailer_checksum_covers_type_byte() {
    let contents = b"contents";
    let none = block_trailer(CompressionType::None, contents);
    let snappy = block_trailer(CompressionType::Snappy, contents);

    assert_ne!(none[1..], snappy[1..]);
}

// =============================================================================
// OPTIONS
// =============================================================================

#[test]
fn test_options_deserialize_with_defaults() {
    let options: BlockOptions =
        serde_json::from_str(r#"{ "compression": "zstd" }"#).expect("deserialize");

    assert_eq!(options.compression, CompressionType::Zstd);
    assert_eq!(options.zstd_compression_level, 1);
    assert_eq!(options.max_decompressed_size, security::MAX_DECOMPRESSED_SIZE);
    assert_eq!(options.max_compression_ratio, security::MAX_COMPRESSION_RATIO);
}

#[test]
fn test_effective_compression_falls_back() {
    let options = BlockOptions::new().with_compression(CompressionType::Snappy);
    let expected = if HAVE_SNAPPY {
        CompressionType::Snappy
    } else {
        CompressionType::None
    };
    assert_eq!(options.effective_compression(), expected);
}
