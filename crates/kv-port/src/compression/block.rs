//! # Block Encoding
//!
//! Compression with fallback, and the 5-byte block trailer.
//!
//! ```text
//! +-------------------+-----------+--------------------+
//! | contents (n)      | type (1)  | masked crc32c (4)  |
//! +-------------------+-----------+--------------------+
//! ```
//!
//! The CRC covers the contents followed by the type byte and is stored
//! masked, little-endian.

use crate::checksum;
use crate::config::BlockOptions;
use crate::errors::{PortError, PortResult};

use super::codec::{codec_for, CompressionType};
use super::security::DecompressionGuard;

/// Size of the trailer appended to every block.
pub const BLOCK_TRAILER_SIZE: usize = 5;

/// Compress a raw block with the configured codec.
///
/// Falls back to storing the block uncompressed when the codec is not
/// compiled in, fails, or saves less than 12.5% of the raw size.
pub fn compress_block(options: &BlockOptions, raw: &[u8]) -> (CompressionType, Vec<u8>) {
    let kind = options.compression;
    if kind == CompressionType::None {
        return (CompressionType::None, raw.to_vec());
    }

    let codec = match codec_for(kind, options) {
        Ok(codec) => codec,
        Err(error) => {
            tracing::trace!(%error, "[kv-port] storing block uncompressed");
            return (CompressionType::None, raw.to_vec());
        }
    };

    match codec.compress(raw) {
        Ok(compressed) if compressed.len() < raw.len() - raw.len() / 8 => (kind, compressed),
        Ok(_) => (CompressionType::None, raw.to_vec()),
        Err(error) => {
            tracing::warn!(%error, codec = %kind, "[kv-port] compression failed, storing raw");
            (CompressionType::None, raw.to_vec())
        }
    }
}

/// Decompress block contents tagged with trailer byte `type_byte`.
///
/// # Errors
///
/// - `UnknownCompression` for a trailer byte no codec uses
/// - `Unsupported` when the codec is not compiled into this build
/// - `Corruption` when the codec rejects the contents
/// - `DecompressionLimit` when the output would exceed the configured limit
pub fn decompress_block(
    type_byte: u8,
    contents: &[u8],
    options: &BlockOptions,
) -> PortResult<Vec<u8>> {
    let kind = CompressionType::from_u8(type_byte).ok_or(PortError::UnknownCompression(type_byte))?;
    codec_for(kind, options)?.decompress(contents, &DecompressionGuard::from_options(options))
}

/// Trailer for `contents` compressed with `kind`.
pub fn block_trailer(kind: CompressionType, contents: &[u8]) -> [u8; BLOCK_TRAILER_SIZE] {
    let type_byte = kind.as_u8();
    let crc = checksum::extend(checksum::value(contents), &[type_byte]);

    let mut trailer = [0u8; BLOCK_TRAILER_SIZE];
    trailer[0] = type_byte;
    trailer[1..].copy_from_slice(&checksum::mask(crc).to_le_bytes());
    trailer
}

/// Compress `raw` and append its trailer.
pub fn encode_block(options: &BlockOptions, raw: &[u8]) -> Vec<u8> {
    let (kind, mut contents) = compress_block(options, raw);
    let trailer = block_trailer(kind, &contents);
    contents.extend_from_slice(&trailer);
    contents
}

/// Verify (optionally) and decompress a block produced by [`encode_block`].
pub fn decode_block(
    block: &[u8],
    options: &BlockOptions,
    verify_checksums: bool,
) -> PortResult<Vec<u8>> {
    if block.len() < BLOCK_TRAILER_SIZE {
        return Err(PortError::Corruption("truncated block read".to_string()));
    }

    let (contents, trailer) = block.split_at(block.len() - BLOCK_TRAILER_SIZE);
    let type_byte = trailer[0];

    if verify_checksums {
        let stored = u32::from_le_bytes([trailer[1], trailer[2], trailer[3], trailer[4]]);
        let expected = checksum::unmask(stored);
        let actual = checksum::extend(checksum::value(contents), &[type_byte]);
        if actual != expected {
            return Err(PortError::Corruption(format!(
                "block checksum mismatch: expected {expected:#010x}, got {actual:#010x}"
            )));
        }
    }

    decompress_block(type_byte, contents, options)
}
