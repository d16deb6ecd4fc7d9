//! # Compression Module
//!
//! Block codecs gated by `HAVE_SNAPPY` and `HAVE_ZSTD`.
//!
//! Uncompressed storage is always available. A codec that is not compiled
//! in is never offered for new blocks, and blocks written with it are
//! reported as unsupported on read.

mod block;
mod codec;
pub mod security;
#[cfg(have_snappy)]
mod snappy_codec;
#[cfg(have_zstd)]
mod zstd_codec;

#[cfg(test)]
mod tests;

pub use block::{
    block_trailer, compress_block, decode_block, decompress_block, encode_block,
    BLOCK_TRAILER_SIZE,
};
pub use codec::{available_codecs, codec_for, BlockCodec, CompressionType, NoCompression};
pub use security::DecompressionGuard;
#[cfg(have_snappy)]
pub use snappy_codec::SnappyCodec;
#[cfg(have_zstd)]
pub use zstd_codec::ZstdCodec;
