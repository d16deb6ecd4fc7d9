//! # Block Options
//!
//! Runtime settings for the block compression layer.

use serde::{Deserialize, Serialize};

use crate::compression::security::{MAX_COMPRESSION_RATIO, MAX_DECOMPRESSED_SIZE};
use crate::compression::CompressionType;

/// Options applied when blocks are compressed and decompressed.
///
/// Requesting a codec this build does not provide is not an error: blocks
/// are stored uncompressed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockOptions {
    /// Codec used for new blocks (default: snappy).
    pub compression: CompressionType,

    /// Zstd compression level (default: 1).
    pub zstd_compression_level: i32,

    /// Upper bound on the size of a decompressed block (default: 100 MiB).
    pub max_decompressed_size: usize,

    /// Upper bound on `decompressed / compressed` for a block (default: 100).
    pub max_compression_ratio: usize,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Snappy,
            zstd_compression_level: 1,
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
            max_compression_ratio: MAX_COMPRESSION_RATIO,
        }
    }
}

impl BlockOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the codec used for new blocks.
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Set the zstd compression level.
    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_compression_level = level;
        self
    }

    /// Set the decompressed size limit.
    pub fn with_max_decompressed_size(mut self, size: usize) -> Self {
        self.max_decompressed_size = size;
        self
    }

    /// Set the compression ratio limit.
    pub fn with_max_compression_ratio(mut self, ratio: usize) -> Self {
        self.max_compression_ratio = ratio;
        self
    }

    /// Codec that will actually be used for new blocks in this build.
    pub fn effective_compression(&self) -> CompressionType {
        if self.compression.is_available() {
            self.compression
        } else {
            CompressionType::None
        }
    }
}
