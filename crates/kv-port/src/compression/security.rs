//! # Compression Security
//!
//! Decompression bomb prevention for block reads.
//!
//! ## Security Invariants
//!
//! - Decompressed output never exceeds `max_size`
//! - Output that expands more than `max_ratio` times its input is rejected
//!
//! Snappy carries the decompressed length in its header, so both checks run
//! before decoding. Zstd is read through a reader bounded at `max_size` and
//! checked once the read completes.

use crate::config::BlockOptions;
use crate::errors::{PortError, PortResult};

/// Default maximum decompressed block size (100MB).
pub const MAX_DECOMPRESSED_SIZE: usize = 100 * 1024 * 1024;

/// Default maximum compression ratio (decompressed / compressed).
pub const MAX_COMPRESSION_RATIO: usize = 100;

/// Limits a codec enforces on the output of one decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressionGuard {
    /// Largest decompressed output accepted.
    pub max_size: usize,
    /// Largest `decompressed / compressed` ratio accepted.
    pub max_ratio: usize,
}

impl Default for DecompressionGuard {
    fn default() -> Self {
        Self::new(MAX_DECOMPRESSED_SIZE, MAX_COMPRESSION_RATIO)
    }
}

impl DecompressionGuard {
    pub const fn new(max_size: usize, max_ratio: usize) -> Self {
        Self {
            max_size,
            max_ratio,
        }
    }

    /// Guard configured by `options`.
    pub fn from_options(options: &BlockOptions) -> Self {
        Self::new(options.max_decompressed_size, options.max_compression_ratio)
    }

    /// Bytes a bounded reader should pull: one past `max_size`, so output
    /// exactly at the limit can be told apart from output over it.
    pub fn read_bound(&self) -> u64 {
        u64::try_from(self.max_size).map_or(u64::MAX, |max| max.saturating_add(1))
    }

    /// Reject output larger than `max_size`.
    pub fn check_size(&self, decompressed_size: usize) -> PortResult<()> {
        if decompressed_size > self.max_size {
            return Err(PortError::DecompressionLimit {
                size: decompressed_size,
                limit: self.max_size,
            });
        }
        Ok(())
    }

    /// Reject output that expands its input more than `max_ratio` times.
    pub fn check_ratio(&self, compressed_size: usize, decompressed_size: usize) -> PortResult<()> {
        if compressed_size == 0 {
            return Ok(());
        }
        let ratio = decompressed_size / compressed_size;
        if ratio > self.max_ratio {
            return Err(PortError::CompressionRatio {
                ratio,
                limit: self.max_ratio,
            });
        }
        Ok(())
    }

    /// Size check, then ratio check.
    pub fn check(&self, compressed_size: usize, decompressed_size: usize) -> PortResult<()> {
        self.check_size(decompressed_size)?;
        self.check_ratio(compressed_size, decompressed_size)
    }
}
