//! # Port Errors
//!
//! Error type shared by the capability-gated layers.
//!
//! Resolving the capability matrix never fails. These errors come from the
//! primitives the matrix selects: file I/O, unavailable strategies and
//! corrupt block contents.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Capability;

/// Errors raised by the platform layer.
#[derive(Debug, Error)]
pub enum PortError {
    /// A strategy was requested that this build does not provide.
    #[error("{capability} is not available in this build ({})", .capability.summary())]
    Unsupported { capability: Capability },

    /// An I/O operation failed on a path.
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A codec failed to compress a block.
    #[error("{codec} compression failed: {message}")]
    CompressFailed { codec: &'static str, message: String },

    /// Stored data failed validation or could not be decoded.
    #[error("corruption: {0}")]
    Corruption(String),

    /// Block trailer names a codec this engine does not know.
    #[error("unknown compression type: {0:#04x}")]
    UnknownCompression(u8),

    /// Decompressed block would exceed the configured limit.
    #[error("decompressed block exceeds limit: {size} > {limit}")]
    DecompressionLimit { size: usize, limit: usize },

    /// Block expands far more than real data does.
    #[error("suspicious compression ratio: {ratio}:1 > {limit}:1")]
    CompressionRatio { ratio: usize, limit: usize },
}

impl PortError {
    /// Wrap an I/O error with the operation and path it failed on.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PortError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether the error reports damaged data rather than an environment problem.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PortError::Corruption(_)
                | PortError::UnknownCompression(_)
                | PortError::DecompressionLimit { .. }
                | PortError::CompressionRatio { .. }
        )
    }
}

/// Result alias for the platform layer.
pub type PortResult<T> = Result<T, PortError>;
