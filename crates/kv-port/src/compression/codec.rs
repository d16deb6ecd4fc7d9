//! # Block Codecs
//!
//! Codec identifiers and the trait each compiled codec implements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{BlockOptions, Capability, BUILD};
use crate::errors::PortResult;

use super::security::DecompressionGuard;

// =============================================================================
// COMPRESSION TYPE
// =============================================================================

/// Block compression codec, as recorded in the block trailer.
///
/// The discriminants are part of the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionType {
    /// Stored as-is.
    None = 0x0,
    /// Snappy raw format.
    Snappy = 0x1,
    /// Zstd frame.
    Zstd = 0x2,
}

impl CompressionType {
    /// Every codec the format knows about.
    pub const ALL: [CompressionType; 3] = [
        CompressionType::None,
        CompressionType::Snappy,
        CompressionType::Zstd,
    ];

    /// Decode a trailer byte.
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x0 => Some(CompressionType::None),
            0x1 => Some(CompressionType::Snappy),
            0x2 => Some(CompressionType::Zstd),
            _ => None,
        }
    }

    /// Trailer byte for this codec.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Capability gating this codec, if any.
    pub const fn capability(self) -> Option<Capability> {
        match self {
            CompressionType::None => None,
            CompressionType::Snappy => Some(Capability::Snappy),
            CompressionType::Zstd => Some(Capability::Zstd),
        }
    }

    /// Whether this codec is compiled into this build.
    pub const fn is_available(self) -> bool {
        match self.capability() {
            Some(capability) => BUILD.is_enabled(capability),
            None => true,
        }
    }

    /// Lowercase codec name.
    pub const fn name(self) -> &'static str {
        match self {
            CompressionType::None => "none",
            CompressionType::Snappy => "snappy",
            CompressionType::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Codecs compiled into this build, `None` first.
pub fn available_codecs() -> Vec<CompressionType> {
    CompressionType::ALL
        .into_iter()
        .filter(|kind| kind.is_available())
        .collect()
}

// =============================================================================
// CODEC TRAIT
// =============================================================================

/// Trait for block compression implementations
pub trait BlockCodec: Send + Sync {
    /// Codec identifier written to the block trailer.
    fn kind(&self) -> CompressionType;

    /// Compress a raw block.
    fn compress(&self, raw: &[u8]) -> PortResult<Vec<u8>>;

    /// Decompress block contents, refusing output the guard rejects.
    fn decompress(&self, contents: &[u8], guard: &DecompressionGuard) -> PortResult<Vec<u8>>;
}

/// Stores blocks unchanged. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompression;

impl BlockCodec for NoCompression {
    fn kind(&self) -> CompressionType {
        CompressionType::None
    }

    fn compress(&self, raw: &[u8]) -> PortResult<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, contents: &[u8], guard: &DecompressionGuard) -> PortResult<Vec<u8>> {
        guard.check_size(contents.len())?;
        Ok(contents.to_vec())
    }
}

/// Codec implementing `kind`.
///
/// # Errors
///
/// `PortError::Unsupported` when the codec is not compiled into this build.
#[cfg_attr(not(have_zstd), allow(unused_variables))]
pub fn codec_for(kind: CompressionType, options: &BlockOptions) -> PortResult<Box<dyn BlockCodec>> {
    match kind {
        CompressionType::None => Ok(Box::new(NoCompression)),
        CompressionType::Snappy => {
            #[cfg(have_snappy)]
            {
                Ok(Box::new(super::snappy_codec::SnappyCodec))
            }
            #[cfg(not(have_snappy))]
            {
                Err(crate::errors::PortError::Unsupported {
                    capability: Capability::Snappy,
                })
            }
        }
        CompressionType::Zstd => {
            #[cfg(have_zstd)]
            {
                Ok(Box::new(super::zstd_codec::ZstdCodec::new(
                    options.zstd_compression_level,
                )))
            }
            #[cfg(not(have_zstd))]
            {
                Err(crate::errors::PortError::Unsupported {
                    capability: Capability::Zstd,
                })
            }
        }
    }
}
