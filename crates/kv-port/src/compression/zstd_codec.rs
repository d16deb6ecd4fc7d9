//! Zstd block codec.

use std::io::Read;

use crate::errors::{PortError, PortResult};

use super::codec::{BlockCodec, CompressionType};
use super::security::DecompressionGuard;

/// Zstd codec. Compiled only with `HAVE_ZSTD`.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Create a codec compressing at `level`.
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    /// Compression level.
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BlockCodec for ZstdCodec {
    fn kind(&self) -> CompressionType {
        CompressionType::Zstd
    }

    fn compress(&self, raw: &[u8]) -> PortResult<Vec<u8>> {
        zstd::encode_all(raw, self.level).map_err(|e| PortError::CompressFailed {
            codec: "zstd",
            message: e.to_string(),
        })
    }

    fn decompress(&self, contents: &[u8], guard: &DecompressionGuard) -> PortResult<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::new(contents).map_err(corrupted)?;

        let mut output = Vec::new();
        decoder
            .take(guard.read_bound())
            .read_to_end(&mut output)
            .map_err(corrupted)?;

        guard.check(contents.len(), output.len())?;
        Ok(output)
    }
}

fn corrupted(e: std::io::Error) -> PortError {
    PortError::Corruption(format!("corrupted compressed block contents (zstd): {e}"))
}
