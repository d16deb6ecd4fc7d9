//! Snappy block codec (raw format, no framing).

use crate::errors::{PortError, PortResult};

use super::codec::{BlockCodec, CompressionType};
use super::security::DecompressionGuard;

/// Snappy codec. Compiled only with `HAVE_SNAPPY`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnappyCodec;

impl BlockCodec for SnappyCodec {
    fn kind(&self) -> CompressionType {
        CompressionType::Snappy
    }

    fn compress(&self, raw: &[u8]) -> PortResult<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(raw)
            .map_err(|e| PortError::CompressFailed {
                codec: "snappy",
                message: e.to_string(),
            })
    }

    fn decompress(&self, contents: &[u8], guard: &DecompressionGuard) -> PortResult<Vec<u8>> {
        let length = snap::raw::decompress_len(contents).map_err(corrupted)?;
        guard.check(contents.len(), length)?;

        snap::raw::Decoder::new()
            .decompress_vec(contents)
            .map_err(corrupted)
    }
}

fn corrupted(e: snap::Error) -> PortError {
    PortError::Corruption(format!("corrupted compressed block contents (snappy): {e}"))
}
