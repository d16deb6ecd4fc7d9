//! Hardware-accelerated CRC32C through the `crc32c` crate.
//!
//! Uses SSE4.2 on x86_64 and the CRC extension on aarch64, detected at
//! runtime by the crate itself.

use super::ChecksumProvider;

/// Accelerated CRC32C. Compiled only with `HAVE_CRC32C`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceleratedCrc32c;

impl ChecksumProvider for AcceleratedCrc32c {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn extend(&self, crc: u32, data: &[u8]) -> u32 {
        crc32c::crc32c_append(crc, data)
    }
}
