//! # Checksum Module
//!
//! CRC32C (Castagnoli) for log records and table blocks.
//!
//! `HAVE_CRC32C` selects the accelerated implementation; the portable table
//! implementation is used otherwise, and also when the accelerated one fails
//! its self-test on the running machine.
//!
//! Checksums stored next to data are masked (see [`mask`]): computing the
//! CRC of a string that contains embedded CRCs is otherwise prone to
//! degenerate results.

#[cfg(have_crc32c)]
mod accelerated;
mod portable;


use std::sync::OnceLock;

#[cfg(have_crc32c)]
pub use accelerated::AcceleratedCrc32c;
pub use portable::PortableCrc32c;

use crate::config::HAVE_CRC32C;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Input and expected value of the accelerated implementation's self-test.
const SELF_TEST_INPUT: &[u8] = b"TestCRCBuffer";
const SELF_TEST_EXPECTED: u32 = 0xdcbc_59fa;

/// Computes CRC32C checksums.
pub trait ChecksumProvider: Send + Sync {
    /// Short name of the implementation.
    fn name(&self) -> &'static str;

    /// Extend `crc`, the CRC32C of some string A, with `data`, returning the
    /// CRC32C of A followed by `data`.
    fn extend(&self, crc: u32, data: &[u8]) -> u32;

    /// CRC32C of `data`.
    fn compute_crc32c(&self, data: &[u8]) -> u32 {
        self.extend(0, data)
    }

    /// Verify CRC32C checksum matches.
    fn verify_crc32c(&self, data: &[u8], expected: u32) -> bool {
        self.compute_crc32c(data) == expected
    }
}

/// Whether the accelerated implementation is compiled in and computes
/// correct results on this machine.
pub fn can_accelerate() -> bool {
    static ACCELERATED: OnceLock<bool> = OnceLock::new();

    *ACCELERATED.get_or_init(|| {
        if !HAVE_CRC32C {
            return false;
        }
        let ok = accelerated_provider()
            .is_some_and(|provider| provider.compute_crc32c(SELF_TEST_INPUT) == SELF_TEST_EXPECTED);
        if !ok {
            tracing::warn!("[kv-port] accelerated CRC32C failed its self-test, using portable");
        }
        ok
    })
}

fn accelerated_provider() -> Option<&'static dyn ChecksumProvider> {
    #[cfg(have_crc32c)]
    {
        Some(&AcceleratedCrc32c)
    }
    #[cfg(not(have_crc32c))]
    {
        None
    }
}

/// Provider used by [`value`] and [`extend`].
pub fn active() -> &'static dyn ChecksumProvider {
    if can_accelerate() {
        if let Some(provider) = accelerated_provider() {
            return provider;
        }
    }
    &PortableCrc32c
}

/// CRC32C of `data`.
pub fn value(data: &[u8]) -> u32 {
    active().compute_crc32c(data)
}

/// CRC32C of the string whose CRC is `crc`, followed by `data`.
pub fn extend(crc: u32, data: &[u8]) -> u32 {
    active().extend(crc, data)
}

/// Masked representation of `crc`, for storage next to the data it covers.
pub const fn mask(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// CRC whose masked representation is `masked`.
pub const fn unmask(masked: u32) -> u32 {
    masked.wrapping_sub(MASK_DELTA).rotate_left(15)
}
