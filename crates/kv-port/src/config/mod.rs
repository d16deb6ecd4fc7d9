//! # Configuration
//!
//! Build-time capability matrix and the runtime options of the block layer.
//!
//! The matrix is resolved once by `build.rs` and compiled into the artifact
//! as [`BUILD`]. Consumers check values only: every flag is always defined.
//!
//! ```ignore
//! use kv_port::config::{Capability, BUILD, HAVE_ZSTD};
//!
//! if HAVE_ZSTD {
//!     // offer zstd as a block codec
//! }
//! assert_eq!(BUILD.is_enabled(Capability::Zstd), HAVE_ZSTD);
//! ```

mod matrix;
mod options;
mod report;


pub use matrix::{
    definition_enabled, parse_definition, resolve, Capability, Definitions, Matrix, Origin,
    Resolved,
};
pub use options::BlockOptions;
pub use report::{CapabilityEntry, CapabilityReport};

include!(concat!(env!("OUT_DIR"), "/capabilities.rs"));

/// `fdatasync(2)` is available.
pub const HAVE_FDATASYNC: bool = BUILD.is_enabled(Capability::Fdatasync);

/// `fcntl(F_FULLFSYNC)` is available.
pub const HAVE_FULLFSYNC: bool = BUILD.is_enabled(Capability::Fullfsync);

/// `open(2)` accepts `O_CLOEXEC`.
pub const HAVE_O_CLOEXEC: bool = BUILD.is_enabled(Capability::OCloexec);

/// The hardware-accelerated CRC32C library is linked in.
pub const HAVE_CRC32C: bool = BUILD.is_enabled(Capability::Crc32c);

/// The snappy codec is linked in.
pub const HAVE_SNAPPY: bool = BUILD.is_enabled(Capability::Snappy);

/// The zstd codec is linked in.
pub const HAVE_ZSTD: bool = BUILD.is_enabled(Capability::Zstd);

/// Log the resolved matrix at `debug` level.
pub fn log_capabilities() {
    for (capability, resolved) in BUILD.iter() {
        tracing::debug!(
            capability = capability.define_name(),
            value = resolved.value,
            origin = resolved.origin.as_str(),
            "[kv-port] {}",
            capability.summary()
        );
    }
}
