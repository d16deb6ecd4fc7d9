//! # kv-port
//!
//! Platform abstraction layer of an embedded key-value storage engine.
//!
//! ## Capability Matrix
//!
//! Six boolean capabilities are resolved once, when the crate is built, and
//! compiled in as constants. Each one defaults to disabled, so the engine
//! builds on any target with no platform knowledge at all.
//!
//! | Definition | Enabled by | Selects |
//! |------------|------------|---------|
//! | `HAVE_FDATASYNC` | env / target probe | data-only flush |
//! | `HAVE_FULLFSYNC` | env / target probe | full device flush |
//! | `HAVE_O_CLOEXEC` | env / target probe | atomic close-on-exec open |
//! | `HAVE_CRC32C` | `crc32c` feature | accelerated CRC32C |
//! | `HAVE_SNAPPY` | `snappy` feature | snappy block codec |
//! | `HAVE_ZSTD` | `zstd` feature | zstd block codec |
//!
//! An environment variable with the definition's name overrides both the
//! probe and the feature (`HAVE_FDATASYNC=0 cargo build`). Set
//! `KV_PORT_NO_PROBE=1` to skip target detection.
//!
//! ## Crate Structure
//!
//! - `config/` - Capability matrix, build constants, block options
//! - `durability/` - Flush strategies, close-on-exec opening, writable files
//! - `checksum/` - CRC32C providers and masking
//! - `compression/` - Block codecs, compression fallback, block trailer
//! - `errors` - `PortError`
//!
//! ## Usage
//!
//! ```ignore
//! use kv_port::{compression, durability, BlockOptions};
//!
//! let options = BlockOptions::default();
//! let block = compression::encode_block(&options, b"raw block");
//!
//! let mut file = durability::WritableFile::create("/data/000007.ldb")?;
//! file.append(&block)?;
//! file.sync()?;
//! ```

pub mod checksum;
pub mod compression;
pub mod config;
pub mod durability;
pub mod errors;

// Re-export key types for convenience
pub use checksum::ChecksumProvider;
pub use compression::{BlockCodec, CompressionType};
pub use config::{BlockOptions, Capability, CapabilityReport, Matrix, BUILD};
pub use durability::{CloexecStrategy, FileSyncer, FlushKind, WritableFile};
pub use errors::{PortError, PortResult};
