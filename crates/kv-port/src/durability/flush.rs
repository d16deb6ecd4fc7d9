//! # Flush Strategies
//!
//! Selects how file contents are made durable.
//!
//! | Strategy | Gate | Primitive |
//! |----------|------|-----------|
//! | `FullDevice` | `HAVE_FULLFSYNC` | `fcntl(fd, F_FULLFSYNC)` |
//! | `DataOnly` | `HAVE_FDATASYNC` | `fdatasync(fd)` |
//! | `Standard` | always | `fsync` via [`File::sync_all`] |
//!
//! The preferred strategy is the strongest one compiled in. A full-device
//! flush that the filesystem refuses falls back to the next strategy.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

#[cfg(any(have_fdatasync, have_fullfsync))]
use std::os::unix::io::AsRawFd;

use serde::Serialize;

use crate::config::{Capability, BUILD, HAVE_FDATASYNC, HAVE_FULLFSYNC};
use crate::errors::{PortError, PortResult};

#[cfg(unix)]
use super::open::{open_file, OpenMode};

// =============================================================================
// FLUSH KIND
// =============================================================================

/// How a file is flushed to stable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushKind {
    /// Data reaches the physical medium (`F_FULLFSYNC`).
    FullDevice,
    /// Data is committed without forcing a metadata update (`fdatasync`).
    DataOnly,
    /// Ordinary `fsync`.
    Standard,
}

impl FlushKind {
    /// Strongest strategy compiled into this build.
    pub const PREFERRED: FlushKind = if HAVE_FULLFSYNC {
        FlushKind::FullDevice
    } else if HAVE_FDATASYNC {
        FlushKind::DataOnly
    } else {
        FlushKind::Standard
    };

    /// Capability gating this strategy, if any.
    pub const fn capability(self) -> Option<Capability> {
        match self {
            FlushKind::FullDevice => Some(Capability::Fullfsync),
            FlushKind::DataOnly => Some(Capability::Fdatasync),
            FlushKind::Standard => None,
        }
    }

    /// Whether this strategy is compiled into this build.
    pub const fn is_available(self) -> bool {
        match self.capability() {
            Some(capability) => BUILD.is_enabled(capability),
            None => true,
        }
    }
}

impl fmt::Display for FlushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushKind::FullDevice => write!(f, "full device flush (F_FULLFSYNC)"),
            FlushKind::DataOnly => write!(f, "data-only flush (fdatasync)"),
            FlushKind::Standard => write!(f, "standard flush (fsync)"),
        }
    }
}

// =============================================================================
// SYNCER TRAIT
// =============================================================================

/// Makes a file's contents durable.
pub trait FileSyncer: Send + Sync {
    /// Strategy implemented by this syncer.
    fn kind(&self) -> FlushKind;

    /// Flush `file` to stable storage.
    fn sync(&self, file: &File) -> io::Result<()>;
}

/// `fsync` through the standard library. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFlush;

impl FileSyncer for StandardFlush {
    fn kind(&self) -> FlushKind {
        FlushKind::Standard
    }

    fn sync(&self, file: &File) -> io::Result<()> {
        file.sync_all()
    }
}

/// `fdatasync(2)`.
#[cfg(have_fdatasync)]
#[derive(Debug, Default, Clone, Copy)]
pub struct DataOnlyFlush;

#[cfg(have_fdatasync)]
impl FileSyncer for DataOnlyFlush {
    fn kind(&self) -> FlushKind {
        FlushKind::DataOnly
    }

    fn sync(&self, file: &File) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `file` and open for the whole call.
        if unsafe { libc::fdatasync(file.as_raw_fd()) } == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// `fcntl(F_FULLFSYNC)`, falling back when the filesystem rejects it.
#[cfg(have_fullfsync)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FullDeviceFlush;

#[cfg(have_fullfsync)]
impl FileSyncer for FullDeviceFlush {
    fn kind(&self) -> FlushKind {
        FlushKind::FullDevice
    }

    fn sync(&self, file: &File) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `file` and open for the whole call.
        if unsafe { libc::fcntl(file.as_raw_fd(), libc::F_FULLFSYNC) } == 0 {
            return Ok(());
        }

        // Some filesystems (network mounts, FAT) do not support F_FULLFSYNC.
        let error = io::Error::last_os_error();
        let fallback = full_device_fallback();
        tracing::debug!(
            %error,
            fallback = %fallback.kind(),
            "[kv-port] F_FULLFSYNC rejected, falling back"
        );
        fallback.sync(file)
    }
}

#[cfg(have_fullfsync)]
fn full_device_fallback() -> &'static dyn FileSyncer {
    #[cfg(have_fdatasync)]
    {
        &DataOnlyFlush
    }
    #[cfg(not(have_fdatasync))]
    {
        &StandardFlush
    }
}

// =============================================================================
// SELECTION
// =============================================================================

/// Syncer for a specific strategy.
///
/// # Errors
///
/// `PortError::Unsupported` when the strategy is not compiled into this build.
pub fn syncer_for(kind: FlushKind) -> PortResult<&'static dyn FileSyncer> {
    match kind {
        FlushKind::Standard => Ok(&StandardFlush),
        FlushKind::DataOnly => {
            #[cfg(have_fdatasync)]
            {
                Ok(&DataOnlyFlush)
            }
            #[cfg(not(have_fdatasync))]
            {
                Err(PortError::Unsupported {
                    capability: Capability::Fdatasync,
                })
            }
        }
        FlushKind::FullDevice => {
            #[cfg(have_fullfsync)]
            {
                Ok(&FullDeviceFlush)
            }
            #[cfg(not(have_fullfsync))]
            {
                Err(PortError::Unsupported {
                    capability: Capability::Fullfsync,
                })
            }
        }
    }
}

/// Syncer for [`FlushKind::PREFERRED`].
pub fn preferred_syncer() -> &'static dyn FileSyncer {
    syncer_for(FlushKind::PREFERRED).unwrap_or(&StandardFlush)
}

/// Flush an open file with the preferred strategy.
pub fn sync_file(file: &File, path: &Path) -> PortResult<()> {
    preferred_syncer()
        .sync(file)
        .map_err(|e| PortError::io("sync", path, e))
}

/// Flush a directory so that entries created in it survive a crash.
///
/// No-op on platforms without directory descriptors.
pub fn sync_dir(dir: &Path) -> PortResult<()> {
    #[cfg(unix)]
    {
        let handle = open_file(dir, OpenMode::Read)?;
        preferred_syncer()
            .sync(&handle)
            .map_err(|e| PortError::io("sync directory", dir, e))
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
        Ok(())
    }
}
