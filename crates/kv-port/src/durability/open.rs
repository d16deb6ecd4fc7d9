//! # File Opening
//!
//! Every descriptor the engine opens is close-on-exec, so child processes
//! never inherit database files or the lock file.
//!
//! With `HAVE_O_CLOEXEC` the flag is requested atomically at `open(2)`.
//! Otherwise it is set with `fcntl(F_SETFD)` right after the open, which
//! leaves a window in which a concurrent `fork` + `exec` can leak the
//! descriptor.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

use serde::Serialize;

use crate::config::HAVE_O_CLOEXEC;
use crate::errors::{PortError, PortResult};

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Existing file, read only (sequential and random-access readers).
    Read,
    /// Create or truncate, write only (new table and log files).
    Truncate,
    /// Create if missing, append only (reused logs).
    Append,
    /// Create if missing, read and write without truncation (lock files).
    ReadWrite,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => options.read(true),
            OpenMode::Truncate => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true).create(true),
        };
        options
    }

    fn op(self) -> &'static str {
        match self {
            OpenMode::Read => "open",
            OpenMode::Truncate => "create",
            OpenMode::Append => "open for append",
            OpenMode::ReadWrite => "open for read/write",
        }
    }
}

/// How close-on-exec is applied to new descriptors in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloexecStrategy {
    /// `O_CLOEXEC` passed to `open(2)`.
    Atomic,
    /// `fcntl(F_SETFD, FD_CLOEXEC)` after the open.
    TwoStep,
    /// The platform has no descriptor inheritance flag to set.
    NotApplicable,
}

impl CloexecStrategy {
    /// Strategy compiled into this build.
    pub const CURRENT: CloexecStrategy = if HAVE_O_CLOEXEC {
        CloexecStrategy::Atomic
    } else if cfg!(unix) {
        CloexecStrategy::TwoStep
    } else {
        CloexecStrategy::NotApplicable
    };
}

/// Open `path` in `mode` with close-on-exec applied.
pub fn open_file(path: &Path, mode: OpenMode) -> PortResult<File> {
    let mut options = mode.options();
    request_cloexec(&mut options);

    let file = options
        .open(path)
        .map_err(|e| PortError::io(mode.op(), path, e))?;

    mark_cloexec(&file).map_err(|e| PortError::io("set close-on-exec", path, e))?;
    Ok(file)
}

#[cfg(have_o_cloexec)]
fn request_cloexec(options: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;

    options.custom_flags(libc::O_CLOEXEC);
}

#[cfg(not(have_o_cloexec))]
fn request_cloexec(_options: &mut OpenOptions) {}

#[cfg(all(unix, not(have_o_cloexec)))]
fn mark_cloexec(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: the descriptor is owned by `file` and open for both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if flags & libc::FD_CLOEXEC != 0 {
        return Ok(());
    }

    // SAFETY: as above.
    if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(all(unix, not(have_o_cloexec))))]
fn mark_cloexec(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Whether `file` will be closed when the process calls `exec`.
#[cfg(unix)]
pub fn is_close_on_exec(file: &File) -> io::Result<bool> {
    // SAFETY: the descriptor is owned by `file` and open for the call.
    let flags = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFD) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(flags & libc::FD_CLOEXEC != 0)
}
