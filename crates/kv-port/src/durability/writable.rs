//! # Writable File
//!
//! Buffered append-only file used for logs, tables and manifests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{PortError, PortResult};

use super::flush::{preferred_syncer, sync_dir, FileSyncer};
use super::open::{open_file, OpenMode};

/// Size of the in-memory write buffer.
pub const WRITABLE_BUFFER_SIZE: usize = 64 * 1024;

const MANIFEST_PREFIX: &str = "MANIFEST";

/// Append-only file with a 64 KiB write buffer.
///
/// `sync` on a manifest also syncs its directory, so a newly created
/// manifest is reachable after a crash.
pub struct WritableFile {
    file: File,
    buf: Vec<u8>,
    path: PathBuf,
    dir: PathBuf,
    is_manifest: bool,
    syncer: &'static dyn FileSyncer,
}

impl WritableFile {
    /// Create `path`, truncating any existing contents.
    pub fn create(path: impl AsRef<Path>) -> PortResult<Self> {
        let path = path.as_ref();
        let file = open_file(path, OpenMode::Truncate)?;
        Ok(Self::from_parts(file, path))
    }

    /// Open `path` for appending, creating it if missing.
    pub fn append_to(path: impl AsRef<Path>) -> PortResult<Self> {
        let path = path.as_ref();
        let file = open_file(path, OpenMode::Append)?;
        Ok(Self::from_parts(file, path))
    }

    fn from_parts(file: File, path: &Path) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let is_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(MANIFEST_PREFIX));

        Self {
            file,
            buf: Vec::with_capacity(WRITABLE_BUFFER_SIZE),
            path: path.to_path_buf(),
            dir,
            is_manifest,
            syncer: preferred_syncer(),
        }
    }

    /// Use a specific flush strategy instead of the preferred one.
    pub fn with_syncer(mut self, syncer: &'static dyn FileSyncer) -> Self {
        self.syncer = syncer;
        self
    }

    /// Path this file was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `sync` also syncs the containing directory.
    pub fn is_manifest(&self) -> bool {
        self.is_manifest
    }

    /// Flush strategy used by `sync`.
    pub fn syncer(&self) -> &'static dyn FileSyncer {
        self.syncer
    }

    /// Bytes buffered but not yet written to the file.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append `data`, buffering small writes.
    pub fn append(&mut self, data: &[u8]) -> PortResult<()> {
        let room = WRITABLE_BUFFER_SIZE - self.buf.len();
        let copied = data.len().min(room);
        self.buf.extend_from_slice(&data[..copied]);

        let rest = &data[copied..];
        if rest.is_empty() {
            return Ok(());
        }

        self.flush_buffer()?;
        if rest.len() < WRITABLE_BUFFER_SIZE {
            self.buf.extend_from_slice(rest);
            return Ok(());
        }
        self.write_unbuffered(rest)
    }

    /// Write buffered bytes to the file without syncing.
    pub fn flush(&mut self) -> PortResult<()> {
        self.flush_buffer()
    }

    /// Make everything appended so far durable.
    pub fn sync(&mut self) -> PortResult<()> {
        if self.is_manifest {
            sync_dir(&self.dir)?;
        }
        self.flush_buffer()?;
        self.syncer
            .sync(&self.file)
            .map_err(|e| PortError::io("sync", &self.path, e))
    }

    /// Flush buffered bytes and close the file.
    pub fn close(mut self) -> PortResult<()> {
        self.flush_buffer()
    }

    fn flush_buffer(&mut self) -> PortResult<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.buf);
        let result = self.write_unbuffered(&pending);
        self.buf = pending;
        self.buf.clear();
        result
    }

    fn write_unbuffered(&mut self, data: &[u8]) -> PortResult<()> {
        self.file
            .write_all(data)
            .map_err(|e| PortError::io("write", &self.path, e))
    }
}

impl Drop for WritableFile {
    fn drop(&mut self) {
        if let Err(error) = self.flush_buffer() {
            tracing::warn!(%error, "[kv-port] dropping writable file with unflushed data");
        }
    }
}

impl std::fmt::Debug for WritableFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritableFile")
            .field("path", &self.path)
            .field("buffered", &self.buf.len())
            .field("is_manifest", &self.is_manifest)
            .field("flush", &self.syncer.kind())
            .finish()
    }
}
