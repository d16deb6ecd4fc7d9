//! # Durability Module
//!
//! File flushing and opening, selected by the OS capability flags.

mod flush;
mod open;
mod writable;


#[cfg(have_fdatasync)]
pub use flush::DataOnlyFlush;
#[cfg(have_fullfsync)]
pub use flush::FullDeviceFlush;
pub use flush::{
    preferred_syncer, sync_dir, sync_file, syncer_for, FileSyncer, FlushKind, StandardFlush,
};
#[cfg(unix)]
pub use open::is_close_on_exec;
pub use open::{open_file, CloexecStrategy, OpenMode};
pub use writable::{WritableFile, WRITABLE_BUFFER_SIZE};
