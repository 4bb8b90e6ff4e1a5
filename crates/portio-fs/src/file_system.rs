//! FileSystem trait for the operations the path and stream layers rely on.

use std::io;

use portio_stream::{AccessFlags, SharedStream};

/// How [`FileSystem::open`] treats the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Read an existing file.
    #[default]
    Read,
    /// Create the file or truncate it, then write.
    Write,
    /// Create the file if missing and keep its contents.
    ReadWrite,
}

impl OpenMode {
    /// Access granted to streams opened in this mode.
    pub fn access_flags(self) -> AccessFlags {
        match self {
            OpenMode::Read => AccessFlags::READ,
            OpenMode::Write => AccessFlags::WRITE,
            OpenMode::ReadWrite => AccessFlags::READ_WRITE,
        }
    }
}

/// Synchronous file system operations.
///
/// Paths are text in the form the path engine handles. Implementations decide
/// which separators and prefixes they accept.
///
/// ## Error Handling
///
/// Uses `std::io::Result<T>`; implementations without an OS behind them
/// construct `io::Error` with the closest `ErrorKind`. Every operation is safe
/// for the caller to retry.
pub trait FileSystem {
    /// Check if a path exists.
    fn exists(&self, path: &str) -> bool;

    /// Check if a path exists and is a directory.
    fn is_directory(&self, path: &str) -> bool;

    /// Create a single directory. The parent must already exist.
    ///
    /// Returns `io::ErrorKind::AlreadyExists` if anything exists at `path`.
    fn create_directory(&self, path: &str) -> io::Result<()>;

    /// Remove a file. Directories are not removed.
    fn remove_file(&self, path: &str) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_directory(&self, path: &str) -> io::Result<()>;

    /// Create an empty file, failing with `io::ErrorKind::AlreadyExists` if
    /// the path is taken.
    fn create_file(&self, path: &str) -> io::Result<()>;

    /// Open a file as a stream.
    fn open(&self, path: &str, mode: OpenMode) -> io::Result<SharedStream>;
}
