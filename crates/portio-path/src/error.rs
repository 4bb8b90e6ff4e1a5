//! Error types for the path engine.

use thiserror::Error;

use crate::validity::FileSystemType;

/// Result type for path operations that can fail.
pub type Result<T> = std::result::Result<T, PathError>;

/// Errors reported by the fallible path helpers.
///
/// The core path operations are total and never produce these. They are
/// returned by the validating and buffer-filling entry points only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The destination buffer cannot hold the result.
    #[error("buffer too small: {required} bytes required, {capacity} available")]
    CapacityExceeded {
        /// Bytes needed for the full result.
        required: usize,
        /// Bytes the caller provided.
        capacity: usize,
    },

    /// The path is empty or longer than the file system allows.
    #[error("path length {length} is outside 1..={max} for {fs}")]
    InvalidLength {
        /// Length of the rejected path in characters.
        length: usize,
        /// Maximum permitted length.
        max: usize,
        /// File system the path was checked against.
        fs: FileSystemType,
    },

    /// The UNC or drive prefix is malformed.
    #[error("malformed root in path: {path}")]
    MalformedRoot {
        /// The rejected path.
        path: String,
    },

    /// A component is empty, too long, reserved, or contains an illegal character.
    #[error("invalid component {component:?} in path for {fs}")]
    InvalidComponent {
        /// The first component that failed validation.
        component: String,
        /// File system the path was checked against.
        fs: FileSystemType,
    },

    /// A file system type name was not recognized.
    #[error("unknown file system type {0:?}")]
    UnknownFileSystem(String),
}
