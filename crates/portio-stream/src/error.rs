//! Error types for stream construction and typed access.

use thiserror::Error;

use crate::stream::StreamState;

/// Result type for fallible stream helpers.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors raised when opening composite streams or moving typed values.
///
/// The raw [`Stream`](crate::Stream) methods never return these; they report
/// through their return value and [`Stream::state`](crate::Stream::state).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The parent of a child stream cannot be read.
    #[error("parent stream is not readable")]
    ParentNotReadable,

    /// The size of the parent stream could not be determined.
    #[error("parent stream size is unknown")]
    ParentSizeUnknown,

    /// The requested window does not lie within the parent.
    #[error("window {offset}+{length} exceeds parent size {parent_size}")]
    WindowOutOfRange {
        /// Start of the window in the parent.
        offset: u64,
        /// Length of the window.
        length: u64,
        /// Size of the parent when the window was opened.
        parent_size: u64,
    },

    /// Fewer bytes were available than a typed read needs.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes the value needs.
        expected: usize,
        /// Bytes actually delivered.
        actual: usize,
    },

    /// The stream failed a read.
    #[error("read failed ({state:?})")]
    ReadFailed {
        /// State reported by the stream after the failure.
        state: StreamState,
    },

    /// The stream failed a write.
    #[error("write failed ({state:?})")]
    WriteFailed {
        /// State reported by the stream after the failure.
        state: StreamState,
    },

    /// The stream rejected a seek.
    #[error("seek to {position} failed ({state:?})")]
    SeekFailed {
        /// Absolute position requested.
        position: u64,
        /// State reported by the stream after the failure.
        state: StreamState,
    },

    /// A length-prefixed string does not fit the 32-bit length field.
    #[error("string of {length} code units is too long to encode")]
    StringTooLong {
        /// Code units in the string.
        length: usize,
    },

    /// A decoded string is not valid text.
    #[error("invalid string data: {0}")]
    InvalidText(String),
}
