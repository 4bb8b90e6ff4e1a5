//! Synchronous random-access streams.
//!
//! Every stream implements [`Stream`]: access flags, a state code, a size and
//! a position relative to the start, the current position or the end.
//! Failures are reported by return value and the cause is kept in
//! [`Stream::state`].
//!
//! On top of the contract this crate provides:
//!
//! - [`BufferedStream`], a read-ahead and write-behind cache over any stream,
//! - [`ChildStream`], a window over a fixed range of a parent stream,
//! - [`MemoryStream`], [`FixedMemoryStream`] and [`NullStream`],
//! - [`IoStream`], which wraps anything implementing `std::io::{Read, Write, Seek}`,
//! - the [`adapter`] functions for typed values in an explicit byte order.
//!
//! Streams are shared with [`SharedStream`], a single-threaded `Rc<RefCell<_>>`
//! handle. Nothing here is synchronized.
//!
//! # Example
//!
//! ```
//! use portio_stream::{adapter, shared, BufferedStream, ChildStream, Endian, MemoryStream, Stream};
//!
//! let file = shared(MemoryStream::new());
//! let mut out = BufferedStream::with_defaults(file.clone());
//! adapter::write_string(&mut out, "header", Endian::Big).unwrap();
//! adapter::write_u32(&mut out, 7, Endian::Big).unwrap();
//! assert!(out.flush());
//!
//! let mut record = ChildStream::open(file, 10, 4).unwrap();
//! assert_eq!(adapter::read_u32(&mut record, Endian::Big).unwrap(), 7);
//! ```

pub mod adapter;
pub mod buffered;
pub mod child;
pub mod endian;
pub mod error;
pub mod io;
pub mod memory;
pub mod null;
pub mod stream;

pub use adapter::{copy_stream, LineEnd, DEFAULT_COPY_BUFFER_SIZE};
pub use buffered::{
    clamp_buffer_size, BufferedStream, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE,
};
pub use child::ChildStream;
pub use endian::{Endian, ParseEndianError};
pub use error::{Result, StreamError};
pub use io::IoStream;
pub use memory::{FixedMemoryStream, MemoryStream, ResizeOptions};
pub use null::{NullStream, NULL_STREAM_AVAILABLE};
pub use stream::{shared, AccessFlags, PositionType, SharedStream, Stream, StreamState};
