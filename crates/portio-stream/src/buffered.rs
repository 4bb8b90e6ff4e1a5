//! Read-ahead and write-behind caching over any shared stream.
//!
//! A [`BufferedStream`] keeps two buffers but only one of them holds data at
//! a time. Reading flushes pending writes first; writing discards any cached
//! read-ahead. Two cursors are tracked: the *external* position the caller
//! sees and the *internal* position of the wrapped stream. They differ only
//! while a buffer is active or after a lazy seek within the read buffer.
//!
//! Whenever the wrapped stream fails a transfer or a seek, both cursors are
//! reset to the position the wrapped stream actually reports.
//!
//! # Example
//!
//! ```
//! use portio_stream::{shared, BufferedStream, MemoryStream, Stream};
//!
//! let mut s = BufferedStream::new(shared(MemoryStream::new()), 64, 64);
//! assert!(s.write(b"hello"));
//! assert!(s.seek_to(0));
//!
//! let mut buf = [0u8; 5];
//! assert_eq!(s.read(&mut buf), Some(5));
//! assert_eq!(&buf, b"hello");
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::stream::{
    absolute_position, relative_position, AccessFlags, PositionType, SharedStream, Stream,
    StreamState,
};

/// Default size of each buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 2000;

/// Smallest non-zero buffer size.
pub const MIN_BUFFER_SIZE: usize = 4;

/// Largest buffer size.
pub const MAX_BUFFER_SIZE: usize = 16_000_000;

/// Rounds a requested buffer size down to an even number within
/// `[MIN_BUFFER_SIZE, MAX_BUFFER_SIZE]`. Zero stays zero and disables the
/// buffer.
pub fn clamp_buffer_size(size: usize) -> usize {
    if size == 0 {
        0
    } else {
        (size & !1).clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
    }
}

/// A caching wrapper around a [`SharedStream`].
pub struct BufferedStream {
    stream: Option<SharedStream>,

    read_buf: Vec<u8>,
    read_start: u64,
    read_used: usize,

    write_buf: Vec<u8>,
    write_start: u64,
    write_used: usize,

    external: u64,
    internal: u64,

    cache_size: bool,
    cached_size: Cell<Option<u64>>,
    state: StreamState,
}

impl std::fmt::Debug for BufferedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedStream")
            .field("open", &self.stream.is_some())
            .field("read_size", &self.read_buf.len())
            .field("read_start", &self.read_start)
            .field("read_used", &self.read_used)
            .field("write_size", &self.write_buf.len())
            .field("write_start", &self.write_start)
            .field("write_used", &self.write_used)
            .field("external", &self.external)
            .field("internal", &self.internal)
            .finish()
    }
}

impl BufferedStream {
    /// Wraps `stream` with buffers of the given sizes.
    ///
    /// Sizes are adjusted by [`clamp_buffer_size`].
    pub fn new(stream: SharedStream, read_size: usize, write_size: usize) -> Self {
        let position = stream.borrow().tell();
        Self {
            stream: Some(stream),
            read_buf: vec![0; clamp_buffer_size(read_size)],
            read_start: position,
            read_used: 0,
            write_buf: vec![0; clamp_buffer_size(write_size)],
            write_start: position,
            write_used: 0,
            external: position,
            internal: position,
            cache_size: false,
            cached_size: Cell::new(None),
            state: StreamState::Ok,
        }
    }

    /// Wraps `stream` with buffers of [`DEFAULT_BUFFER_SIZE`].
    pub fn with_defaults(stream: SharedStream) -> Self {
        Self::new(stream, DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE)
    }

    /// The wrapped stream, if any.
    pub fn stream(&self) -> Option<&SharedStream> {
        self.stream.as_ref()
    }

    /// Replaces the wrapped stream after flushing the current one.
    ///
    /// The cursors are taken from the new stream's position.
    pub fn set_stream(&mut self, stream: Option<SharedStream>) -> bool {
        let same = match (&self.stream, &stream) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return true;
        }
        let flushed = self.stream.is_none() || self.flush_and_clear();
        let position = stream.as_ref().map(|s| s.borrow().tell()).unwrap_or(0);
        self.stream = stream;
        self.read_used = 0;
        self.write_used = 0;
        self.read_start = position;
        self.write_start = position;
        self.external = position;
        self.internal = position;
        self.cached_size.set(None);
        self.state = StreamState::Ok;
        flushed
    }

    /// Current `(read, write)` buffer sizes.
    pub fn buffer_sizes(&self) -> (usize, usize) {
        (self.read_buf.len(), self.write_buf.len())
    }

    /// Resizes the buffers. Shrinking or disabling the read buffer drops its
    /// contents; resizing the write buffer flushes it first.
    pub fn set_buffer_sizes(&mut self, read_size: usize, write_size: usize) -> bool {
        let read_size = clamp_buffer_size(read_size);
        let write_size = clamp_buffer_size(write_size);
        let mut ok = true;

        if read_size != self.read_buf.len() {
            if read_size < self.read_used {
                self.read_used = 0;
                ok &= self.sync_internal();
            }
            self.read_buf.resize(read_size, 0);
            self.read_buf.shrink_to_fit();
        }
        if write_size != self.write_buf.len() {
            ok &= self.flush_write_buffer();
            self.write_buf = vec![0; write_size];
        }
        ok
    }

    /// Whether [`size`](Stream::size) results are cached.
    pub fn cache_size(&self) -> bool {
        self.cache_size
    }

    /// Caches the wrapped stream's size after the first query. Only enable
    /// this for streams whose size cannot change behind this wrapper.
    pub fn set_cache_size(&mut self, enabled: bool) {
        self.cache_size = enabled;
        self.cached_size.set(None);
    }

    /// Flushes pending writes, drops read-ahead, and moves the wrapped
    /// stream to the external position.
    pub fn flush_and_clear(&mut self) -> bool {
        let flushed = self.flush_write_buffer();
        self.read_used = 0;
        flushed && self.sync_internal()
    }

    /// Writes the write buffer to the wrapped stream.
    fn flush_write_buffer(&mut self) -> bool {
        if self.write_used == 0 {
            return true;
        }
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        let mut s = stream.borrow_mut();
        if self.internal != self.write_start && !s.seek_to(self.write_start) {
            drop(s);
            self.fail_and_resync(&stream, "seek before flush failed");
            return false;
        }
        if !s.write(&self.write_buf[..self.write_used]) {
            drop(s);
            self.fail_and_resync(&stream, "flush of write buffer failed");
            return false;
        }
        trace!(start = self.write_start, len = self.write_used, "flushed write buffer");
        self.internal = self.write_start + self.write_used as u64;
        self.write_start = self.internal;
        self.write_used = 0;
        if let Some(size) = self.cached_size.get() {
            self.cached_size.set(Some(size.max(self.internal)));
        }
        true
    }

    /// Seeks the wrapped stream to the external position if they differ.
    fn sync_internal(&mut self) -> bool {
        if self.internal == self.external {
            return true;
        }
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        let moved = stream.borrow_mut().seek_to(self.external);
        if moved {
            self.internal = self.external;
            true
        } else {
            self.fail_and_resync(&stream, "seek of wrapped stream failed");
            false
        }
    }

    /// Records the wrapped stream's failure and adopts its actual position.
    fn fail_and_resync(&mut self, stream: &SharedStream, what: &str) {
        let (position, state) = {
            let s = stream.borrow();
            (s.tell(), s.state())
        };
        warn!(
            expected = self.external,
            actual = position,
            ?state,
            "{what}; resyncing buffered position"
        );
        self.internal = position;
        self.external = position;
        self.read_used = 0;
        self.write_used = 0;
        self.read_start = position;
        self.write_start = position;
        self.state = if state.is_ok() {
            StreamState::OutOfRange
        } else {
            state
        };
    }

    fn read_unbuffered(&mut self, stream: &SharedStream, buf: &mut [u8]) -> Option<usize> {
        let got = stream.borrow_mut().read(buf);
        match got {
            Some(n) => {
                self.internal += n as u64;
                self.external = self.internal;
                Some(n)
            }
            None => {
                self.fail_and_resync(stream, "read of wrapped stream failed");
                None
            }
        }
    }
}

impl Stream for BufferedStream {
    fn type_name(&self) -> &'static str {
        "buffered"
    }

    fn access_flags(&self) -> AccessFlags {
        self.stream
            .as_ref()
            .and_then(|s| s.try_borrow().ok().map(|s| s.access_flags()))
            .unwrap_or_default()
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn close(&mut self) -> bool {
        let Some(stream) = self.stream.clone() else {
            return true;
        };
        let flushed = self.flush_write_buffer();
        self.read_used = 0;
        self.write_used = 0;
        let closed = stream.borrow_mut().close();
        debug!(flushed, closed, "closed buffered stream");
        self.stream = None;
        self.cached_size.set(None);
        flushed && closed
    }

    fn size(&self) -> Option<u64> {
        if self.cache_size {
            if let Some(size) = self.cached_size.get() {
                return Some(size);
            }
        }
        let size = self.stream.as_ref()?.try_borrow().ok()?.size()?;
        let size = if self.write_used > 0 {
            size.max(self.write_start + self.write_used as u64)
        } else {
            size
        };
        if self.cache_size {
            self.cached_size.set(Some(size));
        }
        Some(size)
    }

    fn set_size(&mut self, size: u64) -> bool {
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        if !self.flush_write_buffer() {
            return false;
        }
        self.read_used = 0;
        self.cached_size.set(None);
        let resized = stream.borrow_mut().set_size(size);
        if !resized {
            self.fail_and_resync(&stream, "resize of wrapped stream failed");
            return false;
        }
        let position = stream.borrow().tell();
        self.internal = position;
        self.external = position;
        true
    }

    fn position(&self, kind: PositionType) -> i64 {
        let size = match kind {
            PositionType::End => self.size().unwrap_or(self.external),
            _ => 0,
        };
        relative_position(kind, self.external, size)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        let size = match kind {
            PositionType::End => match self.size() {
                Some(size) => size,
                None => {
                    self.state = StreamState::Unsupported;
                    return false;
                }
            },
            _ => 0,
        };
        let target = absolute_position(position, kind, self.external, size);

        if self.read_used > 0 {
            if let Ok(target) = u64::try_from(target) {
                self.external = target;
                return true;
            }
        }
        if target == self.external as i64 {
            return true;
        }

        if !self.flush_write_buffer() {
            return false;
        }
        let moved = stream.borrow_mut().set_position(target, PositionType::Begin);
        if !moved {
            self.fail_and_resync(&stream, "seek of wrapped stream failed");
            return false;
        }
        let actual = stream.borrow().tell();
        self.internal = actual;
        self.external = actual;
        self.read_start = actual;
        self.write_start = actual;
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return None;
        };
        if !self.flush_write_buffer() {
            return None;
        }
        if self.read_buf.is_empty() {
            if !self.sync_internal() {
                return None;
            }
            return self.read_unbuffered(&stream, buf);
        }

        let capacity = self.read_buf.len();
        let mut total = 0;
        while total < buf.len() {
            let window_end = self.read_start + self.read_used as u64;
            if self.read_used > 0 && self.external >= self.read_start && self.external < window_end
            {
                let offset = (self.external - self.read_start) as usize;
                let n = (self.read_used - offset).min(buf.len() - total);
                buf[total..total + n].copy_from_slice(&self.read_buf[offset..offset + n]);
                total += n;
                self.external += n as u64;
                continue;
            }

            self.read_used = 0;
            if !self.sync_internal() {
                return None;
            }

            let remaining = buf.len() - total;
            if remaining > capacity * 2 {
                let n = self.read_unbuffered(&stream, &mut buf[total..])?;
                total += n;
                break;
            }

            let got = stream.borrow_mut().read(&mut self.read_buf);
            let Some(n) = got else {
                self.fail_and_resync(&stream, "refill of read buffer failed");
                return None;
            };
            trace!(start = self.internal, len = n, "refilled read buffer");
            self.read_start = self.internal;
            self.read_used = n;
            self.internal += n as u64;
            if n == 0 {
                break;
            }
        }
        Some(total)
    }

    fn write(&mut self, data: &[u8]) -> bool {
        let Some(stream) = self.stream.clone() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        self.read_used = 0;
        if self.write_used == 0 && !self.sync_internal() {
            return false;
        }

        if self.write_buf.is_empty() {
            let written = stream.borrow_mut().write(data);
            if !written {
                self.fail_and_resync(&stream, "write to wrapped stream failed");
                return false;
            }
            self.internal += data.len() as u64;
            self.external = self.internal;
            return true;
        }

        if self.write_used == 0 {
            self.write_start = self.external;
        }
        let mut rest = data;
        while !rest.is_empty() {
            let space = self.write_buf.len() - self.write_used;
            if space == 0 {
                if !self.flush_write_buffer() {
                    return false;
                }
                continue;
            }
            let n = space.min(rest.len());
            self.write_buf[self.write_used..self.write_used + n].copy_from_slice(&rest[..n]);
            self.write_used += n;
            self.external += n as u64;
            rest = &rest[n..];
        }
        true
    }

    fn flush(&mut self) -> bool {
        if !self.flush_write_buffer() {
            return false;
        }
        match self.stream.clone() {
            Some(stream) => stream.borrow_mut().flush(),
            None => {
                self.state = StreamState::NotOpen;
                false
            }
        }
    }
}

impl Drop for BufferedStream {
    fn drop(&mut self) {
        if self.write_used > 0 && !self.flush_write_buffer() {
            warn!("pending writes lost when dropping buffered stream");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStream;
    use crate::stream::shared;
    use std::cell::RefCell;

    fn memory(data: &[u8]) -> Rc<RefCell<MemoryStream>> {
        Rc::new(RefCell::new(MemoryStream::from_vec(data.to_vec())))
    }

    /// A stream that refuses to seek anywhere except its current position.
    struct Unseekable {
        inner: MemoryStream,
    }

    impl Stream for Unseekable {
        fn type_name(&self) -> &'static str {
            "unseekable"
        }
        fn access_flags(&self) -> AccessFlags {
            self.inner.access_flags()
        }
        fn state(&self) -> StreamState {
            StreamState::Unsupported
        }
        fn close(&mut self) -> bool {
            self.inner.close()
        }
        fn size(&self) -> Option<u64> {
            self.inner.size()
        }
        fn set_size(&mut self, _size: u64) -> bool {
            false
        }
        fn position(&self, kind: PositionType) -> i64 {
            self.inner.position(kind)
        }
        fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
            let target = absolute_position(
                position,
                kind,
                self.inner.tell(),
                self.inner.size().unwrap_or(0),
            );
            target == self.inner.tell() as i64
        }
        fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
            self.inner.read(buf)
        }
        fn write(&mut self, data: &[u8]) -> bool {
            self.inner.write(data)
        }
        fn flush(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn test_clamp_buffer_size() {
        assert_eq!(clamp_buffer_size(0), 0);
        assert_eq!(clamp_buffer_size(1), MIN_BUFFER_SIZE);
        assert_eq!(clamp_buffer_size(7), 6);
        assert_eq!(clamp_buffer_size(2001), 2000);
        assert_eq!(clamp_buffer_size(usize::MAX), MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_read_after_write_sees_flushed_data() {
        let mem = memory(b"0123456789");
        let mut s = BufferedStream::new(mem.clone(), 8, 8);

        assert!(s.write(b"ab"));
        assert_eq!(mem.borrow().data(), b"0123456789");

        let mut buf = [0u8; 2];
        assert_eq!(s.read(&mut buf), Some(2));
        assert_eq!(&buf, b"23");
        assert_eq!(mem.borrow().data(), b"ab23456789");

        assert!(s.seek_to(0));
        let mut buf = [0u8; 4];
        assert_eq!(s.read(&mut buf), Some(4));
        assert_eq!(&buf, b"ab23");
    }

    #[test]
    fn test_write_discards_read_ahead() {
        let mem = memory(b"0123456789");
        let mut s = BufferedStream::new(mem.clone(), 8, 8);

        let mut buf = [0u8; 2];
        assert_eq!(s.read(&mut buf), Some(2));
        assert!(s.write(b"XY"));
        assert!(s.seek_to(0));
        let mut all = [0u8; 10];
        assert_eq!(s.read(&mut all), Some(10));
        assert_eq!(&all, b"01XY456789");
    }

    #[test]
    fn test_seek_within_read_buffer_is_lazy() {
        let mem = memory(b"0123456789");
        let mut s = BufferedStream::new(mem.clone(), 16, 16);

        let mut buf = [0u8; 1];
        assert_eq!(s.read(&mut buf), Some(1));
        assert_eq!(mem.borrow().tell(), 10);

        assert!(s.seek_to(7));
        assert_eq!(mem.borrow().tell(), 10);
        assert_eq!(s.tell(), 7);
        assert_eq!(s.read(&mut buf), Some(1));
        assert_eq!(&buf, b"7");
    }

    #[test]
    fn test_large_read_goes_direct() {
        let data: Vec<u8> = (0..64).collect();
        let mem = memory(&data);
        let mut s = BufferedStream::new(mem, 4, 4);

        let mut buf = [0u8; 64];
        assert_eq!(s.read(&mut buf), Some(64));
        assert_eq!(buf.to_vec(), data);
        assert_eq!(s.read(&mut buf), Some(0));
    }

    #[test]
    fn test_write_larger_than_buffer_splits() {
        let mem = Rc::new(RefCell::new(MemoryStream::new()));
        let mut s = BufferedStream::new(mem.clone(), 4, 4);
        assert!(s.write(b"abcdefghij"));
        assert_eq!(mem.borrow().data(), b"abcdefgh");
        assert_eq!(s.size(), Some(10));
        assert!(s.flush());
        assert_eq!(mem.borrow().data(), b"abcdefghij");
    }

    #[test]
    fn test_position_after_failed_seek_matches_wrapped_stream() {
        let inner = Unseekable {
            inner: MemoryStream::from_vec(b"0123456789".to_vec()),
        };
        let mut s = BufferedStream::new(shared(inner), 0, 4);

        assert!(s.write(b"ab"));
        assert!(!s.seek_to(8));
        assert_eq!(s.tell(), 2);
        assert_eq!(s.state(), StreamState::Unsupported);
    }

    #[test]
    fn test_failed_flush_resyncs() {
        let mem = Rc::new(RefCell::new(MemoryStream::with_options(
            crate::memory::ResizeOptions {
                maximum: 4,
                ..Default::default()
            },
        )));
        let mut s = BufferedStream::new(mem.clone(), 8, 8);
        assert!(s.write(b"abcdef"));
        assert!(!s.flush());
        assert_eq!(s.tell(), mem.borrow().tell());
        assert_eq!(s.state(), StreamState::OutOfRange);
    }

    #[test]
    fn test_seek_beyond_memory_limits_fails_cleanly() {
        let mem = memory(b"abc");
        let mut s = BufferedStream::new(mem.clone(), 8, 8);
        assert!(!s.seek_to(1 << 46));
        assert_eq!(s.tell(), 0);
        assert_eq!(s.state(), StreamState::OutOfRange);
        assert_eq!(mem.borrow().size(), Some(3));
    }

    #[test]
    fn test_unbuffered_passthrough() {
        let mem = memory(b"");
        let mut s = BufferedStream::new(mem.clone(), 0, 0);
        assert_eq!(s.buffer_sizes(), (0, 0));
        assert!(s.write(b"xyz"));
        assert_eq!(mem.borrow().data(), b"xyz");
        assert!(s.seek_to(1));
        let mut buf = [0u8; 8];
        assert_eq!(s.read(&mut buf), Some(2));
        assert_eq!(&buf[..2], b"yz");
    }

    #[test]
    fn test_set_buffer_sizes_flushes_writes() {
        let mem = memory(b"");
        let mut s = BufferedStream::new(mem.clone(), 8, 8);
        assert!(s.write(b"abc"));
        assert!(s.set_buffer_sizes(8, 0));
        assert_eq!(mem.borrow().data(), b"abc");
        assert_eq!(s.buffer_sizes(), (8, 0));
    }

    #[test]
    fn test_cached_size() {
        let mem = memory(b"12345");
        let mut s = BufferedStream::new(mem.clone(), 8, 8);
        s.set_cache_size(true);
        assert_eq!(s.size(), Some(5));
        mem.borrow_mut().set_size(1);
        assert_eq!(s.size(), Some(5));
        s.set_cache_size(false);
        assert_eq!(s.size(), Some(1));
    }

    #[test]
    fn test_set_stream_and_close() {
        let first = memory(b"");
        let second = memory(b"zz");
        let mut s = BufferedStream::new(first.clone(), 8, 8);
        assert!(s.write(b"one"));
        let next: SharedStream = second.clone();
        assert!(s.set_stream(Some(next)));
        assert_eq!(first.borrow().data(), b"one");
        assert_eq!(s.tell(), 0);

        assert!(s.write(b"Z"));
        assert!(s.close());
        assert!(s.access_flags().is_empty());
        assert!(second.borrow().access_flags().is_empty());
    }

    #[test]
    fn test_drop_flushes() {
        let mem = memory(b"");
        {
            let mut s = BufferedStream::new(mem.clone(), 8, 8);
            assert!(s.write(b"kept"));
        }
        assert_eq!(mem.borrow().data(), b"kept");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::memory::MemoryStream;
    use proptest::prelude::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone)]
    enum Op {
        Write(Vec<u8>),
        Read(usize),
        Seek(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..24).prop_map(Op::Write),
            (0usize..40).prop_map(Op::Read),
            (0u64..64).prop_map(Op::Seek),
        ]
    }

    proptest! {
        #[test]
        fn buffered_matches_direct(
            ops in prop::collection::vec(op(), 0..40),
            read_size in 0usize..16,
            write_size in 0usize..16,
        ) {
            let mem = Rc::new(RefCell::new(MemoryStream::new()));
            let mut buffered = BufferedStream::new(mem.clone(), read_size, write_size);
            let mut direct = MemoryStream::new();

            for op in ops {
                match op {
                    Op::Write(data) => {
                        prop_assert!(buffered.write(&data));
                        prop_assert!(direct.write(&data));
                    }
                    Op::Read(n) => {
                        let mut a = vec![0u8; n];
                        let mut b = vec![0u8; n];
                        prop_assert_eq!(buffered.read(&mut a), direct.read(&mut b));
                        prop_assert_eq!(a, b);
                    }
                    Op::Seek(to) => {
                        let to = to.min(direct.size().unwrap_or(0));
                        prop_assert!(buffered.seek_to(to));
                        prop_assert!(direct.seek_to(to));
                    }
                }
                prop_assert_eq!(buffered.tell(), direct.tell());
                prop_assert_eq!(buffered.size(), direct.size());
            }

            prop_assert!(buffered.flush());
            let mem_ref = mem.borrow();
            prop_assert_eq!(mem_ref.data(), direct.data());
        }
    }
}
