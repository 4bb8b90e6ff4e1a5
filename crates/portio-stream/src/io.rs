//! Adapter from `std::io` objects to [`Stream`].

use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::stream::{
    absolute_position, relative_position, AccessFlags, PositionType, Stream, StreamState,
};

/// Bridges a file-like [`Stream`] contract to a `std::io::Read + Write + Seek`
/// value such as `std::fs::File` or `std::io::Cursor`.
///
/// The access flags are fixed at construction and are not checked against
/// how the inner value was opened. `set_size` is not available through the
/// `std::io` traits and always fails.
#[derive(Debug)]
pub struct IoStream<T> {
    inner: Option<RefCell<T>>,
    flags: AccessFlags,
    position: u64,
    state: StreamState,
}

impl<T: Read + Write + Seek> IoStream<T> {
    /// Wraps `inner`, whose cursor is taken as the starting position.
    pub fn new(mut inner: T, flags: AccessFlags) -> Self {
        let (position, state) = match inner.stream_position() {
            Ok(p) => (p, StreamState::Ok),
            Err(e) => (0, StreamState::Io(e.kind())),
        };
        Self {
            inner: Some(RefCell::new(inner)),
            flags,
            position,
            state,
        }
    }

    /// Returns the inner value, or `None` if the stream was closed.
    pub fn into_inner(self) -> Option<T> {
        self.inner.map(RefCell::into_inner)
    }

    fn fail(&mut self, err: &io::Error) {
        debug!(error = %err, "io stream operation failed");
        self.state = StreamState::Io(err.kind());
    }

    fn require(&mut self, flag: AccessFlags) -> bool {
        if self.inner.is_none() {
            self.state = StreamState::NotOpen;
            return false;
        }
        if !self.flags.contains(flag) {
            self.state = StreamState::AccessDenied;
            return false;
        }
        true
    }
}

impl<T: Read + Write + Seek> Stream for IoStream<T> {
    fn type_name(&self) -> &'static str {
        "io"
    }

    fn access_flags(&self) -> AccessFlags {
        if self.inner.is_some() {
            self.flags
        } else {
            AccessFlags::empty()
        }
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn close(&mut self) -> bool {
        if let Some(inner) = self.inner.take() {
            if let Err(e) = inner.into_inner().flush() {
                self.fail(&e);
                return false;
            }
        }
        self.position = 0;
        true
    }

    fn size(&self) -> Option<u64> {
        let mut inner = self.inner.as_ref()?.borrow_mut();
        let end = inner.seek(SeekFrom::End(0)).ok()?;
        inner.seek(SeekFrom::Start(self.position)).ok()?;
        Some(end)
    }

    fn set_size(&mut self, _size: u64) -> bool {
        self.state = StreamState::Unsupported;
        false
    }

    fn position(&self, kind: PositionType) -> i64 {
        let size = match kind {
            PositionType::End => self.size().unwrap_or(self.position),
            _ => 0,
        };
        relative_position(kind, self.position, size)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
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
        let target = absolute_position(position, kind, self.position, size);
        let Ok(target) = u64::try_from(target) else {
            self.state = StreamState::OutOfRange;
            return false;
        };
        let Some(inner) = self.inner.as_mut() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        let result = inner.get_mut().seek(SeekFrom::Start(target));
        match result {
            Ok(p) => {
                self.position = p;
                true
            }
            Err(e) => {
                self.fail(&e);
                false
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.require(AccessFlags::READ) {
            return None;
        }
        let inner = self.inner.as_mut()?.get_mut();
        let mut total = 0;
        while total < buf.len() {
            match inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.position += total as u64;
                    self.fail(&e);
                    return None;
                }
            }
        }
        self.position += total as u64;
        Some(total)
    }

    fn write(&mut self, data: &[u8]) -> bool {
        if !self.require(AccessFlags::WRITE) {
            return false;
        }
        let Some(inner) = self.inner.as_mut() else {
            return false;
        };
        match inner.get_mut().write_all(data) {
            Ok(()) => {
                self.position += data.len() as u64;
                true
            }
            Err(e) => {
                if let Ok(p) = inner.get_mut().stream_position() {
                    self.position = p;
                }
                self.fail(&e);
                false
            }
        }
    }

    fn flush(&mut self) -> bool {
        let Some(inner) = self.inner.as_mut() else {
            self.state = StreamState::NotOpen;
            return false;
        };
        match inner.get_mut().flush() {
            Ok(()) => true,
            Err(e) => {
                self.fail(&e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_io_stream_over_cursor() {
        let mut s = IoStream::new(Cursor::new(Vec::new()), AccessFlags::READ_WRITE);
        assert!(s.write(b"abcdef"));
        assert_eq!(s.size(), Some(6));
        assert_eq!(s.tell(), 6);
        assert!(s.set_position(-4, PositionType::End));

        let mut buf = [0u8; 3];
        assert_eq!(s.read(&mut buf), Some(3));
        assert_eq!(&buf, b"cde");
        assert_eq!(s.position(PositionType::End), -1);
        assert_eq!(s.into_inner().map(Cursor::into_inner), Some(b"abcdef".to_vec()));
    }

    #[test]
    fn test_io_stream_access_flags_enforced() {
        let mut s = IoStream::new(Cursor::new(vec![1, 2, 3]), AccessFlags::READ);
        assert!(!s.write(b"x"));
        assert_eq!(s.state(), StreamState::AccessDenied);
        assert_eq!(s.read(&mut [0u8; 8]), Some(3));
    }

    #[test]
    fn test_io_stream_close() {
        let mut s = IoStream::new(Cursor::new(vec![1]), AccessFlags::READ_WRITE);
        assert!(s.close());
        assert!(s.close());
        assert!(s.access_flags().is_empty());
        assert_eq!(s.size(), None);
        assert_eq!(s.read(&mut [0u8; 1]), None);
        assert_eq!(s.state(), StreamState::NotOpen);
        assert!(!s.set_size(0));
    }
}
