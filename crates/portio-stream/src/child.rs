//! A read/write view over a fixed byte range of a parent stream.

use tracing::{debug, warn};

use crate::error::{Result, StreamError};
use crate::stream::{
    absolute_position, relative_position, AccessFlags, PositionType, SharedStream, Stream,
    StreamState,
};

/// A window `[offset, offset + length)` of a shared parent stream.
///
/// Positions are local to the window. Every transfer seeks the parent to
/// `offset + position` first, since other holders of the parent may have
/// moved it. Child streams over one parent must not be used concurrently.
/// The window cannot be resized.
pub struct ChildStream {
    parent: Option<SharedStream>,
    offset: u64,
    length: u64,
    position: u64,
    state: StreamState,
}

impl std::fmt::Debug for ChildStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildStream")
            .field("open", &self.parent.is_some())
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("position", &self.position)
            .field("state", &self.state)
            .finish()
    }
}

impl ChildStream {
    /// Opens a window over `parent`.
    ///
    /// The parent must be readable and the window must lie entirely within
    /// the parent's current size.
    pub fn open(parent: SharedStream, offset: u64, length: u64) -> Result<Self> {
        let (flags, size) = {
            let p = parent.borrow();
            (p.access_flags(), p.size())
        };
        if !flags.contains(AccessFlags::READ) {
            warn!("child stream rejected: parent not readable");
            return Err(StreamError::ParentNotReadable);
        }
        let parent_size = size.ok_or(StreamError::ParentSizeUnknown)?;
        let in_range = offset < parent_size
            && offset
                .checked_add(length)
                .is_some_and(|end| end <= parent_size);
        if !in_range {
            warn!(offset, length, parent_size, "child stream rejected: window out of range");
            return Err(StreamError::WindowOutOfRange {
                offset,
                length,
                parent_size,
            });
        }
        debug!(offset, length, "opened child stream");
        Ok(Self {
            parent: Some(parent),
            offset,
            length,
            position: 0,
            state: StreamState::Ok,
        })
    }

    /// Start of the window in the parent.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of the window.
    pub fn length(&self) -> u64 {
        self.length
    }

    fn remaining(&self) -> u64 {
        self.length - self.position
    }

    /// Seeks the parent to the current position and runs `f` on it.
    fn with_parent<R>(&mut self, f: impl FnOnce(&mut dyn Stream) -> R) -> Option<R> {
        let Some(parent) = self.parent.as_ref() else {
            self.state = StreamState::NotOpen;
            return None;
        };
        let Ok(mut p) = parent.try_borrow_mut() else {
            self.state = StreamState::AccessDenied;
            return None;
        };
        if !p.seek_to(self.offset + self.position) {
            self.state = p.state();
            return None;
        }
        Some(f(&mut *p))
    }
}

impl Stream for ChildStream {
    fn type_name(&self) -> &'static str {
        "child"
    }

    fn access_flags(&self) -> AccessFlags {
        match &self.parent {
            Some(p) => p.try_borrow().map(|p| p.access_flags()).unwrap_or_default(),
            None => AccessFlags::empty(),
        }
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn close(&mut self) -> bool {
        self.parent = None;
        self.offset = 0;
        self.length = 0;
        self.position = 0;
        true
    }

    fn size(&self) -> Option<u64> {
        self.parent.as_ref().map(|_| self.length)
    }

    fn set_size(&mut self, _size: u64) -> bool {
        self.state = StreamState::Unsupported;
        false
    }

    fn position(&self, kind: PositionType) -> i64 {
        relative_position(kind, self.position, self.length)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
        let target = absolute_position(position, kind, self.position, self.length);
        match u64::try_from(target) {
            Ok(target) if target <= self.length => {
                self.position = target;
                true
            }
            _ => {
                self.state = StreamState::OutOfRange;
                false
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let n = (buf.len() as u64).min(self.remaining()) as usize;
        let got = self.with_parent(|p| p.read(&mut buf[..n]).ok_or_else(|| p.state()))?;
        match got {
            Ok(got) => {
                self.position += got as u64;
                Some(got)
            }
            Err(state) => {
                self.state = state;
                None
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> bool {
        let n = (data.len() as u64).min(self.remaining()) as usize;
        let written = self.with_parent(|p| {
            if p.write(&data[..n]) {
                Ok(())
            } else {
                Err(p.state())
            }
        });
        match written {
            Some(Ok(())) => {
                self.position += n as u64;
                if n < data.len() {
                    self.state = StreamState::OutOfRange;
                    return false;
                }
                true
            }
            Some(Err(state)) => {
                self.state = state;
                false
            }
            None => false,
        }
    }

    fn flush(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStream;
    use crate::stream::shared;

    fn parent() -> SharedStream {
        shared(MemoryStream::from_vec((0..100u8).collect()))
    }

    #[test]
    fn test_child_read_is_clamped_to_window() {
        let mut child = ChildStream::open(parent(), 10, 20).unwrap();
        assert_eq!(child.size(), Some(20));

        let mut buf = [0u8; 32];
        assert_eq!(child.read(&mut buf), Some(20));
        assert_eq!(buf[0], 10);
        assert_eq!(buf[19], 29);
        assert_eq!(child.read(&mut buf), Some(0));
        assert_eq!(child.position(PositionType::End), 0);
    }

    #[test]
    fn test_child_write_is_clamped_to_window() {
        let p = parent();
        let mut child = ChildStream::open(p.clone(), 10, 20).unwrap();
        assert!(child.seek_to(18));
        assert!(!child.write(&[0xaa; 5]));
        assert_eq!(child.state(), StreamState::OutOfRange);
        assert_eq!(child.tell(), 20);

        let mut parent = p.borrow_mut();
        assert_eq!(parent.size(), Some(100));
        assert!(parent.seek_to(26));
        let mut check = [0u8; 6];
        assert_eq!(parent.read(&mut check), Some(6));
        assert_eq!(check, [26, 27, 0xaa, 0xaa, 30, 31]);
    }

    #[test]
    fn test_child_reseeks_parent_each_transfer() {
        let p = parent();
        let mut a = ChildStream::open(p.clone(), 0, 10).unwrap();
        let mut b = ChildStream::open(p.clone(), 50, 10).unwrap();
        let mut x = [0u8; 2];
        assert_eq!(a.read(&mut x), Some(2));
        assert_eq!(b.read(&mut x), Some(2));
        assert_eq!(x, [50, 51]);
        assert_eq!(a.read(&mut x), Some(2));
        assert_eq!(x, [2, 3]);
    }

    #[test]
    fn test_child_open_rejects_bad_windows() {
        assert_eq!(
            ChildStream::open(parent(), 90, 20).unwrap_err(),
            StreamError::WindowOutOfRange {
                offset: 90,
                length: 20,
                parent_size: 100
            }
        );
        assert!(ChildStream::open(parent(), 100, 0).is_err());
        assert!(ChildStream::open(parent(), 1, u64::MAX).is_err());
        assert!(ChildStream::open(parent(), 0, 100).is_ok());
    }

    #[test]
    fn test_child_positions_and_size() {
        let mut child = ChildStream::open(parent(), 10, 20).unwrap();
        assert!(child.set_position(-5, PositionType::End));
        assert_eq!(child.tell(), 15);
        assert!(child.set_position(20, PositionType::Begin));
        assert!(!child.set_position(21, PositionType::Begin));
        assert_eq!(child.state(), StreamState::OutOfRange);
        assert!(!child.set_size(5));
        assert_eq!(child.access_flags(), AccessFlags::READ_WRITE);
        assert!(child.close());
        assert_eq!(child.size(), None);
        assert_eq!(child.read(&mut [0u8; 1]), None);
    }
}
