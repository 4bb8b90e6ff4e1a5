//! The random-access stream contract shared by every stream in this crate.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use bitflags::bitflags;

bitflags! {
    /// What a stream currently allows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u8 {
        /// The stream can be read.
        const READ = 1 << 0;
        /// The stream can be written.
        const WRITE = 1 << 1;
        /// Both.
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// The origin a position is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionType {
    /// From the start of the stream.
    #[default]
    Begin,
    /// From the current position. Getting a position of this type is always `0`.
    Current,
    /// From the end of the stream. Positions of this type are `<= 0` when inside.
    End,
}

/// The outcome of the most recent operation on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// No error.
    #[default]
    Ok,
    /// The stream is closed or was never opened.
    NotOpen,
    /// The operation is not permitted by the stream's access flags.
    AccessDenied,
    /// A position or size fell outside what the stream can address.
    OutOfRange,
    /// The stream does not implement the operation.
    Unsupported,
    /// The underlying I/O object reported an error of this kind.
    Io(io::ErrorKind),
}

impl StreamState {
    /// True when no error is recorded.
    pub fn is_ok(self) -> bool {
        self == StreamState::Ok
    }
}

/// A synchronous random-access byte stream.
///
/// Hot-path operations report failure through their return value only:
/// `read` returns `None`, `write`/`set_size`/`set_position` return `false`
/// and `size` returns `None`. The reason is available from [`Stream::state`].
/// A short read is not an error; it signals the end of the data.
pub trait Stream {
    /// Short name of the stream kind, such as `"memory"` or `"buffered"`.
    fn type_name(&self) -> &'static str;

    /// What the stream currently allows. Empty when closed.
    fn access_flags(&self) -> AccessFlags;

    /// The state left by the last operation.
    fn state(&self) -> StreamState;

    /// Releases the stream's resources. Closing twice is harmless.
    fn close(&mut self) -> bool;

    /// Size in bytes, or `None` if it cannot be determined.
    fn size(&self) -> Option<u64>;

    /// Truncates or extends the stream.
    fn set_size(&mut self, size: u64) -> bool;

    /// The current position relative to `kind`.
    fn position(&self, kind: PositionType) -> i64;

    /// Moves the current position. On failure the resulting position is
    /// whatever the stream reports afterwards.
    fn set_position(&mut self, position: i64, kind: PositionType) -> bool;

    /// Bytes between the current position and the end, best effort.
    fn available(&self) -> Option<u64> {
        let size = self.size()?;
        let position = u64::try_from(self.position(PositionType::Begin)).ok()?;
        Some(size.saturating_sub(position))
    }

    /// Reads up to `buf.len()` bytes and returns how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Writes all of `data`. A partial write is a failure.
    fn write(&mut self, data: &[u8]) -> bool;

    /// Persists anything buffered.
    fn flush(&mut self) -> bool;

    /// Absolute position from the start of the stream.
    fn tell(&self) -> u64 {
        u64::try_from(self.position(PositionType::Begin)).unwrap_or(0)
    }

    /// Seeks to an absolute position.
    fn seek_to(&mut self, position: u64) -> bool {
        match i64::try_from(position) {
            Ok(p) => self.set_position(p, PositionType::Begin),
            Err(_) => false,
        }
    }
}

/// A stream owned by several holders at once.
///
/// Cloning the handle replaces manual reference counting. The count is not
/// atomic and the handle is neither `Send` nor `Sync`: a stream shared between
/// components must be used from one thread, and holders that move its
/// position (such as child streams over one parent) must coordinate.
pub type SharedStream = Rc<RefCell<dyn Stream>>;

/// Wraps a stream in a [`SharedStream`] handle.
pub fn shared<S: Stream + 'static>(stream: S) -> SharedStream {
    Rc::new(RefCell::new(stream))
}

/// Resolves `position` of type `kind` to an absolute offset, given the
/// stream's current absolute position and its size.
pub(crate) fn absolute_position(position: i64, kind: PositionType, current: u64, size: u64) -> i64 {
    match kind {
        PositionType::Begin => position,
        PositionType::Current => (current as i64).saturating_add(position),
        PositionType::End => (size as i64).saturating_add(position),
    }
}

/// Reports `position` relative to `kind` for a stream at absolute `current`.
pub(crate) fn relative_position(kind: PositionType, current: u64, size: u64) -> i64 {
    match kind {
        PositionType::Begin => current as i64,
        PositionType::Current => 0,
        PositionType::End => current as i64 - size as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_flags() {
        assert!(AccessFlags::READ_WRITE.contains(AccessFlags::READ));
        assert!(AccessFlags::READ_WRITE.contains(AccessFlags::WRITE));
        assert!(!AccessFlags::READ.contains(AccessFlags::WRITE));
        assert!(AccessFlags::empty().is_empty());
    }

    #[test]
    fn test_position_helpers() {
        assert_eq!(absolute_position(5, PositionType::Begin, 10, 100), 5);
        assert_eq!(absolute_position(-3, PositionType::Current, 10, 100), 7);
        assert_eq!(absolute_position(-1, PositionType::End, 10, 100), 99);
        assert_eq!(relative_position(PositionType::Begin, 10, 100), 10);
        assert_eq!(relative_position(PositionType::Current, 10, 100), 0);
        assert_eq!(relative_position(PositionType::End, 10, 100), -90);
    }
}
