//! A stream that discards writes and reads as zeroes.

use crate::stream::{AccessFlags, PositionType, Stream, StreamState};

/// What [`NullStream::available`](Stream::available) reports.
pub const NULL_STREAM_AVAILABLE: u64 = 0x0fff_ffff;

/// Accepts every write and satisfies every read with zero bytes.
///
/// Its size is always 0 and it never moves. Useful for measuring what a
/// writer would produce or for discarding output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStream;

impl NullStream {
    pub fn new() -> Self {
        Self
    }
}

impl Stream for NullStream {
    fn type_name(&self) -> &'static str {
        "null"
    }

    fn access_flags(&self) -> AccessFlags {
        AccessFlags::READ_WRITE
    }

    fn state(&self) -> StreamState {
        StreamState::Ok
    }

    fn close(&mut self) -> bool {
        true
    }

    fn size(&self) -> Option<u64> {
        Some(0)
    }

    fn set_size(&mut self, _size: u64) -> bool {
        true
    }

    fn position(&self, _kind: PositionType) -> i64 {
        0
    }

    fn set_position(&mut self, _position: i64, _kind: PositionType) -> bool {
        true
    }

    fn available(&self) -> Option<u64> {
        Some(NULL_STREAM_AVAILABLE)
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        buf.fill(0);
        Some(buf.len())
    }

    fn write(&mut self, _data: &[u8]) -> bool {
        true
    }

    fn flush(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_stream() {
        let mut s = NullStream::new();
        assert!(s.write(b"discarded"));
        let mut buf = [0xffu8; 4];
        assert_eq!(s.read(&mut buf), Some(4));
        assert_eq!(buf, [0; 4]);
        assert_eq!(s.size(), Some(0));
        assert_eq!(s.available(), Some(NULL_STREAM_AVAILABLE));
        assert!(s.set_position(100, PositionType::Begin));
        assert_eq!(s.tell(), 0);
    }
}
