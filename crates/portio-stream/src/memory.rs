//! Streams over memory.

use tracing::{trace, warn};

use crate::stream::{
    absolute_position, relative_position, AccessFlags, PositionType, Stream, StreamState,
};

/// How a [`MemoryStream`] grows when written or positioned past its capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    /// Grow automatically. When disabled, writes beyond capacity fail.
    pub enabled: bool,
    /// Capacity is multiplied by this on growth. At least 1.0.
    pub factor: f32,
    /// Bytes added after applying `factor`.
    pub increment: usize,
    /// Upper bound for the capacity, `0` for none.
    pub maximum: usize,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 1.5,
            increment: 0,
            maximum: 0,
        }
    }
}

impl ResizeOptions {
    /// Options that never grow the buffer.
    pub fn fixed() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// The capacity to grow to so that at least `required` bytes fit.
    fn grow(&self, current: usize, required: usize) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        let scaled = (current as f64 * f64::from(self.factor.max(1.0))) as usize;
        let mut capacity = scaled.saturating_add(self.increment).max(required);
        if self.maximum != 0 {
            if required > self.maximum {
                return None;
            }
            capacity = capacity.min(self.maximum);
        }
        Some(capacity)
    }
}

/// A growable in-memory stream.
///
/// The logical size is tracked apart from the allocated capacity. Bytes between
/// the size and the capacity are kept zeroed.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Vec<u8>,
    size: usize,
    position: usize,
    options: ResizeOptions,
    open: bool,
    state: StreamState,
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStream {
    /// An empty stream that grows as it is written.
    pub fn new() -> Self {
        Self::with_options(ResizeOptions::default())
    }

    /// An empty stream with the given growth behavior.
    pub fn with_options(options: ResizeOptions) -> Self {
        Self {
            data: Vec::new(),
            size: 0,
            position: 0,
            options,
            open: true,
            state: StreamState::Ok,
        }
    }

    /// A stream whose contents are `data`, positioned at the start.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            data,
            size,
            ..Self::new()
        }
    }

    /// The contents up to the logical size.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Consumes the stream and returns its contents.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.size);
        self.data
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reallocates to exactly `capacity` bytes, truncating the size if needed.
    pub fn set_capacity(&mut self, capacity: usize) -> bool {
        self.data.resize(capacity, 0);
        self.size = self.size.min(capacity);
        self.position = self.position.min(self.size);
        true
    }

    pub fn options(&self) -> ResizeOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ResizeOptions) {
        self.options = options;
    }

    /// Replaces the contents, reopening the stream if it was closed.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.size = data.len();
        self.data = data;
        self.position = 0;
        self.open = true;
        self.state = StreamState::Ok;
    }

    /// Makes room for `required` bytes, growing per the resize options.
    fn reserve(&mut self, required: usize) -> bool {
        if required <= self.data.len() {
            return true;
        }
        match self.options.grow(self.data.len(), required) {
            Some(capacity) => {
                if self
                    .data
                    .try_reserve_exact(capacity - self.data.len())
                    .is_err()
                {
                    warn!(from = self.data.len(), to = capacity, "memory stream allocation failed");
                    self.state = StreamState::OutOfRange;
                    return false;
                }
                trace!(from = self.data.len(), to = capacity, "growing memory stream");
                self.data.resize(capacity, 0);
                true
            }
            None => {
                self.state = StreamState::OutOfRange;
                false
            }
        }
    }

    fn resize_to(&mut self, size: usize) -> bool {
        if !self.reserve(size) {
            return false;
        }
        if size < self.size {
            self.data[size..self.size].fill(0);
        }
        self.size = size;
        self.position = self.position.min(size);
        true
    }
}

impl Stream for MemoryStream {
    fn type_name(&self) -> &'static str {
        "memory"
    }

    fn access_flags(&self) -> AccessFlags {
        if self.open {
            AccessFlags::READ_WRITE
        } else {
            AccessFlags::empty()
        }
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn close(&mut self) -> bool {
        self.data = Vec::new();
        self.size = 0;
        self.position = 0;
        self.open = false;
        true
    }

    fn size(&self) -> Option<u64> {
        Some(self.size as u64)
    }

    fn set_size(&mut self, size: u64) -> bool {
        match usize::try_from(size) {
            Ok(size) => self.resize_to(size),
            Err(_) => false,
        }
    }

    fn position(&self, kind: PositionType) -> i64 {
        relative_position(kind, self.position as u64, self.size as u64)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
        let target = absolute_position(position, kind, self.position as u64, self.size as u64);
        let Ok(target) = usize::try_from(target) else {
            self.state = StreamState::OutOfRange;
            return false;
        };
        if target > self.size && !self.resize_to(target) {
            return false;
        }
        self.position = target;
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.open {
            self.state = StreamState::NotOpen;
            return None;
        }
        let n = buf.len().min(self.size - self.position);
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Some(n)
    }

    fn write(&mut self, data: &[u8]) -> bool {
        if !self.open {
            self.state = StreamState::NotOpen;
            return false;
        }
        let end = self.position + data.len();
        if !self.reserve(end) {
            return false;
        }
        self.data[self.position..end].copy_from_slice(data);
        self.position = end;
        self.size = self.size.max(end);
        true
    }

    fn flush(&mut self) -> bool {
        true
    }
}

/// A stream over a caller-provided buffer that never grows.
///
/// The size may be changed anywhere within the buffer's length.
#[derive(Debug)]
pub struct FixedMemoryStream<'a> {
    buf: &'a mut [u8],
    size: usize,
    position: usize,
    state: StreamState,
}

impl<'a> FixedMemoryStream<'a> {
    /// A stream whose size is the whole buffer.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let size = buf.len();
        Self {
            buf,
            size,
            position: 0,
            state: StreamState::Ok,
        }
    }

    /// A stream that starts out empty and can be written up to the buffer's length.
    pub fn empty(buf: &'a mut [u8]) -> Self {
        Self {
            size: 0,
            ..Self::new(buf)
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The contents up to the logical size.
    pub fn data(&self) -> &[u8] {
        &self.buf[..self.size]
    }
}

impl Stream for FixedMemoryStream<'_> {
    fn type_name(&self) -> &'static str {
        "fixed-memory"
    }

    fn access_flags(&self) -> AccessFlags {
        AccessFlags::READ_WRITE
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn close(&mut self) -> bool {
        true
    }

    fn size(&self) -> Option<u64> {
        Some(self.size as u64)
    }

    fn set_size(&mut self, size: u64) -> bool {
        match usize::try_from(size) {
            Ok(size) if size <= self.buf.len() => {
                self.size = size;
                self.position = self.position.min(size);
                true
            }
            _ => {
                self.state = StreamState::OutOfRange;
                false
            }
        }
    }

    fn position(&self, kind: PositionType) -> i64 {
        relative_position(kind, self.position as u64, self.size as u64)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
        let target = absolute_position(position, kind, self.position as u64, self.size as u64);
        match usize::try_from(target) {
            Ok(target) if target <= self.size => {
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
        let n = buf.len().min(self.size - self.position);
        buf[..n].copy_from_slice(&self.buf[self.position..self.position + n]);
        self.position += n;
        Some(n)
    }

    fn write(&mut self, data: &[u8]) -> bool {
        let end = self.position + data.len();
        if end > self.buf.len() {
            self.state = StreamState::OutOfRange;
            return false;
        }
        self.buf[self.position..end].copy_from_slice(data);
        self.position = end;
        self.size = self.size.max(end);
        true
    }

    fn flush(&mut self) -> bool {
        true
    }
}
