//! Typed reads and writes over any [`Stream`].
//!
//! Every multi-byte value is transferred in an explicit [`Endian`] order.
//! Floats travel as their IEEE-754 bit patterns, swizzled like integers of
//! the same width.
//!
//! Strings use a length-prefixed wire format: a 4-byte unsigned count of code
//! units in the chosen order, followed by the raw code units. No terminator
//! is stored.
//!
//! # Example
//!
//! ```
//! use portio_stream::{adapter, Endian, MemoryStream, Stream};
//!
//! let mut s = MemoryStream::new();
//! adapter::write_u32(&mut s, 0x1122_3344, Endian::Big).unwrap();
//! adapter::write_string(&mut s, "hello", Endian::Big).unwrap();
//!
//! s.seek_to(0);
//! assert_eq!(adapter::read_u32(&mut s, Endian::Big).unwrap(), 0x1122_3344);
//! assert_eq!(adapter::read_string(&mut s, Endian::Big).unwrap(), "hello");
//! ```

use tracing::trace;

use crate::endian::Endian;
use crate::error::{Result, StreamError};
use crate::stream::{PositionType, Stream};

/// Default size of the intermediate buffer used by [`copy_stream`].
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 2048;

/// Largest step in which a string body is read.
const PAYLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Line terminator written by [`write_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnd {
    /// No terminator.
    None,
    /// The platform's own terminator.
    #[default]
    Auto,
    /// `\n`.
    Newline,
    /// `\r\n`.
    Windows,
}

impl LineEnd {
    /// The bytes this terminator writes.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnd::None => b"",
            LineEnd::Auto if cfg!(windows) => b"\r\n",
            LineEnd::Auto | LineEnd::Newline => b"\n",
            LineEnd::Windows => b"\r\n",
        }
    }
}

/// Fills `buf` completely or fails.
pub fn read_exact<S: Stream + ?Sized>(stream: &mut S, buf: &mut [u8]) -> Result<()> {
    match stream.read(buf) {
        Some(n) if n == buf.len() => Ok(()),
        Some(n) => Err(StreamError::ShortRead {
            expected: buf.len(),
            actual: n,
        }),
        None => Err(StreamError::ReadFailed {
            state: stream.state(),
        }),
    }
}

/// Writes all of `data` or fails.
pub fn write_all<S: Stream + ?Sized>(stream: &mut S, data: &[u8]) -> Result<()> {
    if stream.write(data) {
        Ok(())
    } else {
        Err(StreamError::WriteFailed {
            state: stream.state(),
        })
    }
}

fn seek<S: Stream + ?Sized>(stream: &mut S, position: u64) -> Result<()> {
    if stream.seek_to(position) {
        Ok(())
    } else {
        Err(StreamError::SeekFailed {
            position,
            state: stream.state(),
        })
    }
}

/// Reads one byte as a boolean. Any non-zero byte is `true`.
pub fn read_bool8<S: Stream + ?Sized>(stream: &mut S) -> Result<bool> {
    Ok(read_u8(stream)? != 0)
}

/// Writes `1` or `0`.
pub fn write_bool8<S: Stream + ?Sized>(stream: &mut S, value: bool) -> Result<()> {
    write_u8(stream, u8::from(value))
}

pub fn read_u8<S: Stream + ?Sized>(stream: &mut S) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(stream, &mut buf)?;
    Ok(buf[0])
}

pub fn write_u8<S: Stream + ?Sized>(stream: &mut S, value: u8) -> Result<()> {
    write_all(stream, &[value])
}

pub fn read_i8<S: Stream + ?Sized>(stream: &mut S) -> Result<i8> {
    Ok(read_u8(stream)? as i8)
}

pub fn write_i8<S: Stream + ?Sized>(stream: &mut S, value: i8) -> Result<()> {
    write_u8(stream, value as u8)
}

/// Reads `out.len()` bytes.
pub fn read_u8_array<S: Stream + ?Sized>(stream: &mut S, out: &mut [u8]) -> Result<()> {
    read_exact(stream, out)
}

pub fn write_u8_array<S: Stream + ?Sized>(stream: &mut S, values: &[u8]) -> Result<()> {
    write_all(stream, values)
}

macro_rules! scalar_io {
    ($($ty:ty, $size:expr, $read:ident, $write:ident, $read_array:ident, $write_array:ident, $codec_read:ident, $codec_write:ident;)*) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "` in `endian` order.")]
            pub fn $read<S: Stream + ?Sized>(stream: &mut S, endian: Endian) -> Result<$ty> {
                let mut buf = [0u8; $size];
                read_exact(stream, &mut buf)?;
                Ok(endian.$codec_read(&buf) as $ty)
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` in `endian` order.")]
            pub fn $write<S: Stream + ?Sized>(stream: &mut S, value: $ty, endian: Endian) -> Result<()> {
                let mut buf = [0u8; $size];
                endian.$codec_write(&mut buf, value as _);
                write_all(stream, &buf)
            }

            #[doc = concat!("Fills `out` with `", stringify!($ty), "` values in `endian` order.")]
            pub fn $read_array<S: Stream + ?Sized>(stream: &mut S, out: &mut [$ty], endian: Endian) -> Result<()> {
                let mut buf = vec![0u8; out.len() * $size];
                read_exact(stream, &mut buf)?;
                for (value, chunk) in out.iter_mut().zip(buf.chunks_exact($size)) {
                    *value = endian.$codec_read(chunk) as $ty;
                }
                Ok(())
            }

            #[doc = concat!("Writes every `", stringify!($ty), "` of `values` in `endian` order.")]
            pub fn $write_array<S: Stream + ?Sized>(stream: &mut S, values: &[$ty], endian: Endian) -> Result<()> {
                let mut buf = vec![0u8; values.len() * $size];
                for (value, chunk) in values.iter().zip(buf.chunks_exact_mut($size)) {
                    endian.$codec_write(chunk, *value as _);
                }
                write_all(stream, &buf)
            }
        )*
    };
}

scalar_io! {
    u16, 2, read_u16, write_u16, read_u16_array, write_u16_array, read_u16, write_u16;
    i16, 2, read_i16, write_i16, read_i16_array, write_i16_array, read_u16, write_u16;
    u32, 4, read_u32, write_u32, read_u32_array, write_u32_array, read_u32, write_u32;
    i32, 4, read_i32, write_i32, read_i32_array, write_i32_array, read_u32, write_u32;
    u64, 8, read_u64, write_u64, read_u64_array, write_u64_array, read_u64, write_u64;
    i64, 8, read_i64, write_i64, read_i64_array, write_i64_array, read_u64, write_u64;
    f32, 4, read_f32, write_f32, read_f32_array, write_f32_array, read_f32, write_f32;
    f64, 8, read_f64, write_f64, read_f64_array, write_f64_array, read_f64, write_f64;
}

fn string_length(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| StreamError::StringTooLong { length })
}

/// Writes `value` as a 4-byte length followed by its UTF-8 bytes.
pub fn write_string<S: Stream + ?Sized>(stream: &mut S, value: &str, endian: Endian) -> Result<()> {
    write_u32(stream, string_length(value.len())?, endian)?;
    write_all(stream, value.as_bytes())
}

/// Reads the length of the next string without consuming it.
pub fn peek_string_length<S: Stream + ?Sized>(stream: &mut S, endian: Endian) -> Result<u32> {
    let start = stream.tell();
    let length = read_u32(stream, endian);
    seek(stream, start)?;
    length
}

/// Reads a length-prefixed string into `out`, the fill half of a
/// measure-then-fill pair with [`peek_string_length`].
///
/// Copies at most `out.len() - 1` bytes and writes a `0` after them. The whole
/// string is consumed regardless, and its wire length is returned. An empty
/// `out` receives nothing.
pub fn read_string_into<S: Stream + ?Sized>(
    stream: &mut S,
    out: &mut [u8],
    endian: Endian,
) -> Result<usize> {
    let start = stream.tell();
    let length = read_u32(stream, endian)? as usize;
    if let Some(room) = out.len().checked_sub(1) {
        let n = length.min(room);
        read_exact(stream, &mut out[..n])?;
        out[n] = 0;
    }
    seek(stream, start + 4 + length as u64)?;
    Ok(length)
}

/// Reads `length` bytes of a string body.
///
/// The length comes off the wire, so it is checked against what the stream
/// reports as available, and the buffer grows only as bytes arrive.
fn read_payload<S: Stream + ?Sized>(stream: &mut S, length: usize) -> Result<Vec<u8>> {
    if let Some(available) = stream.available() {
        if length as u64 > available {
            return Err(StreamError::ShortRead {
                expected: length,
                actual: usize::try_from(available).unwrap_or(usize::MAX),
            });
        }
    }
    let mut buf = Vec::with_capacity(length.min(PAYLOAD_CHUNK_SIZE));
    while buf.len() < length {
        let start = buf.len();
        let want = (length - start).min(PAYLOAD_CHUNK_SIZE);
        buf.resize(start + want, 0);
        let got = stream
            .read(&mut buf[start..])
            .ok_or_else(|| StreamError::ReadFailed {
                state: stream.state(),
            })?;
        if got < want {
            return Err(StreamError::ShortRead {
                expected: length,
                actual: start + got,
            });
        }
    }
    Ok(buf)
}

/// Reads a length-prefixed UTF-8 string.
pub fn read_string<S: Stream + ?Sized>(stream: &mut S, endian: Endian) -> Result<String> {
    let length = read_u32(stream, endian)? as usize;
    let buf = read_payload(stream, length)?;
    String::from_utf8(buf).map_err(|e| StreamError::InvalidText(e.to_string()))
}

/// Writes `value` as a 4-byte count of UTF-16 code units followed by the
/// code units, each in `endian` order.
pub fn write_string16<S: Stream + ?Sized>(stream: &mut S, value: &str, endian: Endian) -> Result<()> {
    let units: Vec<u16> = value.encode_utf16().collect();
    write_u32(stream, string_length(units.len())?, endian)?;
    write_u16_array(stream, &units, endian)
}

/// Reads a string written by [`write_string16`].
pub fn read_string16<S: Stream + ?Sized>(stream: &mut S, endian: Endian) -> Result<String> {
    let length = read_u32(stream, endian)? as usize;
    let bytes = read_payload(stream, length.saturating_mul(2))?;
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| endian.read_u16(c)).collect();
    String::from_utf16(&units).map_err(|e| StreamError::InvalidText(e.to_string()))
}

/// Reads one line, consuming its `\n` or `\r\n` terminator.
///
/// Returns `None` when the stream has no more data. A lone `\r` also ends
/// the line; the byte after it is given back by seeking one byte backwards.
pub fn read_line<S: Stream + ?Sized>(stream: &mut S) -> Result<Option<String>> {
    let mut line = Vec::new();
    let mut consumed = false;
    loop {
        let mut byte = [0u8; 1];
        let n = stream.read(&mut byte).ok_or_else(|| StreamError::ReadFailed {
            state: stream.state(),
        })?;
        if n == 0 {
            break;
        }
        consumed = true;
        match byte[0] {
            b'\n' => break,
            b'\r' => {
                let n = stream.read(&mut byte).ok_or_else(|| StreamError::ReadFailed {
                    state: stream.state(),
                })?;
                if n == 1 && byte[0] != b'\n' && !stream.set_position(-1, PositionType::Current) {
                    return Err(StreamError::SeekFailed {
                        position: stream.tell().saturating_sub(1),
                        state: stream.state(),
                    });
                }
                break;
            }
            b => line.push(b),
        }
    }
    if !consumed {
        return Ok(None);
    }
    String::from_utf8(line)
        .map(Some)
        .map_err(|e| StreamError::InvalidText(e.to_string()))
}

/// Length of the next line without its terminator, leaving the stream where
/// it was. `None` at the end of the data.
pub fn peek_line_length<S: Stream + ?Sized>(stream: &mut S) -> Result<Option<usize>> {
    let start = stream.tell();
    let line = read_line(stream);
    seek(stream, start)?;
    Ok(line?.map(|l| l.len()))
}

/// Writes `line` followed by the chosen terminator.
pub fn write_line<S: Stream + ?Sized>(stream: &mut S, line: &str, end: LineEnd) -> Result<()> {
    write_all(stream, line.as_bytes())?;
    write_all(stream, end.as_bytes())
}

/// Copies bytes from `source` to `dest` through a buffer of `buffer_size`.
///
/// Copies `length` bytes, or everything left in `source` when `length` is
/// `None` or larger than what remains. Stops early if `source` runs dry.
/// Returns the number of bytes copied. On failure both streams stay where
/// the last successful transfer left them.
pub fn copy_stream<S, D>(
    source: &mut S,
    dest: &mut D,
    length: Option<u64>,
    buffer_size: usize,
) -> Result<u64>
where
    S: Stream + ?Sized,
    D: Stream + ?Sized,
{
    let available = source.available();
    let mut remaining = match (length, available) {
        (Some(n), Some(a)) => n.min(a),
        (Some(n), None) => n,
        (None, Some(a)) => a,
        (None, None) => u64::MAX,
    };
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut copied = 0u64;

    while remaining > 0 {
        let want = (buf.len() as u64).min(remaining) as usize;
        let n = source
            .read(&mut buf[..want])
            .ok_or_else(|| StreamError::ReadFailed {
                state: source.state(),
            })?;
        if n == 0 {
            break;
        }
        write_all(dest, &buf[..n])?;
        copied += n as u64;
        remaining -= n as u64;
    }
    trace!(copied, "copied stream");
    Ok(copied)
}
