//! Byte orders for typed stream access.

use std::fmt;
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};

/// The byte order of a value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Most significant byte first. The default wire order.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
    /// Whatever the running platform uses.
    Local,
}

macro_rules! endian_codec {
    ($($read:ident, $write:ident => $ty:ty;)*) => {
        impl Endian {
            $(
                pub(crate) fn $read(self, buf: &[u8]) -> $ty {
                    match self {
                        Endian::Big => BigEndian::$read(buf),
                        Endian::Little => LittleEndian::$read(buf),
                        Endian::Local => NativeEndian::$read(buf),
                    }
                }

                pub(crate) fn $write(self, buf: &mut [u8], value: $ty) {
                    match self {
                        Endian::Big => BigEndian::$write(buf, value),
                        Endian::Little => LittleEndian::$write(buf, value),
                        Endian::Local => NativeEndian::$write(buf, value),
                    }
                }
            )*
        }
    };
}

endian_codec! {
    read_u16, write_u16 => u16;
    read_u32, write_u32 => u32;
    read_u64, write_u64 => u64;
    read_f32, write_f32 => f32;
    read_f64, write_f64 => f64;
}

impl Endian {
    /// The platform's own order, as `Big` or `Little`.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Resolves `Local` to `Big` or `Little`.
    pub const fn resolve(self) -> Self {
        match self {
            Endian::Local => Self::native(),
            other => other,
        }
    }

    /// True when values in this order need no swizzle on this platform.
    pub fn is_native(self) -> bool {
        self.resolve() == Self::native()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Endian::Big => "big",
            Endian::Little => "little",
            Endian::Local => "local",
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized byte order name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown byte order {0:?}, expected big, little or local")]
pub struct ParseEndianError(String);

impl FromStr for Endian {
    type Err = ParseEndianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" => Ok(Endian::Big),
            "little" | "le" => Ok(Endian::Little),
            "local" | "native" => Ok(Endian::Local),
            _ => Err(ParseEndianError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layouts() {
        let mut buf = [0u8; 4];
        Endian::Big.write_u32(&mut buf, 0x1122_3344);
        assert_eq!(buf, [0x11, 0x22, 0x33, 0x44]);
        Endian::Little.write_u32(&mut buf, 0x1122_3344);
        assert_eq!(buf, [0x44, 0x33, 0x22, 0x11]);
        Endian::Local.write_u32(&mut buf, 0x1122_3344);
        assert_eq!(buf, 0x1122_3344u32.to_ne_bytes());
    }

    #[test]
    fn test_resolve_and_native() {
        assert_eq!(Endian::Local.resolve(), Endian::native());
        assert!(Endian::Local.is_native());
        assert_ne!(Endian::Big.is_native(), Endian::Little.is_native());
    }

    #[test]
    fn test_parse() {
        assert_eq!("BIG".parse::<Endian>(), Ok(Endian::Big));
        assert_eq!("le".parse::<Endian>(), Ok(Endian::Little));
        assert_eq!("native".parse::<Endian>(), Ok(Endian::Local));
        assert!("middle".parse::<Endian>().is_err());
        assert_eq!(Endian::Little.to_string(), "little");
    }
}
