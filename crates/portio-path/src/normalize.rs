//! `.` and `..` collapsing.
//!
//! Normalization is a single forward pass over the path bytes with a write
//! cursor that never overtakes the read cursor, so the result is never longer
//! than the input.

use crate::components::{find_component_forward, find_component_reverse, is_sep, SEPARATOR};
use crate::error::{PathError, Result};

/// Normalizes a path and rewrites every separator to [`SEPARATOR`].
///
/// `.` components are dropped, doubled separators are collapsed, and `..`
/// cancels the real component in front of it. A `..` that has nothing to
/// cancel (or would climb above a drive, root or UNC server) is kept as is.
///
/// ```
/// use portio_path::normalize_with;
///
/// assert_eq!(normalize_with("a/./b//../c", '/'), "a/c");
/// assert_eq!(normalize_with("../x", '/'), "../x");
/// ```
pub fn normalize(path: &str) -> String {
    normalize_with(path, SEPARATOR)
}

/// [`normalize`] with an explicit canonical separator.
pub fn normalize_with(path: &str, separator: char) -> String {
    let sep = canonical_byte(separator);
    collapse(path, Some(sep))
}

/// Like [`normalize`] but keeps each separator as written.
pub fn simplify(path: &str) -> String {
    collapse(path, None)
}

/// Normalizes into a caller-provided buffer.
///
/// Returns the number of bytes written. If `out` is too small nothing is
/// written and the error carries the size that is needed, so callers can
/// measure with an empty buffer and then fill.
pub fn normalize_into(path: &str, out: &mut [u8]) -> Result<usize> {
    let normalized = normalize(path);
    let required = normalized.len();
    if out.len() < required {
        return Err(PathError::CapacityExceeded {
            required,
            capacity: out.len(),
        });
    }
    out[..required].copy_from_slice(normalized.as_bytes());
    Ok(required)
}

fn canonical_byte(separator: char) -> u8 {
    if separator == '\\' {
        b'\\'
    } else {
        b'/'
    }
}

/// Length of the part of `out` that `..` must never remove.
fn root_len(out: &[u8]) -> usize {
    if out.len() >= 2 && out[0] == b'\\' && out[1] == b'\\' {
        return find_component_forward(as_str(out), 0);
    }
    if out.len() >= 2 && out[0].is_ascii_alphabetic() && out[1] == b':' {
        return if out.len() > 2 && is_sep(out[2]) { 3 } else { 2 };
    }
    if out.first().is_some_and(|&b| is_sep(b)) {
        return 1;
    }
    0
}

/// True if `name` (a component with its separator) can be cancelled by `..`.
fn is_cancellable(name: &[u8]) -> bool {
    let name = match name.last() {
        Some(&b) if is_sep(b) => &name[..name.len() - 1],
        _ => name,
    };
    !name.is_empty() && name != b".." && name.last() != Some(&b':')
}

fn as_str(bytes: &[u8]) -> &str {
    // Only ASCII bytes are ever inserted or removed, so every prefix we slice
    // at lies on a char boundary of valid UTF-8.
    std::str::from_utf8(bytes).unwrap_or_default()
}

fn collapse(path: &str, canonical: Option<u8>) -> String {
    let mut buf = path.as_bytes().to_vec();
    let last = buf.len();
    let mut first = 0;
    let mut out = 0;

    // A UNC prefix is copied as written; canonicalizing it would turn it into
    // an ordinary rooted path.
    if last >= 2 && buf[0] == b'\\' && buf[1] == b'\\' {
        first = 2;
        out = 2;
    }

    while first < last {
        if first + 1 < last && buf[first] == b'.' && is_sep(buf[first + 1]) {
            first += 2;
            while first < last && is_sep(buf[first]) {
                first += 1;
            }
            continue;
        }

        if first + 2 < last
            && buf[first] == b'.'
            && buf[first + 1] == b'.'
            && is_sep(buf[first + 2])
            && out > 0
        {
            let prev = find_component_reverse(as_str(&buf[..out]), out);
            if prev >= root_len(&buf[..out]) && is_cancellable(&buf[prev..out]) {
                out = prev;
                first += 3;
                while first < last && is_sep(buf[first]) {
                    first += 1;
                }
                continue;
            }
        }

        while first < last {
            let c = buf[first];
            first += 1;

            if is_sep(c) {
                buf[out] = canonical.unwrap_or(c);
                out += 1;
                while first < last && is_sep(buf[first]) {
                    first += 1;
                }
                break;
            } else if c == b':' {
                buf[out] = c;
                out += 1;
                if first >= last || !is_sep(buf[first]) {
                    break;
                }
            } else {
                buf[out] = c;
                out += 1;
            }
        }
    }

    buf.truncate(out);
    String::from_utf8(buf).unwrap_or_default()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_is_idempotent(
            path in r"([A-Za-z]:)?[/\\]?((\.|\.\.|[a-z]{1,4})[/\\]{1,2}){0,6}(\.\.|[a-z]{0,4})"
        ) {
            let once = normalize_with(&path, '/');
            let twice = normalize_with(&once, '/');
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalize_never_lengthens(path in r"[a-z./\\:]{0,24}") {
            prop_assert!(normalize(&path).len() <= path.len());
            prop_assert!(simplify(&path).len() <= path.len());
        }

        #[test]
        fn unc_paths_stay_unc(rest in r"[a-z]{1,4}(\\[a-z.]{1,4}){0,4}") {
            let path = format!(r"\\{rest}");
            prop_assert!(normalize_with(&path, '/').starts_with(r"\\"));
        }
    }
}
