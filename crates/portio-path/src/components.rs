//! Component boundary detection.
//!
//! Every function here works on byte offsets into a `&str`. All boundaries the
//! engine looks for are ASCII (`/`, `\`, `:` and `.`), so any offset returned is
//! always a valid `char` boundary and can be used to slice the input.

/// The separator normalized paths are written with on this platform.
#[cfg(windows)]
pub const SEPARATOR: char = '\\';
/// The separator normalized paths are written with on this platform.
#[cfg(not(windows))]
pub const SEPARATOR: char = '/';

/// The separator that is accepted on input but rewritten by normalization.
#[cfg(windows)]
pub const ALT_SEPARATOR: char = '/';
/// The separator that is accepted on input but rewritten by normalization.
#[cfg(not(windows))]
pub const ALT_SEPARATOR: char = '\\';

/// Separates a drive letter from the rest of the path (`C:`).
pub const DRIVE_SEPARATOR: char = ':';

const UNC_CHAR: u8 = b'\\';

/// Returns true for either recognized directory separator.
#[inline]
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[inline]
pub(crate) fn is_sep(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

/// True if the path starts with the two backslashes of a UNC prefix.
///
/// UNC prefixes are only recognized with `\`, never with `/`.
pub fn has_unc_prefix(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() >= 2 && b[0] == UNC_CHAR && b[1] == UNC_CHAR
}

/// True if the path starts with a drive letter followed by `:`.
pub fn has_drive_prefix(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

/// Returns true if the path is relative.
///
/// The empty path is relative. A path beginning with a drive prefix or with
/// either separator (which covers both rooted and UNC paths) is absolute.
pub fn is_relative(path: &str) -> bool {
    if path.is_empty() {
        return true;
    }
    if has_drive_prefix(path) {
        return false;
    }
    !is_sep(path.as_bytes()[0])
}

/// Negation of [`is_relative`].
pub fn is_absolute(path: &str) -> bool {
    !is_relative(path)
}

/// Returns the offset just past the component that starts at `from`.
///
/// A UNC double separator at `from` is skipped first. The scan then stops
/// right after a drive separator, or after the next directory separator, which
/// is included in the component.
pub fn find_component_forward(path: &str, from: usize) -> usize {
    let b = path.as_bytes();
    let last = b.len();
    let mut i = from.min(last);

    if i + 1 < last && b[i] == UNC_CHAR && b[i + 1] == UNC_CHAR {
        i += 2;
    }

    while i < last && !is_sep(b[i]) {
        if b[i] == b':' {
            i += 1;
            break;
        }
        i += 1;
    }

    if i < last && is_sep(b[i]) {
        i += 1;
    }
    i
}

/// Returns the start of the last component of `path[..end]`.
///
/// One trailing separator and one drive separator are stepped over before the
/// name itself. When the only thing left in front of the component is a UNC
/// prefix, the prefix belongs to it and `0` is returned.
pub fn find_component_reverse(path: &str, end: usize) -> usize {
    let b = path.as_bytes();
    let mut last = end.min(b.len());

    if last > 0 && is_sep(b[last - 1]) {
        last -= 1;
    }
    if last > 0 && b[last - 1] == b':' {
        last -= 1;
    }
    while last > 0 && !is_sep(b[last - 1]) && b[last - 1] != b':' {
        last -= 1;
    }
    if last == 2 && is_sep(b[0]) && is_sep(b[1]) {
        last = 0;
    }
    last
}

/// Offset where the `index`-th component starts.
///
/// Non-negative indices count from the front: `0` is the start of the path.
/// Negative indices count from the back: `-1` is the start of the last
/// component.
pub fn get_path_component_start(path: &str, index: i32) -> usize {
    let len = path.len();
    if index >= 0 {
        let mut first = 0;
        let mut n = index;
        while first < len && n > 0 {
            first = find_component_forward(path, first);
            n -= 1;
        }
        first
    } else {
        let mut last = len;
        let mut n = index;
        while last > 0 && n < 0 {
            last = find_component_reverse(path, last);
            n += 1;
        }
        last
    }
}

/// Offset where the `index`-th component ends, excluding its separator.
///
/// `get_path_component_end(p, 0)` is the end of the first component, so
/// `&p[..end]` names the top-most ancestor. `-1` is the end of the path.
pub fn get_path_component_end(path: &str, index: i32) -> usize {
    let b = path.as_bytes();
    let len = b.len();
    if index >= 0 {
        let mut n = index + 1;
        let mut result = 0;
        while result < len && n > 0 {
            result = find_component_forward(path, result);
            n -= 1;
        }
        if n == 0 && result > 0 && is_sep(b[result - 1]) {
            result -= 1;
        }
        result
    } else {
        let mut n = index + 1;
        let mut result = len;
        while result > 0 && n < 0 {
            result = find_component_reverse(path, result);
            n += 1;
        }
        if result > 0 && is_sep(b[result - 1]) {
            result -= 1;
        }
        result
    }
}

/// Offset of the file name, or `path.len()` if there is none.
///
/// A path ending in a separator names a directory and has no file name. The
/// server of a bare UNC prefix (`\\server`) is not a file name either.
pub fn get_file_name(path: &str) -> usize {
    let b = path.as_bytes();
    let last = b.len();
    if last > 0 && is_sep(b[last - 1]) {
        return last;
    }

    let mut fname = last;
    while fname > 0 && !is_sep(b[fname - 1]) && b[fname - 1] != b':' {
        fname -= 1;
    }

    if fname == 2 && has_unc_prefix(path) {
        return last;
    }
    fname
}

/// Offset of the extension (including its `.`), or `path.len()` if there is none.
pub fn get_file_extension(path: &str) -> usize {
    let b = path.as_bytes();
    let last = b.len();
    if last > 0 && is_sep(b[last - 1]) {
        return last;
    }

    let first = if has_unc_prefix(path) {
        find_component_forward(path, 0)
    } else {
        0
    };

    for i in (first..last).rev() {
        if is_sep(b[i]) || b[i] == b':' {
            break;
        }
        if b[i] == b'.' {
            return i;
        }
    }
    last
}

/// Offset where the local, machine-independent part of the path begins.
///
/// This is just past `C:` for drive paths, just past `\\server\` for UNC
/// paths, and `0` for everything else.
pub fn get_local_root(path: &str) -> usize {
    if has_drive_prefix(path) {
        return 2;
    }
    if has_unc_prefix(path) {
        return get_path_component_start(path, 1);
    }
    0
}

/// The file-name slice of `path`. Empty for directory paths.
pub fn file_name(path: &str) -> &str {
    &path[get_file_name(path)..]
}

/// The extension slice of `path`, including the leading `.`.
pub fn file_extension(path: &str) -> &str {
    &path[get_file_extension(path)..]
}

/// True if the path ends with either separator.
pub fn has_trailing_separator(path: &str) -> bool {
    path.as_bytes().last().is_some_and(|&b| is_sep(b))
}

/// Appends the canonical separator unless the path already ends with one.
///
/// An empty path stays empty.
pub fn ensure_trailing_separator(path: &mut String) {
    if !path.is_empty() && !has_trailing_separator(path) {
        path.push(SEPARATOR);
    }
}

/// Removes a single trailing separator, if present.
pub fn strip_trailing_separator(path: &mut String) {
    if has_trailing_separator(path) {
        path.pop();
    }
}

/// Iterator over the components of a path, front to back.
///
/// Each item includes its trailing separator, so concatenating the items
/// reproduces the path exactly.
#[derive(Debug, Clone)]
pub struct Components<'a> {
    path: &'a str,
    pos: usize,
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.path.len() {
            return None;
        }
        let start = self.pos;
        self.pos = find_component_forward(self.path, start);
        Some(&self.path[start..self.pos])
    }
}

/// Returns an iterator over the components of `path`.
pub fn components(path: &str) -> Components<'_> {
    Components { path, pos: 0 }
}

/// Components of `path` collected by scanning backward from the end, returned
/// in front-to-back order.
pub(crate) fn components_reverse(path: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut end = path.len();
    while end > 0 {
        let start = find_component_reverse(path, end);
        spans.push(&path[start..end]);
        end = start;
    }
    spans.reverse();
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_detection() {
        assert!(has_unc_prefix(r"\\server\vol"));
        assert!(!has_unc_prefix("//server/vol"));
        assert!(has_drive_prefix(r"C:\a"));
        assert!(has_drive_prefix("c:"));
        assert!(!has_drive_prefix("1:"));
        assert!(!has_drive_prefix("/a:b"));
    }

    #[test]
    fn test_is_relative() {
        assert!(!is_relative(r"C:\a"));
        assert!(!is_relative(r"\\server\vol\x"));
        assert!(!is_relative("/usr"));
        assert!(is_relative("a/b"));
        assert!(is_relative(""));
        assert!(is_absolute("/"));
    }

    #[test]
    fn test_find_component_forward() {
        let p = "/a/bc/d";
        assert_eq!(find_component_forward(p, 0), 1);
        assert_eq!(find_component_forward(p, 1), 3);
        assert_eq!(find_component_forward(p, 3), 6);
        assert_eq!(find_component_forward(p, 6), 7);
        assert_eq!(find_component_forward(p, 7), 7);

        assert_eq!(find_component_forward(r"C:\a", 0), 3);
        assert_eq!(find_component_forward("C:a", 0), 2);
        assert_eq!(find_component_forward(r"\\srv\vol", 0), 6);
    }

    #[test]
    fn test_find_component_reverse() {
        let p = "/a/bc/d";
        assert_eq!(find_component_reverse(p, 7), 6);
        assert_eq!(find_component_reverse(p, 6), 3);
        assert_eq!(find_component_reverse(p, 3), 1);
        assert_eq!(find_component_reverse(p, 1), 0);

        assert_eq!(find_component_reverse(r"C:\a", 3), 0);
        assert_eq!(find_component_reverse(r"\\srv\vol", 6), 0);
        assert_eq!(find_component_reverse(r"\\srv", 5), 0);
    }

    #[test]
    fn test_component_start_and_end() {
        let p = "/usr/local/bin/";
        assert_eq!(get_path_component_start(p, 0), 0);
        assert_eq!(get_path_component_start(p, 1), 1);
        assert_eq!(get_path_component_start(p, 2), 5);
        assert_eq!(get_path_component_start(p, -1), 11);
        assert_eq!(get_path_component_start(p, -2), 5);

        assert_eq!(&p[..get_path_component_end(p, 1)], "/usr");
        assert_eq!(&p[..get_path_component_end(p, 2)], "/usr/local");
        assert_eq!(&p[..get_path_component_end(p, -1)], "/usr/local/bin");
        assert_eq!(&p[..get_path_component_end(p, -2)], "/usr/local");
    }

    #[test]
    fn test_file_name_and_extension() {
        assert_eq!(file_name("/a/b/file.txt"), "file.txt");
        assert_eq!(file_extension("/a/b/file.txt"), ".txt");
        assert_eq!(file_name("/a/b/"), "");
        assert_eq!(file_extension("/a/b/"), "");
        assert_eq!(file_name("C:file"), "file");
        assert_eq!(file_extension("a.b/c"), "");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_name(r"\\server"), "");
        assert_eq!(file_extension(r"\\server.corp"), "");
        assert_eq!(file_name(r"\\server\share"), "share");
    }

    #[test]
    fn test_local_root() {
        assert_eq!(get_local_root(r"C:\dir"), 2);
        assert_eq!(get_local_root(r"\\server\vol\x"), 9);
        assert_eq!(get_local_root("/usr"), 0);
        assert_eq!(get_local_root(""), 0);
    }

    #[test]
    fn test_trailing_separator_helpers() {
        let mut p = String::from("a/b");
        assert!(!has_trailing_separator(&p));
        ensure_trailing_separator(&mut p);
        assert!(has_trailing_separator(&p));
        ensure_trailing_separator(&mut p);
        assert_eq!(p.len(), 4);
        strip_trailing_separator(&mut p);
        assert_eq!(p, "a/b");

        let mut empty = String::new();
        ensure_trailing_separator(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_components_iterator() {
        let parts: Vec<&str> = components(r"C:\dir/sub\file").collect();
        assert_eq!(parts, vec![r"C:\", "dir/", r"sub\", "file"]);
        assert_eq!(components_reverse(r"C:\dir/sub\file"), parts);
        assert_eq!(components("").count(), 0);
    }
}
