//! Building and taking apart paths.

use crate::components::{
    ensure_trailing_separator, get_file_extension, get_file_name, get_local_root,
    get_path_component_start, is_relative, is_separator,
};
use crate::normalize::normalize;

/// Appends `suffix` to `dst`.
///
/// A relative suffix is joined with a separator. An absolute suffix replaces
/// `dst` entirely. An empty suffix leaves `dst` untouched.
///
/// ```
/// use portio_path::append;
///
/// let mut p = String::from("/usr");
/// append(&mut p, "bin");
/// assert!(p == "/usr/bin" || p == "/usr\\bin");
///
/// append(&mut p, "/etc");
/// assert_eq!(p, "/etc");
/// ```
pub fn append(dst: &mut String, suffix: &str) {
    if suffix.is_empty() {
        return;
    }
    if is_relative(suffix) {
        ensure_trailing_separator(dst);
    } else {
        dst.clear();
    }
    dst.push_str(suffix);
}

/// [`append`] followed by [`normalize`].
pub fn join(dst: &mut String, suffix: &str) {
    append(dst, suffix);
    *dst = normalize(dst);
}

/// The four consecutive parts of a path.
///
/// Concatenating the parts in order reproduces the original path exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitPath<'a> {
    /// Drive (`C:`) or UNC server (`\\server\`) prefix.
    pub drive: &'a str,
    /// Everything between the drive and the file name.
    pub directory: &'a str,
    /// File name without its extension.
    pub file_name: &'a str,
    /// Extension including the leading `.`.
    pub extension: &'a str,
}

impl SplitPath<'_> {
    /// Concatenates the parts back into one path.
    pub fn join(&self) -> String {
        let mut s = String::with_capacity(
            self.drive.len() + self.directory.len() + self.file_name.len() + self.extension.len(),
        );
        s.push_str(self.drive);
        s.push_str(self.directory);
        s.push_str(self.file_name);
        s.push_str(self.extension);
        s
    }
}

/// Splits a path at its local root, file name and extension boundaries.
pub fn split(path: &str) -> SplitPath<'_> {
    let root = get_local_root(path);
    let name = get_file_name(path).max(root);
    let ext = get_file_extension(path).max(name);
    SplitPath {
        drive: &path[..root],
        directory: &path[root..name],
        file_name: &path[name..ext],
        extension: &path[ext..],
    }
}

/// Removes the `index`-th component and everything after it.
///
/// Negative indices count from the end, so `-1` drops the last component.
pub fn truncate_component(path: &mut String, index: i32) {
    let start = get_path_component_start(path, index);
    path.truncate(start);
}

/// Rewrites every separator in `path` to `separator` without collapsing anything.
pub fn canonicalize(path: &mut String, separator: char) {
    if path.contains(|c| is_separator(c) && c != separator) {
        *path = path
            .chars()
            .map(|c| if is_separator(c) { separator } else { c })
            .collect();
    }
}
