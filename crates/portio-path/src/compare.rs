//! Component-wise comparison and relative path computation.
//!
//! The first operand is segmented by scanning forward from its start and the
//! second by scanning backward from its end. The two component lists are then
//! paired from the root outward. For well-formed paths both scans agree, so
//! the walk finds the longest run of leading components the paths share.

use std::cmp::Ordering;

use crate::components::{
    components, components_reverse, get_local_root, is_relative, is_sep, SEPARATOR,
};
use crate::ops::join;

/// Compares two path spans character by character.
///
/// `/` and `\` compare equal. When one span is a prefix of the other, the
/// longer span is greater.
pub fn compare_spans(a: &str, b: &str) -> Ordering {
    let fold = |c: u8| if is_sep(c) { b'/' } else { c };
    let a = a.bytes().map(fold);
    let b = b.bytes().map(fold);
    a.cmp(b)
}

fn strip_separator(component: &str) -> &str {
    match component.as_bytes().last() {
        Some(&c) if is_sep(c) => &component[..component.len() - 1],
        _ => component,
    }
}

fn compare_components(a: &str, b: &str) -> Ordering {
    compare_spans(strip_separator(a), strip_separator(b))
}

/// Number of leading components `a` and `b` have in common.
fn common_components(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .zip(b.iter())
        .take_while(|(x, y)| compare_components(x, y) == Ordering::Equal)
        .count()
}

/// Compares two paths component by component.
///
/// Returns the ordering of the first pair of components that differ. If every
/// component of the shorter path matches, the paths compare equal, so a
/// directory compares equal to anything beneath it.
pub fn compare(a: &str, b: &str) -> Ordering {
    let b_parts = components_reverse(b);
    components(a)
        .zip(b_parts.iter())
        .map(|(x, y)| compare_components(x, y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// True if every component of `dir` matches the leading components of `sub`.
///
/// ```
/// use portio_path::is_subdirectory;
///
/// assert!(is_subdirectory("/a/b/", "/a/b/c/d"));
/// assert!(!is_subdirectory("/a/b/", "/a/c/"));
/// ```
pub fn is_subdirectory(dir: &str, sub: &str) -> bool {
    let dir_parts: Vec<&str> = components(dir).collect();
    let sub_parts = components_reverse(sub);
    common_components(&dir_parts, &sub_parts) == dir_parts.len()
}

/// Computes the path that leads from directory `source` to `target`.
///
/// The shared leading components are dropped, one `..` is emitted for every
/// component of `source` that remains, and the rest of `target` is joined on.
/// An absolute `target` that shares no root with `source` is returned as is.
/// Identical paths produce an empty string.
pub fn compute_relative(source: &str, target: &str) -> String {
    let source_parts: Vec<&str> = components(source).collect();
    let target_parts = components_reverse(target);
    let common = common_components(&source_parts, &target_parts);

    if common == source_parts.len() && common == target_parts.len() {
        return String::new();
    }

    if !is_relative(target) {
        let consumed: usize = source_parts[..common].iter().map(|c| c.len()).sum();
        if common == 0 || consumed < get_local_root(source) {
            return target.to_string();
        }
    }

    let mut result = String::new();
    for _ in common..source_parts.len() {
        result.push_str("..");
        result.push(SEPARATOR);
    }

    let rest_start: usize = target_parts[..common].iter().map(|c| c.len()).sum();
    join(&mut result, &target[rest_start..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_compare_spans() {
        assert_eq!(compare_spans("a/b", r"a\b"), Ordering::Equal);
        assert_eq!(compare_spans("abc", "abd"), Ordering::Less);
        assert_eq!(compare_spans("ab", "abc"), Ordering::Less);
        assert_eq!(compare_spans("abc", "ab"), Ordering::Greater);
        assert_eq!(compare_spans("", ""), Ordering::Equal);
    }

    #[test]
    fn test_compare_paths() {
        assert_eq!(compare("/a/b", "/a/b"), Ordering::Equal);
        assert_eq!(compare("/a/b/", r"\a\b\c"), Ordering::Equal);
        assert_eq!(compare("/a/b", "/a/c"), Ordering::Less);
        assert_eq!(compare("/a/z", "/a/c/d"), Ordering::Greater);
    }

    #[test]
    fn test_is_subdirectory() {
        assert!(is_subdirectory("/a/b/", "/a/b/c/d"));
        assert!(is_subdirectory("/a/b", "/a/b/c"));
        assert!(!is_subdirectory("/a/b/", "/a/c/"));
        assert!(!is_subdirectory("/a/b", "/a/bc"));
        assert!(!is_subdirectory("/a/b/c", "/a/b"));
        assert!(is_subdirectory(r"C:\work", r"C:\work\src\lib.rs"));
    }

    #[test]
    fn test_compute_relative_sibling() {
        let source = "/a/b/c/";
        let target = "/a/b/x/y";
        let relative = compute_relative(source, target);
        assert_eq!(relative, normalize("../x/y"));

        let mut rejoined = String::from(source);
        join(&mut rejoined, &relative);
        assert_eq!(rejoined, normalize(target));
    }

    #[test]
    fn test_compute_relative_edges() {
        assert_eq!(compute_relative("/a/b", "/a/b"), "");
        assert_eq!(compute_relative("/a/b/", "/a/b/c"), "c");
        assert_eq!(compute_relative("/a/b/c/", "/a/"), normalize("../../"));
        assert_eq!(compute_relative(r"C:\a\", r"D:\b"), r"D:\b");
        assert_eq!(compute_relative("", "x/y"), normalize("x/y"));
    }
}
