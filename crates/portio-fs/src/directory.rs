//! Multi-level directory creation.

use std::io;

use portio_path::{components, get_path_component_end, has_drive_prefix, has_unc_prefix};
use tracing::debug;

use crate::file_system::FileSystem;

/// Create `path` and every missing ancestor, one level at a time.
///
/// Ancestors are found with [`get_path_component_end`], so both separators
/// and drive or UNC prefixes are handled. Existing directories are skipped
/// and the call is a no-op when `path` already is a directory. A file in the
/// way fails with `io::ErrorKind::AlreadyExists`.
pub fn create_directory_all<F: FileSystem + ?Sized>(fs: &F, path: &str) -> io::Result<()> {
    if fs.is_directory(path) {
        return Ok(());
    }

    let root_end = root_end(path);
    let count = components(path).count();
    for index in 0..count {
        let end = get_path_component_end(path, index as i32);
        if end <= root_end {
            continue;
        }
        let ancestor = &path[..end];
        if fs.is_directory(ancestor) {
            continue;
        }
        debug!(path = ancestor, "creating directory level");
        match fs.create_directory(ancestor) {
            Ok(()) => {}
            // Another creator got there first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && fs.is_directory(ancestor) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Create `path` unless it exists already.
///
/// Unlike [`create_directory_all`] the parent must exist.
pub fn ensure_directory_exists<F: FileSystem + ?Sized>(fs: &F, path: &str) -> io::Result<()> {
    if fs.is_directory(path) {
        return Ok(());
    }
    fs.create_directory(path)
}

/// End of the prefix that can never be created: the drive or the UNC share.
fn root_end(path: &str) -> usize {
    if has_unc_prefix(path) {
        get_path_component_end(path, 1)
    } else if has_drive_prefix(path) {
        2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFileSystem;

    #[test]
    fn test_creates_every_level() {
        let fs = MemoryFileSystem::new();
        create_directory_all(&fs, "/a/b/c/").unwrap();
        assert!(fs.is_directory("/a"));
        assert!(fs.is_directory("/a/b"));
        assert!(fs.is_directory("/a/b/c"));
    }

    #[test]
    fn test_existing_levels_are_skipped() {
        let fs = MemoryFileSystem::new();
        fs.create_directory("/a").unwrap();
        create_directory_all(&fs, r"\a\b").unwrap();
        assert!(fs.is_directory("/a/b"));

        create_directory_all(&fs, "/a/b").unwrap();
        assert_eq!(fs.entries(), vec!["/a".to_string(), "/a/b".to_string()]);
    }

    #[test]
    fn test_drive_and_unc_roots() {
        let fs = MemoryFileSystem::new();
        create_directory_all(&fs, r"C:\data\logs").unwrap();
        assert!(fs.is_directory("C:/data/logs"));

        create_directory_all(&fs, r"\\server\share\dir").unwrap();
        assert!(fs.is_directory(r"\\server\share\dir"));
        assert!(fs.is_directory(r"\\server/share/dir/"));
        let entries = fs.entries();
        assert!(entries.contains(&r"\\server\share\dir".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with(r"\\server/")));
    }

    #[test]
    fn test_file_in_the_way() {
        let fs = MemoryFileSystem::new();
        fs.create_file("/blocked").unwrap();
        let err = create_directory_all(&fs, "/blocked/sub").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_ensure_directory_exists() {
        let fs = MemoryFileSystem::new();
        ensure_directory_exists(&fs, "/once").unwrap();
        ensure_directory_exists(&fs, "/once").unwrap();
        assert!(ensure_directory_exists(&fs, "/missing/child").is_err());
    }
}
