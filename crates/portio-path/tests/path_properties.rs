//! End-to-end checks of the documented path engine behavior.

use portio_path::{
    compute_relative, get_path_component_end, is_file_name_string_valid, is_relative,
    is_subdirectory, join, normalize, split, FileSystemType,
};

#[test]
fn test_relative_absolute_classification() {
    assert!(!is_relative("C:\\a"));
    assert!(!is_relative("\\\\server\\vol\\x"));
    assert!(is_relative("a/b"));
    assert!(is_relative(""));
}

#[test]
fn test_subdirectory_containment() {
    assert!(is_subdirectory("/a/b/", "/a/b/c/d"));
    assert!(!is_subdirectory("/a/b/", "/a/c/"));
}

#[test]
fn test_relative_round_trip() {
    let source = "/a/b/c/";
    let target = "/a/b/x/y";
    let relative = compute_relative(source, target);
    assert_eq!(relative.replace('\\', "/"), "../x/y");

    let mut back = source.to_string();
    join(&mut back, &relative);
    assert_eq!(back, normalize(target));
}

#[test]
fn test_reserved_name_rejection() {
    let fs = FileSystemType::Windows;
    assert!(!is_file_name_string_valid("con", fs));
    assert!(!is_file_name_string_valid("con.txt", fs));
    assert!(is_file_name_string_valid("controller", fs));
    assert!(!is_file_name_string_valid("...", fs));
    assert!(!is_file_name_string_valid("   ", fs));
}

#[test]
fn test_split_then_rejoin_normalizes_back() {
    for path in ["C:\\dir\\file.tar.gz", "/usr/lib/", "\\\\srv\\vol\\a.b", "x", ""] {
        let parts = split(path);
        let rejoined = format!(
            "{}{}{}{}",
            parts.drive, parts.directory, parts.file_name, parts.extension
        );
        assert_eq!(normalize(&rejoined), normalize(path));
    }
}

#[test]
fn test_ancestors_for_directory_creation() {
    let path = "/var/lib/portio/cache/";
    let ancestors: Vec<&str> = (0..5)
        .map(|i| &path[..get_path_component_end(path, i)])
        .collect();
    assert_eq!(
        ancestors,
        vec!["", "/var", "/var/lib", "/var/lib/portio", "/var/lib/portio/cache"]
    );
}
