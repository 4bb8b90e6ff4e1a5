//! Text-level path manipulation.
//!
//! This crate never touches a file system. It parses paths into components,
//! normalizes `.` and `..`, joins and splits paths, computes relative paths
//! and checks names against the rules of a given file system type.
//!
//! Both `/` and `\` are accepted as separators on every platform. Drive
//! prefixes (`C:`) and UNC prefixes (`\\server\volume`) are recognized
//! everywhere too, so Windows paths can be handled on Unix and the other way
//! around.
//!
//! # Example
//!
//! ```
//! use portio_path::{compute_relative, is_subdirectory, normalize_with, split};
//!
//! assert_eq!(normalize_with("/srv/www/../logs/./today", '/'), "/srv/logs/today");
//! assert!(is_subdirectory("/srv/", "/srv/logs/today"));
//!
//! let parts = split("/srv/logs/today.txt");
//! assert_eq!(parts.extension, ".txt");
//!
//! assert!(compute_relative("/srv/www/", "/srv/logs").ends_with("logs"));
//! ```

pub mod compare;
pub mod components;
pub mod error;
pub mod normalize;
pub mod ops;
pub mod validity;

pub use compare::{compare, compare_spans, compute_relative, is_subdirectory};
pub use components::{
    components, ensure_trailing_separator, file_extension, file_name, find_component_forward,
    find_component_reverse, get_file_extension, get_file_name, get_local_root,
    get_path_component_end, get_path_component_start, has_drive_prefix,
    has_trailing_separator, has_unc_prefix, is_absolute, is_relative, is_separator,
    strip_trailing_separator, Components, ALT_SEPARATOR, DRIVE_SEPARATOR, SEPARATOR,
};
pub use error::{PathError, Result};
pub use normalize::{normalize, normalize_into, normalize_with, simplify};
pub use ops::{append, canonicalize, join, split, truncate_component, SplitPath};
pub use validity::{
    is_directory_name_string_valid, is_file_name_char_valid, is_file_name_string_valid,
    is_file_path_string_valid, validate_file_path, FileSystemType,
};
