//! Per-file-system name and path validity rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::components::is_separator;
use crate::error::{PathError, Result};

/// Windows device names that cannot be used as a file or directory name,
/// with or without an extension.
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "clock$", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
    "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Characters Windows rejects inside a name. Separators are handled apart.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '*', '?'];

/// The file system whose naming rules a name or path is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSystemType {
    /// No particular file system; only `/` is rejected in names.
    None,
    /// Generic Windows rules.
    Windows,
    /// Generic Unix rules.
    Unix,
    Fat,
    Fat32,
    Fatx,
    Ntfs,
    Iso9660,
    Joliet,
    Udf,
    Udfx,
}

impl FileSystemType {
    /// Every supported file system type.
    pub const ALL: [FileSystemType; 11] = [
        FileSystemType::None,
        FileSystemType::Windows,
        FileSystemType::Unix,
        FileSystemType::Fat,
        FileSystemType::Fat32,
        FileSystemType::Fatx,
        FileSystemType::Ntfs,
        FileSystemType::Iso9660,
        FileSystemType::Joliet,
        FileSystemType::Udf,
        FileSystemType::Udfx,
    ];

    /// The rules of the platform this crate was compiled for.
    pub fn native() -> Self {
        if cfg!(windows) {
            FileSystemType::Windows
        } else {
            FileSystemType::Unix
        }
    }

    /// True for the file systems that share Windows naming restrictions.
    pub fn is_windows_family(self) -> bool {
        !matches!(
            self,
            FileSystemType::None
                | FileSystemType::Unix
                | FileSystemType::Iso9660
                | FileSystemType::Joliet
                | FileSystemType::Udf
        )
    }

    /// True for the file systems that reject Windows device names.
    pub fn has_reserved_names(self) -> bool {
        matches!(
            self,
            FileSystemType::Windows
                | FileSystemType::Fat
                | FileSystemType::Fat32
                | FileSystemType::Ntfs
        )
    }

    /// Longest permitted path, in characters.
    pub fn max_path_length(self) -> usize {
        match self {
            FileSystemType::Windows
            | FileSystemType::Fat
            | FileSystemType::Fat32
            | FileSystemType::Ntfs => 260,
            FileSystemType::Fatx => 240,
            FileSystemType::Iso9660 | FileSystemType::Joliet => 255,
            FileSystemType::None
            | FileSystemType::Unix
            | FileSystemType::Udf
            | FileSystemType::Udfx => 1024,
        }
    }

    /// Longest permitted single name, in characters.
    pub fn max_file_name_length(self) -> usize {
        match self {
            FileSystemType::Fatx => 42,
            FileSystemType::Iso9660 => 31,
            FileSystemType::Joliet => 64,
            _ => 255,
        }
    }

    /// Lowercase name, as accepted in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            FileSystemType::None => "none",
            FileSystemType::Windows => "windows",
            FileSystemType::Unix => "unix",
            FileSystemType::Fat => "fat",
            FileSystemType::Fat32 => "fat32",
            FileSystemType::Fatx => "fatx",
            FileSystemType::Ntfs => "ntfs",
            FileSystemType::Iso9660 => "iso9660",
            FileSystemType::Joliet => "joliet",
            FileSystemType::Udf => "udf",
            FileSystemType::Udfx => "udfx",
        }
    }
}

impl fmt::Display for FileSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileSystemType {
    type Err = PathError;

    /// Parses a lowercase name. `native` resolves to [`FileSystemType::native`].
    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_ascii_lowercase();
        if name == "native" {
            return Ok(Self::native());
        }
        Self::ALL
            .into_iter()
            .find(|fs| fs.as_str() == name)
            .ok_or_else(|| PathError::UnknownFileSystem(s.to_string()))
    }
}

/// True if `c` may appear in a file name on `fs`.
///
/// This alone does not make a name valid; see [`is_file_name_string_valid`].
pub fn is_file_name_char_valid(c: char, fs: FileSystemType) -> bool {
    if fs.is_windows_family() {
        !matches!(c, '<' | '>' | ':' | '\\' | '/' | '"' | '|' | '*' | '?')
    } else {
        c != '/'
    }
}

/// Lowercases, cuts at the first `.` and drops trailing spaces, the form in
/// which Windows matches device names.
fn device_stem(name: &str) -> String {
    let lower = name.to_lowercase();
    let stem = match lower.find('.') {
        Some(dot) => &lower[..dot],
        None => &lower[..],
    };
    stem.trim_end().to_string()
}

fn is_reserved_name(name: &str) -> bool {
    let stem = device_stem(name);
    RESERVED_NAMES.contains(&stem.as_str())
}

fn is_dots_and_spaces(name: &str) -> bool {
    name.chars().all(|c| c == '.' || c == ' ')
}

/// True if `name` is a valid file name on `fs`.
///
/// ```
/// use portio_path::{is_file_name_string_valid, FileSystemType};
///
/// assert!(!is_file_name_string_valid("con.txt", FileSystemType::Windows));
/// assert!(is_file_name_string_valid("controller", FileSystemType::Windows));
/// ```
pub fn is_file_name_string_valid(name: &str, fs: FileSystemType) -> bool {
    if name.chars().count() > fs.max_file_name_length() {
        return false;
    }
    if !name.chars().all(|c| is_file_name_char_valid(c, fs)) {
        return false;
    }
    if fs.has_reserved_names() && is_reserved_name(name) {
        return false;
    }
    !is_dots_and_spaces(name)
}

/// Directory names follow the same rules as file names.
pub fn is_directory_name_string_valid(name: &str, fs: FileSystemType) -> bool {
    is_file_name_string_valid(name, fs)
}

/// True if `path` is a valid full path on `fs`.
pub fn is_file_path_string_valid(path: &str, fs: FileSystemType) -> bool {
    validate_file_path(path, fs).is_ok()
}

/// Checks a full path and reports the first problem found.
///
/// Windows-family types need a `X:\` or `\\server\volume` root and accept
/// no `.` or `..` components. Other types accept relative paths and empty
/// components; `.` and `..` pass as long as no other rule rejects them.
pub fn validate_file_path(path: &str, fs: FileSystemType) -> Result<()> {
    let length = path.chars().count();
    let max = fs.max_path_length();
    if length == 0 || length > max {
        return Err(PathError::InvalidLength { length, max, fs });
    }

    if fs.is_windows_family() {
        let body = windows_root_len(path, fs).ok_or_else(|| PathError::MalformedRoot {
            path: path.to_string(),
        })?;
        let rest = &path[body..];
        let rest = rest.strip_suffix(is_separator).unwrap_or(rest);
        if rest.is_empty() {
            return Ok(());
        }
        for component in rest.split(is_separator) {
            check_component(component, fs, false)?;
        }
    } else {
        for component in path.split(is_separator) {
            if !component.is_empty() {
                check_component(component, fs, true)?;
            }
        }
    }
    Ok(())
}

/// Offset of the first component after a valid `\\server\volume\` or `X:\`
/// root, or `None` if the root is malformed.
fn windows_root_len(path: &str, fs: FileSystemType) -> Option<usize> {
    let b = path.as_bytes();
    if path.starts_with(r"\\") {
        let server_end = 2 + path[2..].find('\\')?;
        let volume_end = path[server_end + 1..]
            .find('\\')
            .map_or(path.len(), |i| server_end + 1 + i);
        let server = &path[2..server_end];
        let volume = &path[server_end + 1..volume_end];
        for part in [server, volume] {
            if part.is_empty()
                || part.contains(RESERVED_CHARS)
                || (fs.has_reserved_names() && is_reserved_name(part))
            {
                return None;
            }
        }
        Some((volume_end + 1).min(path.len()))
    } else if b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && b[2] == b'\\' {
        Some(3)
    } else {
        None
    }
}

/// Applies the file-name rules and the control character check to one
/// component. `allow_dots` lets `.` and `..` through.
fn check_component(component: &str, fs: FileSystemType, allow_dots: bool) -> Result<()> {
    let dots = allow_dots && (component == "." || component == "..");
    let ok = !component.is_empty()
        && component.chars().count() <= fs.max_file_name_length()
        && component.chars().all(|c| (c as u32) >= 32 && is_file_name_char_valid(c, fs))
        && !(fs.has_reserved_names() && is_reserved_name(component))
        && (dots || !is_dots_and_spaces(component));
    if ok {
        Ok(())
    } else {
        Err(PathError::InvalidComponent {
            component: component.to_string(),
            fs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_validity() {
        assert!(!is_file_name_char_valid('/', FileSystemType::Unix));
        assert!(is_file_name_char_valid(':', FileSystemType::Unix));
        assert!(is_file_name_char_valid('\\', FileSystemType::Iso9660));
        for c in ['<', '>', ':', '\\', '/', '"', '|', '*', '?'] {
            assert!(!is_file_name_char_valid(c, FileSystemType::Windows));
            assert!(!is_file_name_char_valid(c, FileSystemType::Udfx));
        }
        assert!(is_file_name_char_valid('a', FileSystemType::Ntfs));
    }

    #[test]
    fn test_parse_file_system_type() {
        for fs in FileSystemType::ALL {
            assert_eq!(fs.as_str().parse::<FileSystemType>(), Ok(fs));
        }
        assert_eq!("NTFS".parse::<FileSystemType>(), Ok(FileSystemType::Ntfs));
        assert_eq!("native".parse::<FileSystemType>(), Ok(FileSystemType::native()));
        assert!("hfs".parse::<FileSystemType>().is_err());
    }

    #[test]
    fn test_reserved_names() {
        let fs = FileSystemType::Windows;
        assert!(!is_file_name_string_valid("con", fs));
        assert!(!is_file_name_string_valid("con.txt", fs));
        assert!(!is_file_name_string_valid("CON", fs));
        assert!(!is_file_name_string_valid("lpt1 .log", fs));
        assert!(!is_file_name_string_valid("clock$", fs));
        assert!(is_file_name_string_valid("controller", fs));
        assert!(is_file_name_string_valid("com10", fs));

        assert!(is_file_name_string_valid("con", FileSystemType::Unix));
        assert!(is_file_name_string_valid("con", FileSystemType::Fatx));
    }

    #[test]
    fn test_dots_and_spaces_rejected() {
        for fs in FileSystemType::ALL {
            assert!(!is_file_name_string_valid("...", fs));
            assert!(!is_file_name_string_valid("   ", fs));
            assert!(!is_file_name_string_valid(". .", fs));
            assert!(!is_file_name_string_valid("", fs));
        }
    }

    #[test]
    fn test_name_length() {
        let long = "a".repeat(256);
        assert!(!is_file_name_string_valid(&long, FileSystemType::Ntfs));
        assert!(is_file_name_string_valid(&long[..255], FileSystemType::Ntfs));
        assert!(!is_directory_name_string_valid(&long[..43], FileSystemType::Fatx));
    }

    #[test]
    fn test_windows_drive_paths() {
        let fs = FileSystemType::Windows;
        assert!(is_file_path_string_valid(r"C:\", fs));
        assert!(is_file_path_string_valid(r"C:\dir\file.txt", fs));
        assert!(is_file_path_string_valid(r"C:\dir/sub\", fs));
        assert!(!is_file_path_string_valid("C:/dir", fs));
        assert!(!is_file_path_string_valid(r"dir\file", fs));
        assert!(!is_file_path_string_valid(r"C:\dir\\file", fs));
        assert!(!is_file_path_string_valid(r"C:\aux\file", fs));
        assert!(!is_file_path_string_valid(r"C:\dir\a?b", fs));
        assert!(!is_file_path_string_valid("C:\\dir\\a\u{7}b", fs));
        assert!(!is_file_path_string_valid(r"C:\dir\..", fs));
        assert!(!is_file_path_string_valid("", fs));
    }

    #[test]
    fn test_windows_unc_paths() {
        let fs = FileSystemType::Ntfs;
        assert!(is_file_path_string_valid(r"\\server\share\dir\file", fs));
        assert!(is_file_path_string_valid(r"\\server\share", fs));
        assert!(!is_file_path_string_valid(r"\\\share\dir", fs));
        assert!(!is_file_path_string_valid(r"\\server\\dir", fs));
        assert!(!is_file_path_string_valid(r"\\ser*ver\share\x", fs));
        assert!(!is_file_path_string_valid(r"\\server\nul.x\y", fs));
        assert!(matches!(
            validate_file_path(r"\\server", fs),
            Err(PathError::MalformedRoot { .. })
        ));
    }

    #[test]
    fn test_path_length_limits() {
        let long = format!(r"C:\{}", "a\\".repeat(200));
        assert!(matches!(
            validate_file_path(&long, FileSystemType::Windows),
            Err(PathError::InvalidLength { max: 260, .. })
        ));
        assert!(is_file_path_string_valid(&long, FileSystemType::Unix));
    }

    #[test]
    fn test_unix_paths() {
        let fs = FileSystemType::Unix;
        assert!(is_file_path_string_valid("/usr/local/bin", fs));
        assert!(is_file_path_string_valid("relative/a:b", fs));
        assert!(is_file_path_string_valid("../up/./here/", fs));
        assert!(!is_file_path_string_valid("/tmp/a\0b", fs));
        assert!(!is_file_path_string_valid("/tmp/a\u{7}b", fs));
        assert!(!is_file_path_string_valid("/tmp/...", fs));
    }

    #[test]
    fn test_windows_family_without_reserved_names() {
        for fs in [FileSystemType::Fatx, FileSystemType::Udfx] {
            assert!(!is_file_name_string_valid("a*b", fs));
            assert!(!is_file_path_string_valid(r"D:\dir\a*b", fs));
            assert!(!is_file_path_string_valid("D:\\dir\\a\u{7}b", fs));
            assert!(!is_file_path_string_valid(r"D:\dir\...", fs));
            assert!(!is_file_path_string_valid(r"dir\file", fs));
            assert!(is_file_path_string_valid(r"D:\dir\con.txt", fs));
            assert!(is_file_path_string_valid(r"\\server\nul\file", fs));
        }
    }
}
