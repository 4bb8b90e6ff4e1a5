//! Path engine commands: normalize, join, split, relative, is-subdir, validate.

use colored::*;
use portio_path::FileSystemType;
use serde::Serialize;

use crate::output::Report;

/// Separator written by `normalize` and `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SeparatorArg {
    /// The platform separator
    #[default]
    Native,
    /// Forward slash
    Slash,
    /// Backslash
    Backslash,
}

impl SeparatorArg {
    pub fn as_char(self) -> char {
        match self {
            SeparatorArg::Native => portio_path::SEPARATOR,
            SeparatorArg::Slash => '/',
            SeparatorArg::Backslash => '\\',
        }
    }
}

/// File system rules for `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileSystemArg {
    Native,
    None,
    Windows,
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

impl From<FileSystemArg> for FileSystemType {
    fn from(arg: FileSystemArg) -> Self {
        match arg {
            FileSystemArg::Native => FileSystemType::native(),
            FileSystemArg::None => FileSystemType::None,
            FileSystemArg::Windows => FileSystemType::Windows,
            FileSystemArg::Unix => FileSystemType::Unix,
            FileSystemArg::Fat => FileSystemType::Fat,
            FileSystemArg::Fat32 => FileSystemType::Fat32,
            FileSystemArg::Fatx => FileSystemType::Fatx,
            FileSystemArg::Ntfs => FileSystemType::Ntfs,
            FileSystemArg::Iso9660 => FileSystemType::Iso9660,
            FileSystemArg::Joliet => FileSystemType::Joliet,
            FileSystemArg::Udf => FileSystemType::Udf,
            FileSystemArg::Udfx => FileSystemType::Udfx,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PathResult {
    pub input: String,
    pub result: String,
}

impl Report for PathResult {
    fn print_human(&self) {
        println!("{}", self.result);
    }
}

pub fn normalize(path: &str, separator: SeparatorArg, keep_separators: bool) -> PathResult {
    let result = if keep_separators {
        portio_path::simplify(path)
    } else {
        portio_path::normalize_with(path, separator.as_char())
    };
    PathResult {
        input: path.to_string(),
        result,
    }
}

/// Joins `parts` onto `base` in order. Absolute parts replace what came before.
pub fn join(base: &str, parts: &[String], separator: SeparatorArg) -> PathResult {
    let mut joined = base.to_string();
    for part in parts {
        portio_path::append(&mut joined, part);
    }
    PathResult {
        input: base.to_string(),
        result: portio_path::normalize_with(&joined, separator.as_char()),
    }
}

#[derive(Debug, Serialize)]
pub struct SplitReport {
    pub path: String,
    pub drive: String,
    pub directory: String,
    pub file_name: String,
    pub extension: String,
}

impl Report for SplitReport {
    fn print_human(&self) {
        println!("{:<10} {}", "drive:".bold(), self.drive);
        println!("{:<10} {}", "directory:".bold(), self.directory);
        println!("{:<10} {}", "name:".bold(), self.file_name);
        println!("{:<10} {}", "extension:".bold(), self.extension);
    }
}

pub fn split(path: &str) -> SplitReport {
    let parts = portio_path::split(path);
    SplitReport {
        path: path.to_string(),
        drive: parts.drive.to_string(),
        directory: parts.directory.to_string(),
        file_name: parts.file_name.to_string(),
        extension: parts.extension.to_string(),
    }
}

pub fn relative(source: &str, target: &str) -> PathResult {
    PathResult {
        input: target.to_string(),
        result: portio_path::compute_relative(source, target),
    }
}

#[derive(Debug, Serialize)]
pub struct SubdirReport {
    pub directory: String,
    pub path: String,
    pub is_subdirectory: bool,
}

impl Report for SubdirReport {
    fn print_human(&self) {
        if self.is_subdirectory {
            println!("{} {} is inside {}", "✓".green(), self.path, self.directory);
        } else {
            println!("{} {} is not inside {}", "✗".red(), self.path, self.directory);
        }
    }
}

pub fn is_subdir(directory: &str, path: &str) -> SubdirReport {
    SubdirReport {
        directory: directory.to_string(),
        path: path.to_string(),
        is_subdirectory: portio_path::is_subdirectory(directory, path),
    }
}

#[derive(Debug, Serialize)]
pub struct PathValidity {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub file_system: FileSystemType,
    pub paths: Vec<PathValidity>,
}

impl ValidateReport {
    pub fn all_valid(&self) -> bool {
        self.paths.iter().all(|p| p.valid)
    }
}

impl Report for ValidateReport {
    fn print_human(&self) {
        for entry in &self.paths {
            match &entry.error {
                None => println!("{} {}", "✓".green(), entry.path),
                Some(error) => println!("{} {} - {}", "✗".red(), entry.path, error),
            }
        }
        println!(
            "\n{} of {} path(s) valid on {}",
            self.paths.iter().filter(|p| p.valid).count(),
            self.paths.len(),
            self.file_system
        );
    }
}

pub fn validate(paths: &[String], fs: FileSystemType) -> ValidateReport {
    let paths = paths
        .iter()
        .map(|path| {
            let error = portio_path::validate_file_path(path, fs)
                .err()
                .map(|e| e.to_string());
            PathValidity {
                path: path.clone(),
                valid: error.is_none(),
                error,
            }
        })
        .collect();
    ValidateReport {
        file_system: fs,
        paths,
    }
}
