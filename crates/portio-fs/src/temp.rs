//! Temporary file names and default locations.

use std::io;

use portio_config::{defaults, PathSettings};
use portio_path::{append, ensure_trailing_separator};
use tracing::{debug, trace};

use crate::file_system::FileSystem;

/// Numbers tried by [`make_temp_path_name`] before giving up.
pub const TEMP_NAME_ATTEMPTS: u32 = 64;

/// Create a new empty file named `prefix` + number + `extension` inside
/// `directory` and return its path.
///
/// Numbers count down from `seed`. A name that already exists is skipped; any
/// other error from [`FileSystem::create_file`] is returned immediately. After
/// [`TEMP_NAME_ATTEMPTS`] taken names the call fails with
/// `io::ErrorKind::AlreadyExists`.
pub fn make_temp_path_name<F: FileSystem + ?Sized>(
    fs: &F,
    directory: &str,
    prefix: &str,
    extension: &str,
    seed: u32,
) -> io::Result<String> {
    for attempt in 0..TEMP_NAME_ATTEMPTS {
        let number = seed.wrapping_sub(attempt);
        let mut path = directory.to_string();
        append(&mut path, &format!("{prefix}{number}{extension}"));

        match fs.create_file(&path) {
            Ok(()) => {
                debug!(path = %path, "created temporary file");
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(path = %path, "temporary name taken");
            }
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("No free temporary name in {directory} after {TEMP_NAME_ATTEMPTS} attempts"),
    ))
}

/// [`make_temp_path_name`] using the prefix and extension from `settings`
/// and the directory from [`resolve_temp_directory`].
pub fn make_temp_file<F: FileSystem + ?Sized>(
    fs: &F,
    settings: &PathSettings,
    seed: u32,
) -> io::Result<String> {
    let directory = resolve_temp_directory(settings);
    make_temp_path_name(
        fs,
        &directory,
        &settings.temp_file_prefix,
        &settings.temp_file_extension,
        seed,
    )
}

/// Directory for temporary files, ending in a separator.
///
/// The configured override wins, then the process defaults, then the
/// platform temporary directory.
pub fn resolve_temp_directory(settings: &PathSettings) -> String {
    let mut directory = settings
        .temp_directory
        .clone()
        .or_else(defaults::temp_directory)
        .unwrap_or_else(|| std::env::temp_dir().to_string_lossy().into_owned());
    ensure_trailing_separator(&mut directory);
    directory
}

/// Directory relative paths resolve against, ending in a separator.
///
/// Falls back from the configured value to the process defaults and then to
/// the working directory of the process. `None` when none is available.
pub fn resolve_current_directory(settings: &PathSettings) -> Option<String> {
    let mut directory = settings
        .current_directory
        .clone()
        .or_else(defaults::current_directory)
        .or_else(|| {
            std::env::current_dir()
                .ok()
                .map(|dir| dir.to_string_lossy().into_owned())
        })?;
    ensure_trailing_separator(&mut directory);
    Some(directory)
}
