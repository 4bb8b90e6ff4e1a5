//! File system contract for portio.
//!
//! This crate provides a synchronous `FileSystem` trait covering the few
//! operations the path and stream layers need, an in-memory implementation,
//! and helpers built only on the trait: multi-level directory creation and
//! temporary file names.
//!
//! # Example
//!
//! ```
//! use portio_fs::{create_directory_all, FileSystem, MemoryFileSystem, OpenMode};
//! use portio_stream::{adapter, Endian};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = MemoryFileSystem::new();
//! create_directory_all(&fs, "/var/data")?;
//!
//! let file = fs.open("/var/data/names.bin", OpenMode::Write)?;
//! adapter::write_string(&mut *file.borrow_mut(), "hello", Endian::Big)?;
//! drop(file);
//!
//! assert_eq!(fs.read("/var/data/names.bin")?.len(), 9);
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod file_system;
pub mod memory;
pub mod temp;

pub use directory::{create_directory_all, ensure_directory_exists};
pub use file_system::{FileSystem, OpenMode};
pub use memory::{MemoryFile, MemoryFileSystem};
pub use temp::{
    make_temp_file, make_temp_path_name, resolve_current_directory, resolve_temp_directory,
    TEMP_NAME_ATTEMPTS,
};
