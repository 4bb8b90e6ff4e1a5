//! In-memory file system.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use parking_lot::RwLock;
use portio_path::{
    components, find_component_reverse, has_drive_prefix, has_unc_prefix, is_relative,
    normalize_with, strip_trailing_separator,
};
use portio_stream::{
    shared, AccessFlags, MemoryStream, PositionType, ResizeOptions, SharedStream, Stream,
    StreamState,
};
use tracing::{debug, warn};

use crate::file_system::{FileSystem, OpenMode};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

type Nodes = Arc<RwLock<HashMap<String, Node>>>;

/// A file system kept entirely in memory.
///
/// Paths must be absolute. Both separators are accepted and paths are
/// normalized before lookup, so `/a/./b` and `\a\b` name the same file. Roots
/// (`/`, `C:\`, `\\server\volume`) always exist.
///
/// # Thread Safety
///
/// Uses `Arc<RwLock<HashMap>>` for interior mutability. Clones share the
/// same tree. Streams returned by [`open`](FileSystem::open) work on a private
/// copy of the file and write it back on flush, close or drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    nodes: Nodes,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. The parent directory must exist.
    pub fn add_file(&self, path: &str, contents: Vec<u8>) -> io::Result<()> {
        let key = key(path)?;
        let mut nodes = self.nodes.write();
        check_parent(&nodes, &key)?;
        if matches!(nodes.get(&key), Some(Node::Directory)) || is_root(&key) {
            return Err(is_a_directory(&key));
        }
        nodes.insert(key, Node::File(contents));
        Ok(())
    }

    /// Contents of a file.
    pub fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let key = key(path)?;
        match self.nodes.read().get(&key) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Directory) => Err(is_a_directory(&key)),
            None => Err(not_found(&key)),
        }
    }

    /// Paths of every file and directory, sorted.
    ///
    /// Paths are listed in normalized form: with `/` separators, except UNC
    /// paths, which use `\\` throughout (`\\server\share\dir`).
    pub fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = self.nodes.read().keys().cloned().collect();
        entries.sort();
        entries
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &str) -> bool {
        match key(path) {
            Ok(key) => is_root(&key) || self.nodes.read().contains_key(&key),
            Err(_) => false,
        }
    }

    fn is_directory(&self, path: &str) -> bool {
        match key(path) {
            Ok(key) => is_root(&key) || matches!(self.nodes.read().get(&key), Some(Node::Directory)),
            Err(_) => false,
        }
    }

    fn create_directory(&self, path: &str) -> io::Result<()> {
        let key = key(path)?;
        let mut nodes = self.nodes.write();
        if is_root(&key) || nodes.contains_key(&key) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path already exists: {key}"),
            ));
        }
        check_parent(&nodes, &key)?;
        debug!(path = %key, "creating directory");
        nodes.insert(key, Node::Directory);
        Ok(())
    }

    fn remove_file(&self, path: &str) -> io::Result<()> {
        let key = key(path)?;
        let mut nodes = self.nodes.write();
        match nodes.get(&key) {
            Some(Node::File(_)) => {
                nodes.remove(&key);
                Ok(())
            }
            Some(Node::Directory) => Err(is_a_directory(&key)),
            None => Err(not_found(&key)),
        }
    }

    fn remove_directory(&self, path: &str) -> io::Result<()> {
        let key = key(path)?;
        if is_root(&key) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Cannot remove root: {key}"),
            ));
        }
        let mut nodes = self.nodes.write();
        match nodes.get(&key) {
            Some(Node::Directory) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Not a directory: {key}"),
                ))
            }
            None => return Err(not_found(&key)),
        }
        if nodes.keys().any(|k| parent(k).as_deref() == Some(key.as_str())) {
            return Err(io::Error::new(
                io::ErrorKind::DirectoryNotEmpty,
                format!("Directory not empty: {key}"),
            ));
        }
        nodes.remove(&key);
        Ok(())
    }

    fn create_file(&self, path: &str) -> io::Result<()> {
        let key = key(path)?;
        let mut nodes = self.nodes.write();
        if is_root(&key) || nodes.contains_key(&key) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path already exists: {key}"),
            ));
        }
        check_parent(&nodes, &key)?;
        nodes.insert(key, Node::File(Vec::new()));
        Ok(())
    }

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<SharedStream> {
        let key = key(path)?;
        let mut nodes = self.nodes.write();
        if is_root(&key) || matches!(nodes.get(&key), Some(Node::Directory)) {
            return Err(is_a_directory(&key));
        }

        let data = match (mode, nodes.get(&key)) {
            (OpenMode::Read, Some(Node::File(data))) => MemoryStream::from_vec(data.clone()),
            (OpenMode::Read, _) => return Err(not_found(&key)),
            (OpenMode::ReadWrite, Some(Node::File(data))) => MemoryStream::from_vec(data.clone()),
            (OpenMode::Write | OpenMode::ReadWrite, _) => {
                check_parent(&nodes, &key)?;
                nodes.insert(key.clone(), Node::File(Vec::new()));
                MemoryStream::new()
            }
        };
        drop(nodes);

        debug!(path = %key, ?mode, "opened memory file");
        Ok(shared(MemoryFile::new(key, self.nodes.clone(), data, mode)))
    }
}

/// A stream over a file of a [`MemoryFileSystem`].
#[derive(Debug)]
pub struct MemoryFile {
    key: String,
    nodes: Nodes,
    data: MemoryStream,
    flags: AccessFlags,
    dirty: bool,
    open: bool,
    state: StreamState,
}

impl MemoryFile {
    fn new(key: String, nodes: Nodes, mut data: MemoryStream, mode: OpenMode) -> Self {
        if mode == OpenMode::Read {
            data.set_options(ResizeOptions::fixed());
        }
        Self {
            key,
            nodes,
            data,
            flags: mode.access_flags(),
            dirty: false,
            open: true,
            state: StreamState::Ok,
        }
    }

    /// Path of the file in its file system.
    pub fn path(&self) -> &str {
        &self.key
    }

    fn require(&mut self, flag: AccessFlags) -> bool {
        if !self.open {
            self.state = StreamState::NotOpen;
            return false;
        }
        if !self.flags.contains(flag) {
            self.state = StreamState::AccessDenied;
            return false;
        }
        self.state = StreamState::Ok;
        true
    }

    /// Writes the private copy back to the file system.
    fn commit(&mut self) -> bool {
        if !self.dirty {
            return true;
        }
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&self.key) {
            Some(Node::File(contents)) => {
                contents.clear();
                contents.extend_from_slice(self.data.data());
                self.dirty = false;
                true
            }
            _ => {
                warn!(path = %self.key, "file removed while open; discarding writes");
                self.state = StreamState::Io(io::ErrorKind::NotFound);
                false
            }
        }
    }
}

impl Stream for MemoryFile {
    fn type_name(&self) -> &'static str {
        "memory-file"
    }

    fn access_flags(&self) -> AccessFlags {
        if self.open {
            self.flags
        } else {
            AccessFlags::empty()
        }
    }

    fn state(&self) -> StreamState {
        if self.state.is_ok() {
            self.data.state()
        } else {
            self.state
        }
    }

    fn close(&mut self) -> bool {
        if !self.open {
            return true;
        }
        let committed = self.commit();
        self.open = false;
        self.data.close();
        committed
    }

    fn size(&self) -> Option<u64> {
        if self.open {
            self.data.size()
        } else {
            None
        }
    }

    fn set_size(&mut self, size: u64) -> bool {
        if !self.require(AccessFlags::WRITE) {
            return false;
        }
        self.dirty = true;
        self.data.set_size(size)
    }

    fn position(&self, kind: PositionType) -> i64 {
        self.data.position(kind)
    }

    fn set_position(&mut self, position: i64, kind: PositionType) -> bool {
        if !self.open {
            self.state = StreamState::NotOpen;
            return false;
        }
        let before = self.data.size();
        let moved = self.data.set_position(position, kind);
        if self.data.size() != before {
            self.dirty = true;
        }
        moved
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.require(AccessFlags::READ) {
            return None;
        }
        self.data.read(buf)
    }

    fn write(&mut self, data: &[u8]) -> bool {
        if !self.require(AccessFlags::WRITE) {
            return false;
        }
        self.dirty = true;
        self.data.write(data)
    }

    fn flush(&mut self) -> bool {
        if !self.open {
            self.state = StreamState::NotOpen;
            return false;
        }
        self.commit()
    }
}

impl Drop for MemoryFile {
    fn drop(&mut self) {
        if self.open {
            self.commit();
        }
    }
}

/// The lookup key for `path`: normalized, without a trailing separator
/// unless it is a root, written with `/` or, for UNC paths, with `\\`.
fn key(path: &str) -> io::Result<String> {
    if is_relative(path) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not absolute: {path}"),
        ));
    }
    let separator = if has_unc_prefix(path) { '\\' } else { '/' };
    let mut key = normalize_with(path, separator);
    if !is_root(&key) {
        strip_trailing_separator(&mut key);
    }
    Ok(key)
}

fn is_root(key: &str) -> bool {
    if has_unc_prefix(key) {
        components(key).count() <= 2
    } else if has_drive_prefix(key) {
        key.len() <= 3
    } else {
        key == "/"
    }
}

fn parent(key: &str) -> Option<String> {
    if is_root(key) {
        return None;
    }
    let mut parent = key[..find_component_reverse(key, key.len())].to_string();
    if !is_root(&parent) {
        strip_trailing_separator(&mut parent);
    }
    Some(parent)
}

fn check_parent(nodes: &HashMap<String, Node>, key: &str) -> io::Result<()> {
    match parent(key) {
        Some(p) if is_root(&p) || matches!(nodes.get(&p), Some(Node::Directory)) => Ok(()),
        Some(p) => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Parent directory not found: {p}"),
        )),
        None => Ok(()),
    }
}

fn not_found(key: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("File not found: {key}"))
}

fn is_a_directory(key: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("Is a directory: {key}"))
}
