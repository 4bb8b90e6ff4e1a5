//! Tests for the in-memory file system together with the stream layer.

use portio_config::PathSettings;
use portio_fs::{
    create_directory_all, make_temp_file, FileSystem, MemoryFileSystem, OpenMode,
};
use portio_stream::{adapter, BufferedStream, ChildStream, Endian, Stream};
use proptest::prelude::*;

#[test]
fn test_buffered_stream_over_memory_file() {
    let fs = MemoryFileSystem::new();
    create_directory_all(&fs, "/data/records").unwrap();

    {
        let file = fs.open("/data/records/log.bin", OpenMode::Write).unwrap();
        let mut s = BufferedStream::new(file, 32, 32);
        adapter::write_u32(&mut s, 3, Endian::Little).unwrap();
        for name in ["one", "two", "three"] {
            adapter::write_string(&mut s, name, Endian::Little).unwrap();
        }
    }
    assert_eq!(fs.read("/data/records/log.bin").unwrap().len(), 4 + 3 * 4 + 11);

    let file = fs.open("/data/records/log.bin", OpenMode::Read).unwrap();
    let mut s = BufferedStream::new(file, 8, 0);
    let count = adapter::read_u32(&mut s, Endian::Little).unwrap();
    let names: Vec<String> = (0..count)
        .map(|_| adapter::read_string(&mut s, Endian::Little).unwrap())
        .collect();
    assert_eq!(names, ["one", "two", "three"]);
    assert!(!s.write(b"x"));
}

#[test]
fn test_child_window_over_memory_file() {
    let fs = MemoryFileSystem::new();
    fs.add_file("/archive", (0..64u8).collect()).unwrap();

    let file = fs.open("/archive", OpenMode::Read).unwrap();
    let mut entry = ChildStream::open(file, 16, 8).unwrap();
    let mut buf = [0u8; 32];
    assert_eq!(entry.read(&mut buf), Some(8));
    assert_eq!(&buf[..8], &[16, 17, 18, 19, 20, 21, 22, 23]);
}

#[test]
fn test_temp_files_under_created_directory() {
    let fs = MemoryFileSystem::new();
    let settings = PathSettings {
        temp_directory: Some("/var/tmp/portio".to_string()),
        ..PathSettings::default()
    };
    create_directory_all(&fs, "/var/tmp/portio").unwrap();

    let first = make_temp_file(&fs, &settings, 500).unwrap();
    let second = make_temp_file(&fs, &settings, 500).unwrap();
    assert_ne!(first, second);
    assert!(first.ends_with("temp500.tmp"));
    assert!(second.ends_with("temp499.tmp"));
    assert!(fs.exists(&first) && fs.exists(&second));
}

proptest! {
    #[test]
    fn test_create_directory_all_creates_every_ancestor(
        names in prop::collection::vec("[a-z]{1,6}", 1..6),
    ) {
        let fs = MemoryFileSystem::new();
        let path = format!("/{}", names.join("/"));
        create_directory_all(&fs, &path).unwrap();

        let mut ancestor = String::new();
        for name in &names {
            ancestor.push('/');
            ancestor.push_str(name);
            prop_assert!(fs.is_directory(&ancestor));
        }
        prop_assert_eq!(fs.entries().len(), names.len());
    }
}
