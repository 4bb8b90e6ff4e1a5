//! `portio dump`: print the records of a file through the stream layer.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::*;
use portio_config::StreamSettings;
use portio_stream::{
    adapter, shared, AccessFlags, BufferedStream, ChildStream, Endian, IoStream, SharedStream,
    Stream,
};
use serde::Serialize;
use tracing::debug;

use crate::output::Report;

/// Record layout of the dumped file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// 4-byte length followed by that many bytes
    #[default]
    Strings,
    /// Text lines ending in LF, CRLF or CR
    Lines,
}

#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub path: PathBuf,
    pub format: RecordFormat,
    /// Byte order of string lengths; the configured default when `None`
    pub endian: Option<Endian>,
    /// Start of the window to read
    pub offset: u64,
    /// Length of the window; the rest of the file when `None`
    pub length: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DumpReport {
    pub path: PathBuf,
    pub format: RecordFormat,
    pub offset: u64,
    pub length: u64,
    pub records: Vec<String>,
}

impl Report for DumpReport {
    fn print_human(&self) {
        for (i, record) in self.records.iter().enumerate() {
            println!("{:>6}  {}", i.to_string().dimmed(), record);
        }
        eprintln!(
            "\n{} record(s) from {} bytes at offset {}",
            self.records.len(),
            self.length,
            self.offset
        );
    }
}

pub fn dump(options: &DumpOptions, settings: &StreamSettings) -> Result<DumpReport> {
    let file = File::open(&options.path)
        .with_context(|| format!("Failed to open {}", options.path.display()))?;
    let source: SharedStream = shared(IoStream::new(file, AccessFlags::READ));
    let (source, length) = window(source, options, &options.path)?;

    let endian = match options.endian {
        Some(endian) => endian,
        None => settings.endian()?,
    };
    let (read_size, _) = settings.effective_buffer_sizes();
    let mut stream = BufferedStream::new(source, read_size, 0);
    stream.set_cache_size(settings.cache_size);
    debug!(path = %options.path.display(), read_size, ?endian, "dumping records");

    let mut records = Vec::new();
    match options.format {
        RecordFormat::Strings => {
            while let Some(available) = stream.available().filter(|&n| n > 0) {
                let truncated =
                    || format!("Truncated record {} in {}", records.len(), options.path.display());
                let declared = adapter::peek_string_length(&mut stream, endian)
                    .with_context(truncated)?;
                if u64::from(declared) > available.saturating_sub(4) {
                    bail!("{}: {declared} bytes declared, {} left", truncated(), available - 4);
                }
                records.push(adapter::read_string(&mut stream, endian)?);
            }
        }
        RecordFormat::Lines => {
            while let Some(line) = adapter::read_line(&mut stream)? {
                records.push(line);
            }
        }
    }

    Ok(DumpReport {
        path: options.path.clone(),
        format: options.format,
        offset: options.offset,
        length,
        records,
    })
}

/// Narrows `source` to the requested window and returns its length.
fn window(source: SharedStream, options: &DumpOptions, path: &Path) -> Result<(SharedStream, u64)> {
    let size = source
        .borrow()
        .size()
        .with_context(|| format!("Cannot determine the size of {}", path.display()))?;

    if options.offset == 0 && options.length.is_none() {
        return Ok((source, size));
    }
    if options.offset > size {
        bail!("Offset {} is past the end of {} ({size} bytes)", options.offset, path.display());
    }
    let length = options.length.unwrap_or(size - options.offset);
    if length == 0 {
        bail!("Empty window at offset {} in {}", options.offset, path.display());
    }
    let child = ChildStream::open(source, options.offset, length)?;
    Ok((shared(child), length))
}
