//! Archive assembly and delivery.
//!
//! [`assemble`] packs a [`BundleFiles`] into a zip in bundle order. Every entry
//! gets the same timestamp (1980-01-01 00:00, the zip epoch) and the same
//! permissions, so identical bundles produce identical archives.
//!
//! Delivery is a separate seam: a [`DownloadSink`] receives the finished bytes
//! and a filename. The CLI writes into an output directory with
//! [`DirectorySink`]; embedders and tests collect into a [`MemorySink`].

use crate::bundle::BundleFiles;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("cannot write archive: {0}")]
    Io(#[from] io::Error),
    #[error("download failed: {0}")]
    Download(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Deflate level 1 (fastest) to 9 (smallest); 0 stores entries uncompressed.
    pub compression_level: u8,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

/// Zip every bundle file, in bundle order.
pub fn assemble(files: &BundleFiles, options: &ArchiveOptions) -> Result<Vec<u8>, AssemblyError> {
    let base = SimpleFileOptions::default()
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    let entry_options = match options.compression_level.min(9) {
        0 => base.compression_method(CompressionMethod::Stored),
        level => base
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level))),
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files.iter() {
        zip.start_file(file.path.as_str(), entry_options)?;
        zip.write_all(file.content.as_bytes())?;
    }
    let archive = zip.finish()?.into_inner();
    debug!(entries = files.len(), bytes = archive.len(), "archive assembled");
    Ok(archive)
}

/// Read an archive back into `(path, bytes)` pairs in stored order.
pub fn read_entries(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>, AssemblyError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        entries.push((entry.name().to_string(), bytes));
    }
    Ok(entries)
}

/// Where a finished archive goes.
pub trait DownloadSink: Sync {
    /// Hand over the archive under `filename`. Returns a human-readable
    /// location (a path, a URL, a label).
    fn deliver(&self, filename: &str, archive: &[u8]) -> Result<String, AssemblyError>;
}

/// Writes archives into a directory.
///
/// Each delivery writes its own uniquely named hidden `.part` file and renames
/// it into place, so a failed export never leaves a truncated zip under the
/// final name and parallel deliveries never share a partial file. Without
/// `overwrite`, the final rename refuses to replace an existing archive.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, archive: &[u8]) -> Result<String, AssemblyError> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(AssemblyError::Download(format!(
                "invalid archive filename `{filename}`"
            )));
        }
        let target = self.dir.join(filename);
        fs::create_dir_all(&self.dir)?;

        let mut partial = tempfile::Builder::new()
            .prefix(&format!(".{filename}."))
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        partial.write_all(archive)?;
        partial.as_file().sync_all()?;

        let persisted = if self.overwrite {
            partial.persist(&target)
        } else {
            partial.persist_noclobber(&target)
        };
        if let Err(e) = persisted {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                return Err(AssemblyError::Download(format!(
                    "{} already exists",
                    target.display()
                )));
            }
            return Err(e.error.into());
        }
        Ok(target.display().to_string())
    }
}

/// Keeps delivered archives in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far.
    pub fn take(&self) -> Vec<(String, Vec<u8>)> {
        let mut guard = self.deliveries.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, filename: &str, archive: &[u8]) -> Result<String, AssemblyError> {
        self.deliveries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((filename.to_string(), archive.to_vec()));
        Ok(format!("memory:{filename}"))
    }
}
