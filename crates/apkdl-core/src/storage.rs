//! Disk I/O and file lifecycle for downloaded packages.
//!
//! Bytes are written sequentially to `<name>.part` and hashed on the way in.
//! `finalize` flushes, syncs and atomically renames to the final name; a
//! writer dropped before that removes its temp file.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

const WRITE_BUFFER: usize = 64 * 1024;

/// Path for the temp file: appends `.part` to the final path (e.g. `app.apk` → `app.apk.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one package download.
pub struct PackageWriter {
    file: Option<BufWriter<File>>,
    hasher: Sha256,
    written: u64,
    temp_path: PathBuf,
    final_path: PathBuf,
}

/// A finished package on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedFile {
    pub path: PathBuf,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the contents.
    pub sha256: String,
}

impl PackageWriter {
    /// Creates the parent directory if needed and opens `<final_path>.part`,
    /// truncating any leftover from an earlier attempt.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            file: Some(BufWriter::with_capacity(WRITE_BUFFER, file)),
            hasher: Sha256::new(),
            written: 0,
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already finalized"))?;
        file.write_all(data)?;
        self.hasher.update(data);
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flushes, syncs and renames the temp file to its final name. On any
    /// failure the temp file is removed.
    pub fn finalize(mut self) -> io::Result<FinalizedFile> {
        let writer = self
            .file
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already finalized"))?;
        // The file is closed from here on, so Drop no longer cleans up.
        if let Err(e) = commit(writer, &self.temp_path, &self.final_path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(e);
        }
        let sha256 = hex::encode(self.hasher.clone().finalize());
        Ok(FinalizedFile {
            path: self.final_path.clone(),
            bytes: self.written,
            sha256,
        })
    }
}

fn commit(mut writer: BufWriter<File>, temp_path: &Path, final_path: &Path) -> io::Result<()> {
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, final_path)
}

impl Drop for PackageWriter {
    fn drop(&mut self) {
        // Still open means finalize never ran.
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
