//! Local filesystem JSON files.
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write never leaves a truncated state file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};

/// A JSON document stored at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir()?;

        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Write pretty-printed JSON.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(&bytes)
    }

    /// Read bytes, returning None if file doesn't exist.
    pub fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.read_bytes()? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete the file. Missing files are not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let file = JsonFile::new(tmp.path().join("nested/dir/test.json"));

        file.write(&vec!["a", "b"]).unwrap();
        let data: Vec<String> = file.read().unwrap().unwrap();
        assert_eq!(data, vec!["a", "b"]);
        assert!(!tmp.path().join("nested/dir/test.tmp").exists());
    }

    #[test]
    fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let file = JsonFile::new(tmp.path().join("nope.json"));

        assert!(file.read_bytes().unwrap().is_none());
        assert!(file.read::<Vec<String>>().unwrap().is_none());
        assert!(file.remove().is_ok());
    }

    #[test]
    fn test_read_corrupt_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = JsonFile::new(tmp.path().join("bad.json"));
        file.write_bytes(b"{not json").unwrap();

        assert!(matches!(file.read::<Vec<String>>(), Err(AppError::Json(_))));
    }
}
