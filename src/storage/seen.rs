//! Seen-set of repository URLs processed by earlier runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::storage::JsonFile;

/// URLs already collected, backed by a sorted JSON array on disk.
#[derive(Debug)]
pub struct SeenSet {
    urls: HashSet<String>,
    file: JsonFile,
}

impl SeenSet {
    /// Load the set from `path`.
    ///
    /// A missing or unreadable file yields an empty set. A file that does
    /// not parse is moved aside to `<name>.corrupt` so the next save cannot
    /// overwrite it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let file = JsonFile::new(path);
        let urls = match file.read::<Vec<String>>() {
            Ok(Some(urls)) => urls.into_iter().collect(),
            Ok(None) => HashSet::new(),
            Err(AppError::Json(e)) => {
                quarantine(file.path(), &e);
                HashSet::new()
            }
            Err(e) => {
                log::warn!(
                    "Seen-set at {} is unreadable ({}), starting empty",
                    file.path().display(),
                    e
                );
                HashSet::new()
            }
        };

        log::debug!("Loaded {} seen URLs from {}", urls.len(), file.path().display());
        Self { urls, file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Add a URL in memory. Returns false if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in alphabetical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.urls.iter().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    /// Persist the set as a sorted array.
    pub fn save(&self) -> Result<()> {
        self.file.write(&self.sorted())?;
        log::debug!("Saved {} seen URLs to {}", self.urls.len(), self.path().display());
        Ok(())
    }

    /// Evict one URL and persist. Returns false if it was not present.
    pub fn remove(&mut self, url: &str) -> Result<bool> {
        if !self.urls.remove(url) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Forget every URL and delete the backing file.
    pub fn clear(&mut self) -> Result<()> {
        self.urls.clear();
        self.file.remove()
    }
}

/// Rename an unparsable seen file to `<name>.corrupt`.
fn quarantine(path: &Path, error: &serde_json::Error) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "seen".to_string());
    let aside = path.with_file_name(format!("{name}.corrupt"));

    match std::fs::rename(path, &aside) {
        Ok(()) => log::warn!(
            "Seen-set at {} is corrupt ({}), moved to {} and starting empty",
            path.display(),
            error,
            aside.display()
        ),
        Err(e) => log::warn!(
            "Seen-set at {} is corrupt ({}) and could not be moved aside: {}",
            path.display(),
            error,
            e
        ),
    }
}
