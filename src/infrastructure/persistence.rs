//! Backing file access for the two catalog collections.
//!
//! Each collection lives in its own newline-delimited text file. Writes are
//! full rewrites: the new content goes to a sibling temp file which is then
//! renamed over the target, so a failed save never leaves a half-written
//! file behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Which backing file to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The item file.
    Items,
    /// The borrower file.
    Borrowers,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Items => write!(f, "items"),
            Self::Borrowers => write!(f, "borrowers"),
        }
    }
}

/// Reads and writes a collection as ordered lines.
pub trait LineGateway {
    /// Read every line of a collection. A collection that was never written
    /// reads as empty.
    ///
    /// # Errors
    /// Returns `Persistence` if the backing storage cannot be read.
    fn read_lines(&self, target: Collection) -> Result<Vec<String>>;

    /// Replace the whole collection with these lines.
    ///
    /// # Errors
    /// Returns `Persistence` if the backing storage cannot be written.
    fn write_lines(&mut self, target: Collection, lines: &[String]) -> Result<()>;
}

/// Gateway over two plain text files.
#[derive(Debug, Clone)]
pub struct FileGateway {
    items_path: PathBuf,
    borrowers_path: PathBuf,
}

impl FileGateway {
    /// Create a gateway for explicit file paths.
    #[must_use]
    pub const fn new(items_path: PathBuf, borrowers_path: PathBuf) -> Self {
        Self {
            items_path,
            borrowers_path,
        }
    }

    /// Create a gateway for the files named in the configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.items_path(), config.borrowers_path())
    }

    /// Path of a collection's file.
    #[must_use]
    pub fn path(&self, target: Collection) -> &Path {
        match target {
            Collection::Items => &self.items_path,
            Collection::Borrowers => &self.borrowers_path,
        }
    }
}

impl LineGateway for FileGateway {
    fn read_lines(&self, target: Collection) -> Result<Vec<String>> {
        let path = self.path(target);

        match fs::read_to_string(path) {
            Ok(content) => {
                let lines: Vec<String> = content.lines().map(str::to_string).collect();
                tracing::debug!(path = %path.display(), lines = lines.len(), "Read {target}");
                Ok(lines)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No {target} file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(AppError::persistence(
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    fn write_lines(&mut self, target: Collection, lines: &[String]) -> Result<()> {
        let path = self.path(target);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::persistence("Failed to create data directory", e))?;
            }
        }

        let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|e| {
            AppError::persistence(format!("Failed to write {}", temp_path.display()), e)
        })?;

        fs::rename(&temp_path, path).map_err(|e| {
            AppError::persistence(format!("Failed to replace {}", path.display()), e)
        })?;

        tracing::debug!(path = %path.display(), lines = lines.len(), "Wrote {target}");
        Ok(())
    }
}

/// In-memory gateway with write-failure injection.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    pub items: Vec<String>,
    pub borrowers: Vec<String>,
    /// Fail every write to this collection.
    pub fail_writes: Option<Collection>,
    /// Number of successful writes.
    pub writes: usize,
}

#[cfg(test)]
impl MemoryGateway {
    pub fn with_lines(items: &[&str], borrowers: &[&str]) -> Self {
        Self {
            items: items.iter().map(|s| (*s).to_string()).collect(),
            borrowers: borrowers.iter().map(|s| (*s).to_string()).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl LineGateway for MemoryGateway {
    fn read_lines(&self, target: Collection) -> Result<Vec<String>> {
        Ok(match target {
            Collection::Items => self.items.clone(),
            Collection::Borrowers => self.borrowers.clone(),
        })
    }

    fn write_lines(&mut self, target: Collection, lines: &[String]) -> Result<()> {
        if self.fail_writes == Some(target) {
            return Err(AppError::persistence(
                format!("injected {target} write failure"),
                std::io::Error::other("disk full"),
            ));
        }
        match target {
            Collection::Items => self.items = lines.to_vec(),
            Collection::Borrowers => self.borrowers = lines.to_vec(),
        }
        self.writes += 1;
        Ok(())
    }
}
