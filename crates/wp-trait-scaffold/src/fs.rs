//! File primitives used by every mutation.
//!
//! - [`write_atomic`] replaces an existing file through a temp file in the same
//!   directory, so an interrupted run never leaves a half-written bootstrap file
//!   or manifest behind.
//! - [`CreatedFile`] creates a new file without ever overwriting one and removes
//!   it again on drop unless committed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use wp_trait_core::{Error, Result};

/// Reads a UTF-8 file.
///
/// # Errors
///
/// Returns [`Error::ReadFailed`] if the file cannot be read.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces `path` with `content` atomically.
///
/// Permissions of an existing file are carried over to the replacement.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] if any step fails; the original file is left
/// untouched in that case.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let wrap = |source: io::Error| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(wrap)?;
    temp.write_all(content.as_bytes()).map_err(wrap)?;
    temp.as_file().sync_all().map_err(wrap)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(wrap)?;
    }

    temp.persist(path).map_err(|e| wrap(e.error))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Removes a file, treating "already gone" as success.
///
/// # Errors
///
/// Returns [`Error::WriteFailed`] if the file exists but cannot be removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// RAII guard for a newly created file.
///
/// Removes the file, and any directories that had to be created for it, when
/// dropped without [`commit`](Self::commit). This is the rollback for a class
/// file whose bootstrap wiring failed.
#[derive(Debug)]
pub struct CreatedFile {
    path: PathBuf,
    created_dirs: Vec<PathBuf>,
    file_created: bool,
}

impl CreatedFile {
    /// Creates `path` with `content`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetExists`] if the file already exists and
    /// [`Error::WriteFailed`] for any other I/O failure. Directories created
    /// before the failure are removed again.
    pub fn create(path: &Path, content: &str) -> Result<Self> {
        let wrap = |source: io::Error| Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut guard = Self {
            path: path.to_path_buf(),
            created_dirs: missing_ancestors(path),
            file_created: false,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::TargetExists {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(wrap(e)),
        };
        guard.file_created = true;

        file.write_all(content.as_bytes()).map_err(wrap)?;
        file.sync_all().map_err(wrap)?;

        debug!("Created {}", path.display());
        Ok(guard)
    }

    /// Returns the created file's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keeps the file; disables removal on drop.
    pub fn commit(mut self) -> PathBuf {
        self.file_created = false;
        self.created_dirs.clear();
        std::mem::take(&mut self.path)
    }
}

impl Drop for CreatedFile {
    fn drop(&mut self) {
        if self.file_created {
            match fs::remove_file(&self.path) {
                Ok(()) => warn!("Rolled back {}", self.path.display()),
                Err(e) => warn!("Failed to roll back {}: {}", self.path.display(), e),
            }
        }

        // Deepest first; remove_dir refuses non-empty directories.
        for dir in &self.created_dirs {
            if let Err(e) = fs::remove_dir(dir) {
                debug!("Left directory {} in place: {}", dir.display(), e);
            }
        }
    }
}

/// Ancestors of `path` that do not exist yet, deepest first.
fn missing_ancestors(path: &Path) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir.exists() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }
    missing
}
