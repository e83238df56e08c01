//! Short-lived record of the last invocation.
//!
//! The [`CommandLog`] keeps a single JSON document under
//! `<cache_dir>/wp-trait/command-log.json`. An entry is fresh for two minutes
//! after the file was last modified; stale entries are deleted on read. The
//! log only gates the interactive confirmation of `start`: running the same
//! command twice inside the window counts as confirmation.
//!
//! # Examples
//!
//! ```
//! use wp_trait_core::command_log::{CommandEntry, CommandLog};
//! use tempfile::TempDir;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = TempDir::new()?;
//! let log = CommandLog::with_directory(temp.path())?;
//!
//! let entry = CommandEntry::new("start").arg("my-plugin");
//! log.record(&entry)?;
//! assert_eq!(log.load_fresh()?, Some(entry));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Seconds an entry stays valid after it was written.
pub const COMMAND_LOG_TTL_SECS: i64 = 120;

/// File name of the log inside its directory.
pub const COMMAND_LOG_FILE: &str = "command-log.json";

/// One recorded invocation: the subcommand, its positional arguments and its
/// `--key=value` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Subcommand name
    pub command: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Named options
    #[serde(default)]
    pub assoc_args: BTreeMap<String, String>,
}

impl CommandEntry {
    /// Creates an entry with no arguments.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            assoc_args: BTreeMap::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Adds a named option.
    #[must_use]
    pub fn assoc(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.assoc_args.insert(key.into(), value.into());
        self
    }
}

/// How an invocation got past the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The same invocation was recorded less than the TTL ago
    Repeated,
    /// The operator answered the prompt with yes
    Prompted,
    /// The operator declined; the invocation stays recorded
    Declined,
}

impl Confirmation {
    /// Returns `true` if the action may proceed.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Repeated | Self::Prompted)
    }
}

/// Session-state store for the last invocation.
#[derive(Debug, Clone)]
pub struct CommandLog {
    path: PathBuf,
    ttl: Duration,
}

impl CommandLog {
    /// Creates a command log in the platform cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be determined or created.
    pub fn new() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::CacheError {
                message: "Cannot determine cache directory".to_string(),
            })?
            .join("wp-trait");

        Self::with_directory(cache_dir)
    }

    /// Creates a command log stored in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::CacheError {
            message: format!("Failed to create {}: {e}", dir.display()),
        })?;

        Ok(Self {
            path: dir.join(COMMAND_LOG_FILE),
            ttl: Duration::seconds(COMMAND_LOG_TTL_SECS),
        })
    }

    /// Overrides the validity window.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the log file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or written.
    pub fn record(&self, entry: &CommandEntry) -> Result<()> {
        let json = serde_json::to_string(entry).map_err(|e| Error::CacheError {
            message: format!("Failed to serialize command log entry: {e}"),
        })?;

        fs::write(&self.path, json).map_err(|e| Error::CacheError {
            message: format!("Failed to write {}: {e}", self.path.display()),
        })?;

        debug!("Recorded `{}` in {}", entry.command, self.path.display());
        Ok(())
    }

    /// Returns the stored entry if it is still fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be inspected or removed.
    pub fn load_fresh(&self) -> Result<Option<CommandEntry>> {
        self.load_fresh_at(Utc::now())
    }

    /// Returns the stored entry if it was written less than the TTL before `now`.
    ///
    /// Stale or unreadable entries are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be inspected or removed.
    pub fn load_fresh_at(&self, now: DateTime<Utc>) -> Result<Option<CommandEntry>> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::CacheError {
                    message: format!("Failed to stat {}: {e}", self.path.display()),
                });
            }
        };

        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| Error::CacheError {
                message: format!("Failed to read modification time: {e}"),
            })?
            .into();

        if now - modified > self.ttl {
            debug!("Command log is stale (written {modified}), removing");
            self.clear()?;
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::CacheError {
            message: format!("Failed to read {}: {e}", self.path.display()),
        })?;

        if let Ok(entry) = serde_json::from_str(&content) {
            Ok(Some(entry))
        } else {
            warn!("Discarding unreadable command log {}", self.path.display());
            self.clear()?;
            Ok(None)
        }
    }

    /// Deletes the stored entry, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::CacheError {
                message: format!("Failed to remove {}: {e}", self.path.display()),
            }),
        }
    }

    /// Runs the confirmation flow for `entry`.
    ///
    /// A fresh identical entry confirms without prompting. Otherwise the entry
    /// is recorded and `prompt` decides; a positive answer clears the log so the
    /// next invocation starts over.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be accessed or `prompt` fails.
    pub fn confirm<F>(&self, entry: &CommandEntry, prompt: F) -> Result<Confirmation>
    where
        F: FnOnce() -> Result<bool>,
    {
        if self.load_fresh()?.as_ref() == Some(entry) {
            self.clear()?;
            return Ok(Confirmation::Repeated);
        }

        self.record(entry)?;

        if prompt()? {
            self.clear()?;
            Ok(Confirmation::Prompted)
        } else {
            Ok(Confirmation::Declined)
        }
    }
}
