//! Error types for the WP-Trait scaffolder.
//!
//! Every failure a subcommand can end with is a variant of [`Error`]. Variants are
//! grouped into an [`ErrorCategory`] that decides which exit code the CLI
//! reports.
//!
//! # Examples
//!
//! ```
//! use wp_trait_core::{Error, ErrorCategory, Result};
//!
//! fn require_package(declared: bool) -> Result<()> {
//!     if !declared {
//!         return Err(Error::DependencyMissing {
//!             package: "mehrshaddarzi/wp-trait".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_package(false).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Validation);
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the scaffolder.
///
/// All library crates in the workspace return this type so the CLI can map any
/// failure to a category and an exit code without string matching.
#[derive(Error, Debug)]
pub enum Error {
    /// The project has no `composer.json`.
    #[error("Manifest not found: {}", .path.display())]
    ManifestMissing {
        /// Expected manifest location
        path: PathBuf,
    },

    /// The manifest exists but is not a JSON object.
    #[error("Manifest is malformed ({}): {reason}", .path.display())]
    ManifestMalformed {
        /// Manifest location
        path: PathBuf,
        /// What is wrong with it
        reason: String,
        /// Underlying parser error, if parsing failed
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The scaffolding library is not declared in `require`.
    #[error("Required dependency is not declared: {package}")]
    DependencyMissing {
        /// Package name that must be required
        package: String,
    },

    /// The manifest has no `autoload.psr-4` section.
    #[error("Manifest has no autoload.psr-4 section: {}", .path.display())]
    AutoloadMissing {
        /// Manifest location
        path: PathBuf,
    },

    /// The `autoload.psr-4` section has no usable namespace-to-directory entry.
    #[error("No usable namespace mapping in autoload.psr-4: {}", .path.display())]
    NamespaceMappingMissing {
        /// Manifest location
        path: PathBuf,
    },

    /// The plugin main file `<root>/<root-dir-name>.php` does not exist.
    #[error("Plugin main file not found: {}", .path.display())]
    MainFileMissing {
        /// Expected main file location
        path: PathBuf,
    },

    /// The class file to be generated already exists.
    #[error("Target file already exists: {}", .path.display())]
    TargetExists {
        /// Existing file
        path: PathBuf,
    },

    /// The integration package is already part of the project.
    #[error("Package is already added: {package}")]
    AlreadyPresent {
        /// Integration package name
        package: String,
    },

    /// The integration package is not part of the project.
    #[error("Package is not added: {package}")]
    NotPresent {
        /// Integration package name
        package: String,
    },

    /// An insertion point could not be located in the bootstrap file.
    #[error("Could not locate {anchor} in {}", .path.display())]
    AnchorNotFound {
        /// Human-readable anchor name
        anchor: String,
        /// File that was scanned
        path: PathBuf,
    },

    /// An insertion point matched more than one location, or a location that
    /// cannot take a new line.
    #[error("Ambiguous {anchor} in {} (lines {lines:?}): {reason}", .path.display())]
    AnchorAmbiguous {
        /// Human-readable anchor name
        anchor: String,
        /// File that was scanned
        path: PathBuf,
        /// 1-based candidate line numbers
        lines: Vec<usize>,
        /// Why the candidates were rejected
        reason: String,
    },

    /// A file could not be read.
    #[error("Failed to read {}", .path.display())]
    ReadFailed {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {}", .path.display())]
    WriteFailed {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A template could not be registered or rendered.
    #[error("Template '{template}' failed: {message}")]
    TemplateError {
        /// Template name
        template: String,
        /// Description of the failure
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// The command log could not be read or written.
    #[error("Cache error: {message}")]
    CacheError {
        /// Description of the cache failure
        message: String,
    },

    /// An external process (Composer, WP-CLI) failed.
    #[error("External command `{command}` failed: {message}")]
    ProcessFailed {
        /// Command line that was run
        command: String,
        /// Exit status or spawn error
        message: String,
    },
}

/// Coarse grouping of [`Error`] variants.
///
/// Validation and conflict errors are detected before anything is written.
/// Structural and I/O errors may happen after a class file was created and
/// trigger its removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Project layout or manifest is unusable
    Validation,
    /// The requested change collides with existing state
    Conflict,
    /// The bootstrap file could not be patched
    Structural,
    /// Reading or writing a file failed
    Io,
    /// Everything else (arguments, templates, config, external processes)
    Other,
}

impl Error {
    /// Returns the category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wp_trait_core::{Error, ErrorCategory};
    ///
    /// let err = Error::NotPresent { package: "cmb2".to_string() };
    /// assert_eq!(err.category(), ErrorCategory::Conflict);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ManifestMissing { .. }
            | Self::ManifestMalformed { .. }
            | Self::DependencyMissing { .. }
            | Self::AutoloadMissing { .. }
            | Self::NamespaceMappingMissing { .. }
            | Self::MainFileMissing { .. } => ErrorCategory::Validation,
            Self::TargetExists { .. } | Self::AlreadyPresent { .. } | Self::NotPresent { .. } => {
                ErrorCategory::Conflict
            }
            Self::AnchorNotFound { .. } | Self::AnchorAmbiguous { .. } => {
                ErrorCategory::Structural
            }
            Self::ReadFailed { .. } | Self::WriteFailed { .. } => ErrorCategory::Io,
            Self::InvalidArgument(_)
            | Self::TemplateError { .. }
            | Self::ConfigError { .. }
            | Self::CacheError { .. }
            | Self::ProcessFailed { .. } => ErrorCategory::Other,
        }
    }

    /// Returns `true` if this error was raised while validating the project.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Validation)
    }

    /// Returns `true` if the requested change conflicts with existing state.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.category(), ErrorCategory::Conflict)
    }

    /// Returns `true` if the bootstrap file could not be patched.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self.category(), ErrorCategory::Structural)
    }

    /// Returns `true` if this is an I/O failure.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Io)
    }
}

/// Result type alias for scaffolder operations.
pub type Result<T> = std::result::Result<T, Error>;
