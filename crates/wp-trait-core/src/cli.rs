//! CLI-specific types and utilities.
//!
//! Strong types for the CLI surface: how reports are printed and which exit
//! code a failure maps to.
//!
//! # Examples
//!
//! ```
//! use wp_trait_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//!
//! assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
//! ```

use crate::error::{Error, ErrorCategory};
use std::fmt;
use std::str::FromStr;

/// CLI output format.
///
/// Determines how command reports are formatted for display.
/// All formats carry the same information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JSON output for machine parsing
    Json,
    /// Plain text output for scripts
    Text,
    /// Pretty-printed output with colors for human reading
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    ///
    /// # Examples
    ///
    /// ```
    /// use wp_trait_core::cli::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Json.as_str(), "json");
    /// assert_eq!(OutputFormat::Pretty.as_str(), "pretty");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// CLI exit code with semantic meaning.
///
/// Success is 0; each [`ErrorCategory`] has its own non-zero code so scripts
/// can tell a conflict from a broken bootstrap file.
///
/// # Examples
///
/// ```
/// use wp_trait_core::cli::ExitCode;
/// use wp_trait_core::Error;
///
/// let err = Error::AlreadyPresent { package: "cmb2".to_string() };
/// assert_eq!(ExitCode::from_error(&err), ExitCode::CONFLICT);
/// assert!(!ExitCode::CONFLICT.is_success());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful execution (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// General error (exit code 1).
    pub const ERROR: Self = Self(1);

    /// Project validation failed (exit code 2).
    pub const INVALID_INPUT: Self = Self(2);

    /// Requested change conflicts with existing state (exit code 3).
    pub const CONFLICT: Self = Self(3);

    /// Bootstrap file could not be patched (exit code 4).
    pub const STRUCTURAL: Self = Self(4);

    /// File read or write failed (exit code 5).
    pub const IO_ERROR: Self = Self(5);

    /// Creates an exit code from an integer value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Maps an error category to its exit code.
    #[must_use]
    pub const fn from_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Validation => Self::INVALID_INPUT,
            ErrorCategory::Conflict => Self::CONFLICT,
            ErrorCategory::Structural => Self::STRUCTURAL,
            ErrorCategory::Io => Self::IO_ERROR,
            ErrorCategory::Other => Self::ERROR,
        }
    }

    /// Maps an error to its exit code.
    #[must_use]
    pub const fn from_error(err: &Error) -> Self {
        Self::from_category(err.category())
    }

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Checks if the exit code represents success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
