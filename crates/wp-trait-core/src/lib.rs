//! Core types, errors, and session state for the WP-Trait scaffolder.
//!
//! This crate provides the foundational types used across the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - [`Error`] hierarchy grouped by [`ErrorCategory`]
//! - CLI value types ([`cli::OutputFormat`], [`cli::ExitCode`])
//! - [`CommandLog`], the short-lived record backing the `start` confirmation

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
pub mod command_log;
mod error;

pub use command_log::{CommandEntry, CommandLog, Confirmation};
pub use error::{Error, ErrorCategory, Result};

/// Composer package that every scaffolded project must require.
pub const SCAFFOLD_PACKAGE: &str = "mehrshaddarzi/wp-trait";

/// Name of the project manifest file.
pub const MANIFEST_FILE: &str = "composer.json";
