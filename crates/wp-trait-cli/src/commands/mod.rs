//! Command implementations for the WP-Trait CLI.
//!
//! Each command module turns parsed arguments into a library call, prints the
//! resulting report in the requested format and returns an exit code.

pub mod completions;
pub mod config;
pub mod integration;
pub mod make;
pub mod start;
