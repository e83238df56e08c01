//! WP-Trait CLI library.
//!
//! Exposes the command surface, command implementations and formatters so
//! they can be tested without spawning the binary.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unnecessary_wraps)]

pub mod actions;
pub mod cli;
pub mod commands;
pub mod formatters;
pub mod runner;

pub use actions::{ConfigAction, MakeKind};
