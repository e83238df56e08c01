//! Scaffold-and-patch engine for WP-Trait plugin projects.
//!
//! Generates classes into an existing plugin and wires them into its
//! hand-written bootstrap file, and adds or removes optional integrations in
//! a reversible way.
//!
//! # Architecture
//!
//! ```text
//! ManifestResolver -> PathResolver -> TemplateEngine -> BootstrapPatcher
//!                                                           ^
//! IntegrationToggle ----------------------------------------+
//! ```
//!
//! - [`manifest`]: reads and validates `composer.json`, keeps it round-trippable
//! - [`class_path`]: class path to file, namespace, property and statement
//! - [`anchor`]: locates insertion points on a comment- and string-masked copy
//! - [`bootstrap`]: plans line edits in memory, writes the file once
//! - [`integration`]: add/remove toggles for optional packages
//! - [`scaffolder`]: the `make` flow with rollback of the created class file
//! - [`skeleton`]: the `start` flow around `wp scaffold plugin`
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use wp_trait_scaffold::{ClassKind, ClassRequest, Scaffolder};
//!
//! # fn main() -> wp_trait_core::Result<()> {
//! let scaffolder = Scaffolder::new()?;
//! let report = scaffolder.make(
//!     Path::new("wp-content/plugins/my-plugin"),
//!     ClassRequest::new(ClassKind::PostType, "Forms"),
//! )?;
//! println!("created {}", report.file.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod anchor;
pub mod bootstrap;
pub mod class_path;
pub mod fs;
pub mod installer;
pub mod integration;
pub mod manifest;
pub mod scaffolder;
pub mod skeleton;
pub mod source;

pub use anchor::{AnchorLookup, AnchorScanner, PatchAnchor};
pub use bootstrap::{BootstrapEdit, BootstrapPatcher, ChangeKind, LineChange, PatchOutcome};
pub use class_path::{ClassKind, ClassRequest, ClassSpec, PathResolver, ResolvedClass};
pub use installer::{
    ComposerInstaller, DependencyInstaller, InstallOutcome, ProcessRunner, SkipInstall,
    SystemRunner,
};
pub use integration::{Integration, IntegrationToggle, ToggleAction, ToggleReport};
pub use manifest::{ManifestResolver, NamespaceMapping, Project, ProjectManifest};
pub use scaffolder::{MakeReport, Scaffolder};
pub use skeleton::{PluginSkeleton, StartOptions, StartReport};
