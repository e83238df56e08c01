//! Code generation for WP-Trait projects.
//!
//! Renders PHP class skeletons and JSON manifests from embedded Handlebars
//! templates.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod template_engine;

pub use template_engine::{TemplateEngine, TemplateName, TemplateVars};
