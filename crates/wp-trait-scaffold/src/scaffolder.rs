//! The `make` flow: resolve, render, create, wire.

use crate::bootstrap::{BootstrapEdit, BootstrapPatcher, LineChange};
use crate::class_path::{ClassKind, ClassRequest, ClassSpec, PathResolver};
use crate::fs::CreatedFile;
use crate::manifest::ManifestResolver;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wp_trait_codegen::TemplateEngine;
use wp_trait_core::{Error, Result};

/// Summary of a generated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeReport {
    /// Kind of class
    pub kind: ClassKind,
    /// Fully-qualified class name
    pub class: String,
    /// Created class file
    pub file: PathBuf,
    /// Patched bootstrap file
    pub bootstrap: PathBuf,
    /// Bootstrap property holding the instance
    pub variable: String,
    /// Lines changed in the bootstrap file
    pub changes: Vec<LineChange>,
}

/// Generates classes into a project and wires them into its bootstrap file.
#[derive(Debug)]
pub struct Scaffolder {
    engine: TemplateEngine,
    patcher: BootstrapPatcher,
}

impl Scaffolder {
    /// Creates a scaffolder with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// register.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            patcher: BootstrapPatcher::new(),
        })
    }

    /// Generates the class described by `request` in the project at `root`.
    ///
    /// Validation and conflicts are detected before anything is written. If
    /// wiring the class into the bootstrap file fails, the class file and
    /// any directories created for it are removed again before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Any [`ManifestResolver`] or [`PathResolver`] error,
    /// [`Error::InvalidArgument`] for kinds that cannot be wired,
    /// [`Error::AnchorNotFound`] / [`Error::AnchorAmbiguous`] and I/O errors,
    /// including [`Error::WriteFailed`] for the bootstrap write-back.
    pub fn make(&self, root: &Path, request: ClassRequest) -> Result<MakeReport> {
        let project = ManifestResolver::resolve(root)?;
        let spec = ClassSpec::from_request(request)?;
        let class = PathResolver::resolve(spec, &project.mapping)?;

        let statement = class
            .instantiation(project.text_domain())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "{} classes cannot be generated with make",
                    class.spec.kind.label()
                ))
            })?;
        let content = self
            .engine
            .render(class.spec.kind.template(), &class.template_vars())?;

        let created = CreatedFile::create(&class.file_path, &content)?;

        let edit = BootstrapEdit::WireClass {
            property: class.property_declaration(),
            statement,
        };
        let outcome = match self.patcher.apply(&project.main_file, &edit) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Wiring {} into {} failed: {e}",
                    class.fqn,
                    project.main_file.display()
                );
                return Err(e);
            }
        };

        let file = created.commit();
        info!("Created {} {}", class.spec.kind.label(), class.fqn);

        Ok(MakeReport {
            kind: class.spec.kind,
            class: class.fqn,
            file,
            bootstrap: project.main_file,
            variable: class.spec.variable,
            changes: outcome.changes,
        })
    }
}
