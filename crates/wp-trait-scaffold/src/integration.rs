//! Optional integrations that can be added to and removed from a project.
//!
//! Each integration is reversible: `add` followed by `remove` restores the
//! manifest and the bootstrap file to their original text.

use crate::bootstrap::{BootstrapEdit, BootstrapPatcher, LineChange};
use crate::fs::{CreatedFile, read_to_string, remove_if_exists, write_atomic};
use crate::installer::{DependencyInstaller, InstallOutcome};
use crate::manifest::{ManifestResolver, Project};
use crate::source::SourceText;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};
use wp_trait_codegen::{TemplateEngine, TemplateName, TemplateVars};
use wp_trait_core::{Error, Result};

/// A named optional integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Integration {
    /// IDE type hints for the plugin's main instance
    IdeHelper,
    /// CMB2 metabox library
    Cmb2,
}

/// Where an integration lives in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTarget {
    /// A Composer dependency, optionally with an autoloaded file
    Manifest {
        /// Composer package
        package: &'static str,
        /// Version constraint
        constraint: &'static str,
        /// Entry for `autoload.files`
        autoload_file: Option<&'static str>,
    },
    /// A binding in the bootstrap file plus a generated support file
    Bootstrap {
        /// Support file, relative to the project root
        support_file: &'static str,
    },
}

impl Integration {
    /// Every integration.
    pub const ALL: [Self; 2] = [Self::IdeHelper, Self::Cmb2];

    /// Returns the command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdeHelper => "ide-helper",
            Self::Cmb2 => "cmb2",
        }
    }

    /// Returns what the integration changes.
    #[must_use]
    pub const fn target(self) -> IntegrationTarget {
        match self {
            Self::IdeHelper => IntegrationTarget::Bootstrap {
                support_file: "ide-helper.php",
            },
            Self::Cmb2 => IntegrationTarget::Manifest {
                package: "cmb2/cmb2",
                constraint: "dev-master",
                autoload_file: Some("vendor/cmb2/cmb2/init.php"),
            },
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Integration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|integration| integration.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|i| i.as_str()).collect();
                Error::InvalidArgument(format!(
                    "unknown package '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Direction of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    /// Integration added
    Added,
    /// Integration removed
    Removed,
}

/// Summary of an add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleReport {
    /// Integration that was toggled
    pub integration: Integration,
    /// Direction
    pub action: ToggleAction,
    /// Files written or deleted
    pub files: Vec<PathBuf>,
    /// Bootstrap lines changed
    pub changes: Vec<LineChange>,
    /// Dependency installation, for manifest integrations
    pub install: Option<InstallOutcome>,
}

/// Adds and removes integrations.
#[derive(Debug)]
pub struct IntegrationToggle<'a> {
    installer: &'a dyn DependencyInstaller,
    engine: TemplateEngine,
    patcher: BootstrapPatcher,
}

impl<'a> IntegrationToggle<'a> {
    /// Creates a toggle that installs dependencies with `installer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// register.
    pub fn new(installer: &'a dyn DependencyInstaller) -> Result<Self> {
        Ok(Self {
            installer,
            engine: TemplateEngine::new()?,
            patcher: BootstrapPatcher::new(),
        })
    }

    /// Adds `integration` to the project at `root`.
    ///
    /// # Errors
    ///
    /// Any [`ManifestResolver`] error, [`Error::AlreadyPresent`], anchor
    /// errors, I/O errors, or [`Error::ProcessFailed`] from installation. An
    /// installation failure leaves the manifest change in place.
    pub fn add(&self, root: &Path, integration: Integration) -> Result<ToggleReport> {
        let project = ManifestResolver::resolve(root)?;
        match integration.target() {
            IntegrationTarget::Manifest {
                package,
                constraint,
                autoload_file,
            } => self.add_dependency(project, integration, package, constraint, autoload_file),
            IntegrationTarget::Bootstrap { support_file } => {
                self.add_binding(&project, integration, support_file)
            }
        }
    }

    /// Removes `integration` from the project at `root`.
    ///
    /// # Errors
    ///
    /// Any [`ManifestResolver`] error, [`Error::NotPresent`], anchor errors,
    /// I/O errors, or [`Error::ProcessFailed`] from installation.
    pub fn remove(
        &self,
        root: &Path,
        integration: Integration,
    ) -> Result<ToggleReport> {
        let project = ManifestResolver::resolve(root)?;
        match integration.target() {
            IntegrationTarget::Manifest {
                package,
                autoload_file,
                ..
            } => self.remove_dependency(project, integration, package, autoload_file),
            IntegrationTarget::Bootstrap { support_file } => {
                self.remove_binding(&project, integration, support_file)
            }
        }
    }

    fn add_dependency(
        &self,
        mut project: Project,
        integration: Integration,
        package: &str,
        constraint: &str,
        autoload_file: Option<&str>,
    ) -> Result<ToggleReport> {
        if project.manifest.has_dependency(package) {
            return Err(Error::AlreadyPresent {
                package: integration.as_str().to_string(),
            });
        }

        project.manifest.insert_dependency(package, constraint)?;
        if let Some(file) = autoload_file {
            project.manifest.add_autoload_file(file)?;
        }
        project.manifest.save()?;
        info!("Added {integration} to {}", project.manifest.path().display());

        let install = self.installer.install(&project.root)?;
        Ok(ToggleReport {
            integration,
            action: ToggleAction::Added,
            files: vec![project.manifest.path().to_path_buf()],
            changes: Vec::new(),
            install: Some(install),
        })
    }

    fn remove_dependency(
        &self,
        mut project: Project,
        integration: Integration,
        package: &str,
        autoload_file: Option<&str>,
    ) -> Result<ToggleReport> {
        if project.manifest.remove_dependency(package).is_none() {
            return Err(Error::NotPresent {
                package: integration.as_str().to_string(),
            });
        }
        if let Some(file) = autoload_file {
            project.manifest.remove_autoload_file(file);
        }
        project.manifest.save()?;
        info!(
            "Removed {integration} from {}",
            project.manifest.path().display()
        );

        let install = self.installer.install(&project.root)?;
        Ok(ToggleReport {
            integration,
            action: ToggleAction::Removed,
            files: vec![project.manifest.path().to_path_buf()],
            changes: Vec::new(),
            install: Some(install),
        })
    }

    fn add_binding(
        &self,
        project: &Project,
        integration: Integration,
        support_file: &str,
    ) -> Result<ToggleReport> {
        let variable = binding_variable(&project.slug);
        let text = read_to_string(&project.main_file)?;

        if BootstrapPatcher::find_binding(SourceText::parse(&text).lines(), &variable).is_some() {
            return Err(Error::AlreadyPresent {
                package: integration.as_str().to_string(),
            });
        }

        let edit = BootstrapEdit::BindInstance {
            variable: variable.clone(),
        };
        let outcome = BootstrapPatcher::plan(&project.main_file, &text, &edit)?;
        let main_class = BootstrapPatcher::main_instance(&project.main_file, &text)?;

        let vars = TemplateVars::new()
            .set("plugin_slug", project.slug.as_str())
            .set("main_class", main_class)
            .set("variable", variable);
        let helper = self.engine.render(TemplateName::IdeHelper, &vars)?;

        let created = CreatedFile::create(&project.root.join(support_file), &helper)?;
        if let Err(e) = write_atomic(&project.main_file, &outcome.content) {
            warn!(
                "Bootstrap write failed, removing {}",
                created.path().display()
            );
            return Err(e);
        }
        let support_path = created.commit();
        info!("Added {integration} to {}", project.main_file.display());

        Ok(ToggleReport {
            integration,
            action: ToggleAction::Added,
            files: vec![project.main_file.clone(), support_path],
            changes: outcome.changes,
            install: None,
        })
    }

    fn remove_binding(
        &self,
        project: &Project,
        integration: Integration,
        support_file: &str,
    ) -> Result<ToggleReport> {
        let variable = binding_variable(&project.slug);
        let text = read_to_string(&project.main_file)?;

        if BootstrapPatcher::find_binding(SourceText::parse(&text).lines(), &variable).is_none() {
            return Err(Error::NotPresent {
                package: integration.as_str().to_string(),
            });
        }

        let outcome = self
            .patcher
            .apply(&project.main_file, &BootstrapEdit::UnbindInstance { variable })?;

        let support_path = project.root.join(support_file);
        let mut files = vec![project.main_file.clone()];
        if remove_if_exists(&support_path)? {
            files.push(support_path);
        }
        info!("Removed {integration} from {}", project.main_file.display());

        Ok(ToggleReport {
            integration,
            action: ToggleAction::Removed,
            files,
            changes: outcome.changes,
            install: None,
        })
    }
}

/// Variable the main plugin instance is bound to: the slug as an identifier.
///
/// # Examples
///
/// ```
/// use wp_trait_scaffold::integration::binding_variable;
///
/// assert_eq!(binding_variable("my-plugin"), "my_plugin");
/// assert_eq!(binding_variable("2fa"), "_2fa");
/// ```
#[must_use]
pub fn binding_variable(slug: &str) -> String {
    let mut variable: String = slug
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !variable.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        variable.insert(0, '_');
    }
    variable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_parsing() {
        assert_eq!("cmb2".parse::<Integration>().unwrap(), Integration::Cmb2);
        assert_eq!(
            "IDE-Helper".parse::<Integration>().unwrap(),
            Integration::IdeHelper
        );
        assert!(matches!(
            "acf".parse::<Integration>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_targets() {
        assert!(matches!(
            Integration::Cmb2.target(),
            IntegrationTarget::Manifest {
                package: "cmb2/cmb2",
                ..
            }
        ));
        assert!(matches!(
            Integration::IdeHelper.target(),
            IntegrationTarget::Bootstrap { .. }
        ));
    }

    #[test]
    fn test_binding_variable() {
        assert_eq!(binding_variable("my-plugin"), "my_plugin");
        assert_eq!(binding_variable("shop.v2"), "shop_v2");
        assert_eq!(binding_variable(""), "_");
    }
}
