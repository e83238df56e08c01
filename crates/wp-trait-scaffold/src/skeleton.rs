//! The `start` flow: generate a new plugin with WP-CLI and make it a WP-Trait
//! project.

use crate::fs::write_atomic;
use crate::installer::{DependencyInstaller, InstallOutcome, ProcessRunner};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use wp_trait_codegen::{TemplateEngine, TemplateName, TemplateVars};
use wp_trait_core::{CommandEntry, Error, MANIFEST_FILE, Result};

/// Version constraint written for the scaffolding library.
pub const WP_TRAIT_CONSTRAINT: &str = "^1.0";

/// Options of `start`, mirroring `wp scaffold plugin`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Plugin slug; derived from the plugin name when absent
    pub slug: Option<String>,
    /// Root PHP namespace; derived from the slug when absent
    pub namespace: Option<String>,
    /// `Plugin Name:` header
    pub plugin_name: Option<String>,
    /// `Description:` header
    pub plugin_description: Option<String>,
    /// `Author:` header
    pub plugin_author: Option<String>,
    /// `Author URI:` header
    pub plugin_author_uri: Option<String>,
    /// `Plugin URI:` header
    pub plugin_uri: Option<String>,
    /// Skip unit-test files
    pub skip_tests: bool,
    /// CI provider configuration
    pub ci: Option<String>,
    /// Activate the plugin
    pub activate: bool,
    /// Network-activate the plugin
    pub activate_network: bool,
    /// Overwrite existing files
    pub force: bool,
}

impl StartOptions {
    /// Returns the plugin slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if neither a slug nor a plugin name
    /// yields one.
    pub fn resolved_slug(&self) -> Result<String> {
        let slug = match (&self.slug, &self.plugin_name) {
            (Some(slug), _) => slugify(slug),
            (None, Some(name)) => slugify(name),
            (None, None) => String::new(),
        };
        if slug.is_empty() {
            return Err(Error::InvalidArgument(
                "a plugin slug or plugin name is required".to_string(),
            ));
        }
        Ok(slug)
    }

    /// Returns the root namespace for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the namespace is not a valid
    /// PHP namespace.
    pub fn resolved_namespace(&self, slug: &str) -> Result<String> {
        let namespace = self
            .namespace
            .as_deref()
            .map_or_else(|| pascal_case(slug), |ns| ns.trim_matches('\\').to_string());

        let valid = !namespace.is_empty()
            && namespace.split('\\').all(|part| {
                part.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if valid {
            Ok(namespace)
        } else {
            Err(Error::InvalidArgument(format!(
                "'{namespace}' is not a valid PHP namespace"
            )))
        }
    }

    /// Builds the `wp scaffold plugin` command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no slug can be derived.
    pub fn scaffold_command(&self, wp_binary: &str, dir: &Path) -> Result<Vec<String>> {
        let mut command = vec![
            wp_binary.to_string(),
            "scaffold".to_string(),
            "plugin".to_string(),
            self.resolved_slug()?,
            format!("--dir={}", dir.display()),
        ];

        for (flag, value) in self.header_fields() {
            if let Some(value) = value {
                command.push(format!("--{flag}={value}"));
            }
        }
        if let Some(ci) = &self.ci {
            command.push(format!("--ci={ci}"));
        }
        for (flag, enabled) in self.switches() {
            if enabled {
                command.push(format!("--{flag}"));
            }
        }
        Ok(command)
    }

    /// The invocation as recorded in the command log.
    #[must_use]
    pub fn command_entry(&self, dir: &Path) -> CommandEntry {
        let mut entry = CommandEntry::new("start").assoc("dir", dir.display().to_string());
        for (key, value) in [
            ("slug", self.slug.as_deref()),
            ("namespace", self.namespace.as_deref()),
        ]
        .into_iter()
        .chain(self.header_fields())
        .chain([("ci", self.ci.as_deref())])
        {
            if let Some(value) = value {
                entry = entry.assoc(key, value);
            }
        }
        for (flag, enabled) in self.switches() {
            if enabled {
                entry = entry.assoc(flag, "true");
            }
        }
        entry
    }

    fn header_fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("plugin_name", self.plugin_name.as_deref()),
            ("plugin_description", self.plugin_description.as_deref()),
            ("plugin_author", self.plugin_author.as_deref()),
            ("plugin_author_uri", self.plugin_author_uri.as_deref()),
            ("plugin_uri", self.plugin_uri.as_deref()),
        ]
    }

    const fn switches(&self) -> [(&'static str, bool); 4] {
        [
            ("skip-tests", self.skip_tests),
            ("activate", self.activate),
            ("activate-network", self.activate_network),
            ("force", self.force),
        ]
    }
}

/// Summary of a generated plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartReport {
    /// Plugin slug
    pub slug: String,
    /// Root PHP namespace
    pub namespace: String,
    /// Plugin directory
    pub directory: PathBuf,
    /// Written `composer.json`
    pub manifest: PathBuf,
    /// Dependency installation
    pub install: InstallOutcome,
}

/// Generates new plugins.
#[derive(Debug)]
pub struct PluginSkeleton<'a> {
    runner: &'a dyn ProcessRunner,
    installer: &'a dyn DependencyInstaller,
    engine: TemplateEngine,
    wp_binary: String,
}

impl<'a> PluginSkeleton<'a> {
    /// Creates a generator running WP-CLI through `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// register.
    pub fn new(
        runner: &'a dyn ProcessRunner,
        installer: &'a dyn DependencyInstaller,
    ) -> Result<Self> {
        Ok(Self {
            runner,
            installer,
            engine: TemplateEngine::new()?,
            wp_binary: "wp".to_string(),
        })
    }

    /// Sets the WP-CLI executable.
    #[must_use]
    pub fn with_wp_binary(mut self, binary: impl Into<String>) -> Self {
        self.wp_binary = binary.into();
        self
    }

    /// Generates a plugin below `parent_dir`.
    ///
    /// Runs `wp scaffold plugin`, writes a `composer.json` requiring the
    /// scaffolding library with a PSR-4 mapping onto `src/`, creates `src/`
    /// and installs dependencies.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a missing slug or bad namespace
    /// - [`Error::TargetExists`] if `composer.json` exists and `force` is off;
    ///   checked before WP-CLI runs
    /// - [`Error::ProcessFailed`] from WP-CLI or Composer
    /// - [`Error::WriteFailed`] for I/O failures
    pub fn generate(&self, parent_dir: &Path, options: &StartOptions) -> Result<StartReport> {
        let slug = options.resolved_slug()?;
        let namespace = options.resolved_namespace(&slug)?;
        let directory = parent_dir.join(&slug);
        let manifest = directory.join(MANIFEST_FILE);

        if manifest.exists() && !options.force {
            return Err(Error::TargetExists { path: manifest });
        }

        let command = options.scaffold_command(&self.wp_binary, parent_dir)?;
        self.runner.run(parent_dir, &command)?;

        let vendor = options
            .plugin_author
            .as_deref()
            .map(slugify)
            .filter(|vendor| !vendor.is_empty())
            .unwrap_or_else(|| "wp-plugin".to_string());
        let description = options
            .plugin_description
            .as_deref()
            .or(options.plugin_name.as_deref())
            .unwrap_or_default();

        let vars = TemplateVars::new()
            .set_json("package_name", &format!("{vendor}/{slug}"))
            .set_json("description", description)
            .set_json("wp_trait_version", WP_TRAIT_CONSTRAINT)
            .set_json("namespace_key", &format!("{namespace}\\"))
            .set_json("source_dir", "src/");
        let content = self.engine.render(TemplateName::ComposerFragment, &vars)?;

        fs::create_dir_all(directory.join("src")).map_err(|source| Error::WriteFailed {
            path: directory.join("src"),
            source,
        })?;
        write_atomic(&manifest, &content)?;
        info!("Wrote {}", manifest.display());

        let install = self.installer.install(&directory)?;

        Ok(StartReport {
            slug,
            namespace,
            directory,
            manifest,
            install,
        })
    }
}

/// Lower-case, hyphen-separated form of `name`.
fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn pascal_case(slug: &str) -> String {
    slug.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> StartOptions {
        StartOptions {
            plugin_name: Some("My Plugin".to_string()),
            ..StartOptions::default()
        }
    }

    #[test]
    fn test_slug_and_namespace_derivation() {
        let options = options();
        let slug = options.resolved_slug().unwrap();
        assert_eq!(slug, "my-plugin");
        assert_eq!(options.resolved_namespace(&slug).unwrap(), "MyPlugin");
    }

    #[test]
    fn test_explicit_namespace() {
        let options = StartOptions {
            namespace: Some("\\Acme\\Shop\\".to_string()),
            ..options()
        };
        assert_eq!(options.resolved_namespace("x").unwrap(), "Acme\\Shop");

        let bad = StartOptions {
            namespace: Some("Acme\\9Shop".to_string()),
            ..self::options()
        };
        assert!(bad.resolved_namespace("x").is_err());
    }

    #[test]
    fn test_slug_is_required() {
        assert!(matches!(
            StartOptions::default().resolved_slug(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_scaffold_command() {
        let options = StartOptions {
            slug: Some("my-plugin".to_string()),
            plugin_author: Some("Jane".to_string()),
            ci: Some("gitlab".to_string()),
            skip_tests: true,
            activate: true,
            ..options()
        };
        let command = options
            .scaffold_command("wp", Path::new("/srv/plugins"))
            .unwrap();
        assert_eq!(
            command,
            [
                "wp",
                "scaffold",
                "plugin",
                "my-plugin",
                "--dir=/srv/plugins",
                "--plugin_name=My Plugin",
                "--plugin_author=Jane",
                "--ci=gitlab",
                "--skip-tests",
                "--activate",
            ]
        );
    }

    #[test]
    fn test_command_entry_is_stable() {
        let dir = Path::new("/srv/plugins");
        let entry = options().command_entry(dir);
        assert_eq!(entry, options().command_entry(dir));
        assert_eq!(entry.command, "start");
        assert_eq!(entry.assoc_args["plugin_name"], "My Plugin");
        assert_eq!(entry.assoc_args["dir"], "/srv/plugins");

        let forced = StartOptions {
            force: true,
            ..options()
        };
        assert_ne!(entry, forced.command_entry(dir));
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(slugify("  Hello, World 2 "), "hello-world-2");
        assert_eq!(pascal_case("my-shop_v2"), "MyShopV2");
    }
}
