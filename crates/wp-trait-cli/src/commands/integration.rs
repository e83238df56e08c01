//! Add and remove command implementations.
//!
//! Toggles optional integrations. Manifest integrations run Composer
//! afterwards unless `--no-install` is given.

use crate::commands::config::Config;
use crate::formatters::print_report;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use wp_trait_core::cli::{ExitCode, OutputFormat};
use wp_trait_scaffold::{
    ComposerInstaller, DependencyInstaller, Integration, IntegrationToggle, SkipInstall,
    ToggleAction,
};

/// Builds the Composer installer described by the configuration.
#[must_use]
pub fn composer_installer(config: &Config) -> ComposerInstaller {
    ComposerInstaller::new()
        .with_binary(config.composer.binary.clone())
        .with_args(config.composer.install_args.clone())
}

/// Runs `add <package>`.
///
/// # Errors
///
/// Returns an error for an unknown package, an invalid project, an
/// integration that is already present or a failed Composer run.
pub fn add(
    package: &str,
    path: &Path,
    no_install: bool,
    config: &Config,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    toggle(package, path, no_install, config, output_format, ToggleAction::Added)
}

/// Runs `remove <package>`.
///
/// # Errors
///
/// Returns an error for an unknown package, an invalid project, an
/// integration that is not present or a failed Composer run.
pub fn remove(
    package: &str,
    path: &Path,
    no_install: bool,
    config: &Config,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    toggle(package, path, no_install, config, output_format, ToggleAction::Removed)
}

fn toggle(
    package: &str,
    path: &Path,
    no_install: bool,
    config: &Config,
    output_format: OutputFormat,
    action: ToggleAction,
) -> Result<ExitCode> {
    let integration: Integration = package.parse()?;
    info!("{:?} {} in {}", action, integration, path.display());

    let composer = composer_installer(config);
    let installer: &dyn DependencyInstaller = if no_install { &SkipInstall } else { &composer };
    let toggle = IntegrationToggle::new(installer)?;

    let (report, verb) = match action {
        ToggleAction::Added => (
            toggle
                .add(path, integration)
                .with_context(|| format!("failed to add '{integration}'"))?,
            "Added",
        ),
        ToggleAction::Removed => (
            toggle
                .remove(path, integration)
                .with_context(|| format!("failed to remove '{integration}'"))?,
            "Removed",
        ),
    };

    print_report(&format!("{verb} {integration}."), &report, output_format)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::exit_code_for;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_composer_installer_follows_config() {
        let mut config = Config::default();
        config.composer.binary = "/opt/composer.phar".to_string();
        config.composer.install_args = vec!["install".to_string(), "--no-dev".to_string()];

        assert_eq!(
            composer_installer(&config).command(),
            ["/opt/composer.phar", "install", "--no-dev"]
        );
    }

    #[test]
    fn test_unknown_package_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = add(
            "acf",
            temp.path(),
            true,
            &Config::default(),
            OutputFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown package 'acf'"));
        assert_eq!(exit_code_for(&err), ExitCode::ERROR);
    }

    #[test]
    fn test_add_without_install_touches_only_manifest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("my-plugin");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("composer.json"),
            r#"{
    "require": {
        "mehrshaddarzi/wp-trait": "^1.0"
    },
    "autoload": {
        "psr-4": {
            "MyPlugin\\": "src/"
        }
    }
}
"#,
        )
        .unwrap();
        fs::write(root.join("my-plugin.php"), "<?php\n").unwrap();

        let code = add("CMB2", &root, true, &Config::default(), OutputFormat::Json).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let manifest = fs::read_to_string(root.join("composer.json")).unwrap();
        assert!(manifest.contains("\"cmb2/cmb2\": \"dev-master\""));
        assert!(!root.join("vendor").exists());

        let err = add("cmb2", &root, true, &Config::default(), OutputFormat::Json).unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::CONFLICT);
    }
}
