//! External process seam.
//!
//! Dependency installation and plugin-skeleton generation are delegated to
//! Composer and WP-CLI. Both run as blocking child processes behind the
//! [`ProcessRunner`] trait so that tests can record invocations instead of
//! spawning anything.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};
use wp_trait_core::{Error, Result};

/// Runs an external command to completion.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wp_trait_core::Result;
/// use wp_trait_scaffold::installer::ProcessRunner;
///
/// #[derive(Debug)]
/// struct DryRun;
///
/// impl ProcessRunner for DryRun {
///     fn run(&self, _working_dir: &Path, command: &[String]) -> Result<()> {
///         println!("would run: {}", command.join(" "));
///         Ok(())
///     }
/// }
///
/// DryRun.run(Path::new("."), &["composer".into(), "update".into()]).unwrap();
/// ```
pub trait ProcessRunner: Send + Sync + fmt::Debug {
    /// Runs `command` (program followed by arguments) in `working_dir`.
    ///
    /// No timeout is applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessFailed`] if the program cannot be started or
    /// exits unsuccessfully.
    fn run(&self, working_dir: &Path, command: &[String]) -> Result<()>;
}

/// Runs commands as child processes sharing this process's stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, working_dir: &Path, command: &[String]) -> Result<()> {
        let rendered = command.join(" ");
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::InvalidArgument("empty command".to_string()))?;

        debug!("Running '{rendered}' in {}", working_dir.display());
        let status = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::inherit())
            .status()
            .map_err(|e| Error::ProcessFailed {
                command: rendered.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ProcessFailed {
                command: rendered,
                message: status.code().map_or_else(
                    || "terminated by signal".to_string(),
                    |code| format!("exit status {code}"),
                ),
            })
        }
    }
}

/// Result of an installation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    /// Dependencies were installed
    Installed,
    /// Installation was not requested
    Skipped,
}

/// Brings a project's installed dependencies in line with its manifest.
pub trait DependencyInstaller: Send + Sync + fmt::Debug {
    /// Installs dependencies for the project at `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessFailed`] if installation fails.
    fn install(&self, working_dir: &Path) -> Result<InstallOutcome>;
}

/// Runs `composer <args>`.
#[derive(Debug)]
pub struct ComposerInstaller<R: ProcessRunner = SystemRunner> {
    runner: R,
    binary: String,
    args: Vec<String>,
}

impl ComposerInstaller<SystemRunner> {
    /// Creates an installer running `composer update` as a child process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for ComposerInstaller<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> ComposerInstaller<R> {
    /// Creates an installer with a custom runner.
    #[must_use]
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            binary: "composer".to_string(),
            args: vec!["update".to_string()],
        }
    }

    /// Sets the Composer executable.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sets the arguments passed to Composer.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Returns the full command line.
    #[must_use]
    pub fn command(&self) -> Vec<String> {
        std::iter::once(self.binary.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl<R: ProcessRunner> DependencyInstaller for ComposerInstaller<R> {
    fn install(&self, working_dir: &Path) -> Result<InstallOutcome> {
        self.runner.run(working_dir, &self.command())?;
        info!("Installed dependencies in {}", working_dir.display());
        Ok(InstallOutcome::Installed)
    }
}

/// Installer that does nothing, for `--no-install`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipInstall;

impl DependencyInstaller for SkipInstall {
    fn install(&self, working_dir: &Path) -> Result<InstallOutcome> {
        debug!("Skipping dependency installation in {}", working_dir.display());
        Ok(InstallOutcome::Skipped)
    }
}
