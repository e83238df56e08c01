//! Start command implementation.
//!
//! Generates a new plugin with `wp scaffold plugin` and turns it into a
//! WP-Trait project. The command is gated by a confirmation: `--yes`, the same
//! command repeated within two minutes, or an interactive prompt.

use crate::cli::StartArgs;
use crate::commands::config::Config;
use crate::commands::integration::composer_installer;
use crate::formatters::print_report;
use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use tracing::{debug, info};
use wp_trait_core::cli::{ExitCode, OutputFormat};
use wp_trait_core::{CommandEntry, CommandLog, Confirmation, Error};
use wp_trait_scaffold::{
    DependencyInstaller, PluginSkeleton, ProcessRunner, StartOptions, SystemRunner,
};

/// Runs the start command with the system's WP-CLI and Composer.
///
/// # Errors
///
/// Returns an error if the options are invalid, the command log is
/// unavailable, WP-CLI or Composer fail, or `composer.json` exists without
/// `--force`.
pub fn run(args: StartArgs, config: &Config, output_format: OutputFormat) -> Result<ExitCode> {
    let log = CommandLog::new().context("failed to open the command log")?;
    let composer = composer_installer(config);

    run_with(
        args,
        &SystemRunner,
        &composer,
        &config.wp.binary,
        &log,
        prompt,
        output_format,
    )
}

/// Runs the start command with explicit collaborators.
pub fn run_with<F>(
    args: StartArgs,
    runner: &dyn ProcessRunner,
    installer: &dyn DependencyInstaller,
    wp_binary: &str,
    log: &CommandLog,
    ask: F,
    output_format: OutputFormat,
) -> Result<ExitCode>
where
    F: FnOnce(&StartOptions) -> wp_trait_core::Result<bool>,
{
    let yes = args.yes;
    let dir = args.path.clone();
    let options = StartOptions::from(args);
    let entry = options.command_entry(&dir);

    let confirmation = confirm(log, &entry, yes, || ask(&options))?;
    debug!("Start confirmation: {:?}", confirmation);
    if !confirmation.is_confirmed() {
        println!("{}", "Cancelled.".yellow());
        println!("Run the same command again within two minutes to confirm.");
        return Ok(ExitCode::SUCCESS);
    }

    let skeleton = PluginSkeleton::new(runner, installer)?.with_wp_binary(wp_binary);
    let report = skeleton
        .generate(&dir, &options)
        .context("failed to generate plugin")?;
    info!("Generated plugin {}", report.slug);

    let message = format!("Plugin '{}' generated.", report.slug);
    print_report(&message, &report, output_format)?;
    Ok(ExitCode::SUCCESS)
}

/// Decides whether `entry` may run.
///
/// `--yes` confirms without touching the log; otherwise the log decides or
/// `ask` is consulted.
///
/// # Errors
///
/// Returns an error if the log cannot be accessed or `ask` fails.
pub fn confirm<F>(
    log: &CommandLog,
    entry: &CommandEntry,
    yes: bool,
    ask: F,
) -> wp_trait_core::Result<Confirmation>
where
    F: FnOnce() -> wp_trait_core::Result<bool>,
{
    if yes {
        return Ok(Confirmation::Prompted);
    }
    log.confirm(entry, ask)
}

fn prompt(options: &StartOptions) -> wp_trait_core::Result<bool> {
    let slug = options.resolved_slug()?;
    Confirm::new()
        .with_prompt(format!("Generate plugin '{slug}' with WP-CLI?"))
        .default(false)
        .interact()
        .map_err(|e| {
            Error::InvalidArgument(format!("confirmation prompt failed ({e}); pass --yes"))
        })
}
