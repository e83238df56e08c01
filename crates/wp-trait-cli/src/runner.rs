//! Command execution and runtime logic.
//!
//! Contains the main command dispatch, logging initialization and the mapping
//! from failures to exit codes.

use anyhow::Result;
use clap::CommandFactory;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wp_trait_core::cli::{ExitCode, OutputFormat};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::commands::config::Config;

/// Initializes logging infrastructure.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over the configured
/// level. Logs go to stderr so stdout stays parseable.
///
/// # Errors
///
/// Returns an error if logging initialization fails.
pub fn init_logging(verbose: bool, log_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Picks the output format: the `--format` flag, else the configured default.
///
/// # Errors
///
/// Returns an error if the format name is unknown.
pub fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    let name = flag.unwrap_or(&config.general.default_format);
    name.parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Executes the specified CLI command.
///
/// Routes commands to their respective handlers and returns an exit code.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn execute_command(
    command: Commands,
    output_format: OutputFormat,
    config: &Config,
) -> Result<ExitCode> {
    match command {
        Commands::Make {
            kind,
            class_path,
            slug,
            name,
            variable,
            path,
        } => commands::make::run(kind, class_path, slug, name, variable, &path, output_format),
        Commands::Add {
            package,
            path,
            no_install,
        } => commands::integration::add(&package, &path, no_install, config, output_format),
        Commands::Remove {
            package,
            path,
            no_install,
        } => commands::integration::remove(&package, &path, no_install, config, output_format),
        Commands::Start(args) => commands::start::run(args, config, output_format),
        Commands::Config { action } => commands::config::run(action, output_format),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}

/// Maps a failed command to its exit code.
///
/// Library failures keep their category; anything else (config file, output
/// formatting) is a generic error.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<wp_trait_core::Error>())
        .map_or(ExitCode::ERROR, ExitCode::from_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_for_library_errors() {
        let err = anyhow::Error::new(wp_trait_core::Error::AlreadyPresent {
            package: "cmb2".to_string(),
        });
        assert_eq!(exit_code_for(&err), ExitCode::CONFLICT);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let result: std::result::Result<(), _> = Err(wp_trait_core::Error::DependencyMissing {
            package: "mehrshaddarzi/wp-trait".to_string(),
        });
        let err = result.context("failed to make class").unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::INVALID_INPUT);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("config file unreadable");
        assert_eq!(exit_code_for(&err), ExitCode::ERROR);
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        let mut config = Config::default();
        config.general.default_format = "json".to_string();

        assert_eq!(resolve_format(None, &config).unwrap(), OutputFormat::Json);
        assert_eq!(
            resolve_format(Some("text"), &config).unwrap(),
            OutputFormat::Text
        );
        assert!(resolve_format(Some("yaml"), &config).is_err());
    }
}
