//! WP-Trait CLI.
//!
//! Scaffolds classes into WP-Trait plugins, toggles optional integrations
//! and generates new plugins.
//!
//! # Examples
//!
//! ```bash
//! # Generate a custom post type and wire it into the main plugin file
//! wp-trait make post-type Forms
//!
//! # Add the CMB2 metabox library
//! wp-trait add cmb2
//!
//! # Generate a new plugin (asks for confirmation)
//! wp-trait start --plugin_name="My Plugin"
//! ```

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use wp_trait_cli::cli::Cli;
use wp_trait_cli::commands::config::{Config, load_config};
use wp_trait_cli::runner::{execute_command, exit_code_for, init_logging, resolve_format};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file must not lock the user out of `config set`
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("{} ignoring config file: {e:#}", "Warning:".yellow().bold());
        Config::default()
    });

    init_logging(cli.verbose, &config.general.log_level)?;

    let output_format = resolve_format(cli.format.as_deref(), &config)?;

    let exit_code = match execute_command(cli.command, output_format, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code.as_i32());
}
