//! Shell completion generation command.
//!
//! Generates shell completion scripts for bash, zsh, fish, and `PowerShell`.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};
use tracing::info;
use wp_trait_core::cli::ExitCode;

/// Writes the completion script for `shell` to `out`.
pub fn generate_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    info!("Generating {} completions", shell);
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Runs the completions command, printing the script to stdout.
///
/// # Examples
///
/// ```no_run
/// use clap::CommandFactory;
/// use clap_complete::Shell;
/// use wp_trait_cli::cli::Cli;
/// use wp_trait_cli::commands::completions;
///
/// let mut cmd = Cli::command();
/// completions::run(Shell::Bash, &mut cmd).unwrap();
/// ```
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    generate_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::CommandFactory;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        generate_completions(shell, &mut Cli::command(), &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bash_completions_list_subcommands() {
        let script = script(Shell::Bash);
        assert!(script.contains("wp-trait"));
        assert!(script.contains("make"));
        assert!(script.contains("remove"));
    }

    #[test]
    fn test_every_shell_generates() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty(), "{shell} produced no script");
        }
    }
}
