//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use wp_trait_scaffold::StartOptions;

use crate::actions::{ConfigAction, MakeKind};

/// WP-Trait - scaffolding for object-oriented WordPress plugins.
///
/// Generates classes into a WP-Trait plugin and wires them into its main
/// plugin file, toggles optional integrations, and creates new plugins.
#[derive(Parser, Debug)]
#[command(name = "wp-trait")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text, pretty); defaults to the configured format
    #[arg(long = "format", global = true)]
    pub format: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a class and wire it into the main plugin file.
    ///
    /// The class path is relative to the project's root namespace; `/`, `\`
    /// and `.` separate sub-namespaces.
    ///
    /// # Examples
    ///
    /// ```bash
    /// wp-trait make model Admin
    /// wp-trait make post-type Forms
    /// wp-trait make taxonomy Geo/City city "City"
    /// ```
    Make {
        /// Kind of class to generate
        #[arg(value_enum)]
        kind: MakeKind,

        /// Class path, e.g. `Admin/Users`
        class_path: String,

        /// Registration slug (post types and taxonomies)
        slug: Option<String>,

        /// Singular display name (post types and taxonomies)
        name: Option<String>,

        /// Property name on the main plugin class
        #[arg(long = "var")]
        variable: Option<String>,

        /// Project root
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Add an optional integration (`cmb2`, `ide-helper`).
    Add {
        /// Integration name
        package: String,

        /// Project root
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Do not run Composer after changing composer.json
        #[arg(long)]
        no_install: bool,
    },

    /// Remove an integration previously added with `add`.
    Remove {
        /// Integration name
        package: String,

        /// Project root
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Do not run Composer after changing composer.json
        #[arg(long)]
        no_install: bool,
    },

    /// Generate a new WP-Trait plugin with WP-CLI.
    ///
    /// Runs `wp scaffold plugin`, then writes a composer.json requiring the
    /// WP-Trait library with a PSR-4 mapping onto `src/`. Asks for
    /// confirmation unless `--yes` is given or the same command was run
    /// within the last two minutes.
    Start(StartArgs),

    /// Manage CLI configuration.
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    ///
    /// Generates completion scripts for various shells that can be
    /// sourced or saved to enable tab completion for this CLI.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags of `start`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StartArgs {
    /// Plugin slug; derived from the plugin name when omitted
    #[arg(long)]
    pub slug: Option<String>,

    /// Root PHP namespace; derived from the slug when omitted
    #[arg(long)]
    pub namespace: Option<String>,

    /// Plugin name header
    #[arg(long = "plugin_name")]
    pub plugin_name: Option<String>,

    /// Plugin description header
    #[arg(long = "plugin_description")]
    pub plugin_description: Option<String>,

    /// Plugin author header
    #[arg(long = "plugin_author")]
    pub plugin_author: Option<String>,

    /// Plugin author URI header
    #[arg(long = "plugin_author_uri")]
    pub plugin_author_uri: Option<String>,

    /// Plugin URI header
    #[arg(long = "plugin_uri")]
    pub plugin_uri: Option<String>,

    /// Do not generate unit-test files
    #[arg(long)]
    pub skip_tests: bool,

    /// CI configuration to generate (travis, circle, gitlab, bitbucket, github)
    #[arg(long)]
    pub ci: Option<String>,

    /// Activate the plugin after generation
    #[arg(long)]
    pub activate: bool,

    /// Network-activate the plugin after generation
    #[arg(long)]
    pub activate_network: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Directory the plugin directory is created in
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

impl From<StartArgs> for StartOptions {
    fn from(args: StartArgs) -> Self {
        Self {
            slug: args.slug,
            namespace: args.namespace,
            plugin_name: args.plugin_name,
            plugin_description: args.plugin_description,
            plugin_author: args.plugin_author,
            plugin_author_uri: args.plugin_author_uri,
            plugin_uri: args.plugin_uri,
            skip_tests: args.skip_tests,
            ci: args.ci,
            activate: args.activate,
            activate_network: args.activate_network,
            force: args.force,
        }
    }
}
