//! Action type definitions for CLI commands.
//!
//! Defines the action enums used by various commands.

use clap::{Subcommand, ValueEnum};
use wp_trait_scaffold::ClassKind;

/// Kinds of class `make` can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MakeKind {
    /// Plain model class
    Model,
    /// Custom post type
    PostType,
    /// Custom taxonomy
    Taxonomy,
}

impl From<MakeKind> for ClassKind {
    fn from(kind: MakeKind) -> Self {
        match kind {
            MakeKind::Model => Self::Model,
            MakeKind::PostType => Self::PostType,
            MakeKind::Taxonomy => Self::Taxonomy,
        }
    }
}

/// Configuration management actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Create a config file with default values
    Init,

    /// Show the effective configuration
    Show,

    /// Get a single value
    Get {
        /// Key path (e.g. `composer.binary`)
        key: String,
    },

    /// Set a single value
    Set {
        /// Key path (e.g. `general.log_level`)
        key: String,
        /// New value; lists are comma-separated
        value: String,
    },

    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_kind_maps_to_class_kind() {
        assert_eq!(ClassKind::from(MakeKind::Model), ClassKind::Model);
        assert_eq!(ClassKind::from(MakeKind::PostType), ClassKind::PostType);
        assert_eq!(ClassKind::from(MakeKind::Taxonomy), ClassKind::Taxonomy);
    }

    #[test]
    fn test_make_kind_cli_names_match_class_kind() {
        for kind in MakeKind::value_variants() {
            let name = kind.to_possible_value().unwrap();
            assert_eq!(name.get_name(), ClassKind::from(*kind).as_str());
        }
    }
}
