//! Config command implementation.
//!
//! Manages the optional CLI configuration file.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/wp-trait/config.toml`
//! - macOS: `~/Library/Application Support/wp-trait/config.toml`
//! - Windows: `%APPDATA%\wp-trait\config.toml`
//!
//! A missing file means defaults.

use crate::actions::ConfigAction;
use crate::formatters::{format_output, print_report};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wp_trait_core::cli::{ExitCode, OutputFormat};

/// Every key accepted by `config get` and `config set`.
pub const CONFIG_KEYS: [&str; 5] = [
    "general.default_format",
    "general.log_level",
    "composer.binary",
    "composer.install_args",
    "wp.binary",
];

/// CLI configuration.
///
/// # Examples
///
/// ```toml
/// [general]
/// default_format = "pretty"
/// log_level = "info"
///
/// [composer]
/// binary = "composer"
/// install_args = ["update"]
///
/// [wp]
/// binary = "wp"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Composer invocation
    #[serde(default)]
    pub composer: ComposerConfig,

    /// WP-CLI invocation
    #[serde(default)]
    pub wp: WpConfig,
}

/// General configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format (json, text, pretty)
    pub default_format: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// How dependencies are installed after the manifest changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ComposerConfig {
    /// Composer executable
    pub binary: String,

    /// Arguments passed to Composer
    pub install_args: Vec<String>,
}

/// WP-CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WpConfig {
    /// WP-CLI executable
    pub binary: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_format: "pretty".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            binary: "composer".to_string(),
            install_args: vec!["update".to_string()],
        }
    }
}

impl Default for WpConfig {
    fn default() -> Self {
        Self {
            binary: "wp".to_string(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let valid_formats = ["json", "text", "pretty"];
        if !valid_formats.contains(&self.general.default_format.as_str()) {
            anyhow::bail!(
                "invalid default_format '{}', must be one of: {}",
                self.general.default_format,
                valid_formats.join(", ")
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            anyhow::bail!(
                "invalid log_level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            );
        }

        if self.composer.binary.trim().is_empty() {
            anyhow::bail!("composer.binary must not be empty");
        }

        if self.composer.install_args.is_empty() {
            anyhow::bail!("composer.install_args must name at least one argument");
        }

        if self.wp.binary.trim().is_empty() {
            anyhow::bail!("wp.binary must not be empty");
        }

        Ok(())
    }

    /// Returns the value stored under `key`, if the key exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "general.default_format" => Some(self.general.default_format.clone()),
            "general.log_level" => Some(self.general.log_level.clone()),
            "composer.binary" => Some(self.composer.binary.clone()),
            "composer.install_args" => Some(self.composer.install_args.join(", ")),
            "wp.binary" => Some(self.wp.binary.clone()),
            _ => None,
        }
    }

    /// Sets `key` to `value`. List values are comma-separated.
    ///
    /// The result is not validated; [`save_config_to`] does that.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "general.default_format" => self.general.default_format = value.to_string(),
            "general.log_level" => self.general.log_level = value.to_string(),
            "composer.binary" => self.composer.binary = value.to_string(),
            "composer.install_args" => {
                self.composer.install_args = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "wp.binary" => self.wp.binary = value.to_string(),
            _ => anyhow::bail!(
                "unknown configuration key: {key}\n\nAvailable keys:\n{}",
                available_keys()
            ),
        }
        Ok(())
    }
}

fn available_keys() -> String {
    CONFIG_KEYS
        .iter()
        .map(|key| format!("- {key}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Gets the default configuration file path.
///
/// # Errors
///
/// Returns an error if the platform config directory is unknown.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("failed to determine config directory")?;

    Ok(config_dir.join("wp-trait").join("config.toml"))
}

/// Loads configuration from the default location or returns defaults.
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

/// Loads configuration from `path` or returns defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).context("failed to read config file")?;

    let config: Config = toml::from_str(&content).context("failed to parse config file")?;

    config.validate()?;

    Ok(config)
}

/// Validates and writes `config` to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    let toml_str = toml::to_string_pretty(config).context("failed to serialize config")?;

    fs::write(path, toml_str).context("failed to write config file")?;

    debug!("Saved config to {}", path.display());

    Ok(())
}

/// Initialization result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitResult {
    /// Whether a new file was written
    pub created: bool,
    /// Status message
    pub message: String,
    /// Config file location
    pub path: String,
}

/// Configuration value result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigValue {
    /// Configuration key
    pub key: String,
    /// Configuration value
    pub value: String,
}

/// Runs the config command against the default config file.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, validated or
/// written.
pub fn run(action: ConfigAction, output_format: OutputFormat) -> Result<ExitCode> {
    run_at(&get_config_path()?, action, output_format)
}

/// Runs the config command against the file at `path`.
pub fn run_at(path: &Path, action: ConfigAction, output_format: OutputFormat) -> Result<ExitCode> {
    info!("Config action: {:?}", action);

    match action {
        ConfigAction::Init => init_config(path, output_format),
        ConfigAction::Show => show_config(path, output_format),
        ConfigAction::Get { key } => get_config(path, key, output_format),
        ConfigAction::Set { key, value } => set_config(path, key, value, output_format),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Creates a default configuration file. Never overwrites an existing one.
fn init_config(path: &Path, output_format: OutputFormat) -> Result<ExitCode> {
    if path.exists() {
        let result = InitResult {
            created: false,
            message: "configuration file already exists".to_string(),
            path: path.display().to_string(),
        };
        println!("{}", format_output(&result, output_format)?);
        return Ok(ExitCode::SUCCESS);
    }

    save_config_to(path, &Config::default())?;

    let result = InitResult {
        created: true,
        message: "configuration file created with default values".to_string(),
        path: path.display().to_string(),
    };
    print_report("Configuration initialized.", &result, output_format)?;

    Ok(ExitCode::SUCCESS)
}

fn show_config(path: &Path, output_format: OutputFormat) -> Result<ExitCode> {
    let config = load_config_from(path)?;

    let formatted =
        format_output(&config, output_format).context("failed to format configuration")?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}

fn get_config(path: &Path, key: String, output_format: OutputFormat) -> Result<ExitCode> {
    let config = load_config_from(path)?;

    let Some(value) = config.get(&key) else {
        anyhow::bail!(
            "configuration key '{key}' not found\n\nAvailable keys:\n{}",
            available_keys()
        );
    };

    let result = ConfigValue { key, value };
    println!("{}", format_output(&result, output_format)?);
    Ok(ExitCode::SUCCESS)
}

fn set_config(path: &Path, key: String, value: String, output_format: OutputFormat) -> Result<ExitCode> {
    let mut config = load_config_from(path)?;
    config.set(&key, &value)?;
    save_config_to(path, &config)?;

    let message = format!("Set '{key}' to '{value}'.");
    print_report(&message, &ConfigValue { key, value }, output_format)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(temp: &TempDir) -> PathBuf {
        temp.path().join("wp-trait").join("config.toml")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.default_format, "pretty");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.composer.binary, "composer");
        assert_eq!(config.composer.install_args, vec!["update"]);
        assert_eq!(config.wp.binary, "wp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.general.default_format = "yaml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.composer.install_args.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wp.binary = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml_str = r#"
            [composer]
            binary = "/opt/composer.phar"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.composer.binary, "/opt/composer.phar");
        assert_eq!(config.composer.install_args, vec!["update"]);
        assert_eq!(config.general, GeneralConfig::default());
        assert_eq!(config.wp, WpConfig::default());
    }

    #[test]
    fn test_get_and_set_by_key() {
        let mut config = Config::default();

        config.set("composer.install_args", "install, --no-dev").unwrap();
        assert_eq!(config.composer.install_args, vec!["install", "--no-dev"]);
        assert_eq!(
            config.get("composer.install_args").as_deref(),
            Some("install, --no-dev")
        );

        config.set("wp.binary", "/usr/local/bin/wp").unwrap();
        assert_eq!(config.get("wp.binary").as_deref(), Some("/usr/local/bin/wp"));

        assert!(config.set("runtime.timeout", "5").is_err());
        assert_eq!(config.get("runtime.timeout"), None);
    }

    #[test]
    fn test_every_listed_key_is_readable() {
        let config = Config::default();
        for key in CONFIG_KEYS {
            assert!(config.get(key).is_some(), "{key} not readable");
        }
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(&config_path(&temp)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        let mut config = Config::default();
        config.general.default_format = "json".to_string();

        save_config_to(&path, &config).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[general]"));
        assert!(content.contains("[composer]"));
        assert!(content.contains("[wp]"));

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[general]\nlog_level = \"loud\"\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);

        run_at(&path, ConfigAction::Init, OutputFormat::Json).unwrap();
        assert!(path.exists());

        fs::write(&path, "[wp]\nbinary = \"custom-wp\"\n").unwrap();
        run_at(&path, ConfigAction::Init, OutputFormat::Json).unwrap();
        assert_eq!(load_config_from(&path).unwrap().wp.binary, "custom-wp");
    }

    #[test]
    fn test_set_validates_before_saving() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);

        let result = run_at(
            &path,
            ConfigAction::Set {
                key: "general.default_format".to_string(),
                value: "xml".to_string(),
            },
            OutputFormat::Json,
        );
        assert!(result.is_err());
        assert!(!path.exists());

        let code = run_at(
            &path,
            ConfigAction::Set {
                key: "general.default_format".to_string(),
                value: "text".to_string(),
            },
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(load_config_from(&path).unwrap().general.default_format, "text");
    }

    #[test]
    fn test_get_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        let result = run_at(
            &config_path(&temp),
            ConfigAction::Get {
                key: "nonexistent.key".to_string(),
            },
            OutputFormat::Json,
        );
        assert!(result.is_err());
    }
}
