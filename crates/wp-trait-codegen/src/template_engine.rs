//! Template engine for class and manifest generation using Handlebars.
//!
//! The template set is fixed and embedded in the binary. Variables form a flat
//! string map; a variable the caller does not supply renders as an empty
//! string because the templates are trusted, author-controlled files.
//!
//! # Examples
//!
//! ```
//! use wp_trait_codegen::template_engine::{TemplateEngine, TemplateName, TemplateVars};
//!
//! let engine = TemplateEngine::new().unwrap();
//! let vars = TemplateVars::new()
//!     .set("namespace", "MyPlugin\\Admin")
//!     .set("class", "Users");
//!
//! let php = engine.render(TemplateName::Model, &vars).unwrap();
//! assert!(php.contains("namespace MyPlugin\\Admin;"));
//! assert!(php.contains("class Users extends Model"));
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use wp_trait_core::{Error, Result};

/// Names of the built-in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateName {
    /// Plain model class
    Model,
    /// Custom post type class
    PostType,
    /// Custom taxonomy class
    Taxonomy,
    /// Initial `composer.json` for a new plugin
    ComposerFragment,
    /// IDE support file written by the `ide-helper` integration
    IdeHelper,
}

impl TemplateName {
    /// Every built-in template.
    pub const ALL: [Self; 5] = [
        Self::Model,
        Self::PostType,
        Self::Taxonomy,
        Self::ComposerFragment,
        Self::IdeHelper,
    ];

    /// Returns the registry name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::PostType => "post-type",
            Self::Taxonomy => "taxonomy",
            Self::ComposerFragment => "composer-fragment",
            Self::IdeHelper => "ide-helper",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::Model => include_str!("../templates/model.php.hbs"),
            Self::PostType => include_str!("../templates/post-type.php.hbs"),
            Self::Taxonomy => include_str!("../templates/taxonomy.php.hbs"),
            Self::ComposerFragment => include_str!("../templates/composer.json.hbs"),
            Self::IdeHelper => include_str!("../templates/ide-helper.php.hbs"),
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown template: '{s}'")))
    }
}

/// Flat, string-keyed substitution variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateVars(BTreeMap<String, String>);

impl TemplateVars {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, replacing any previous value.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Sets a variable that is substituted inside a JSON string literal.
    ///
    /// Quotes, backslashes and control characters are escaped so the rendered
    /// document stays valid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use wp_trait_codegen::template_engine::TemplateVars;
    ///
    /// let vars = TemplateVars::new().set_json("namespace_key", "MyPlugin\\");
    /// assert_eq!(vars.get("namespace_key"), Some("MyPlugin\\\\"));
    /// ```
    #[must_use]
    pub fn set_json(self, key: impl Into<String>, value: &str) -> Self {
        let quoted = serde_json::Value::String(value.to_string()).to_string();
        let escaped = quoted[1..quoted.len() - 1].to_string();
        self.set(key, escaped)
    }

    /// Returns a variable's value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Template engine for code generation.
///
/// Wraps Handlebars with every [`TemplateName`] pre-registered. HTML escaping
/// is disabled because the output is PHP and JSON source.
#[derive(Debug)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Creates a new template engine with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns error if template registration fails (should not happen
    /// with valid built-in templates).
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut engine = Self { handlebars };
        for name in TemplateName::ALL {
            engine.register_template_string(name.as_str(), name.source())?;
        }

        Ok(engine)
    }

    /// Renders a built-in template.
    ///
    /// # Errors
    ///
    /// Returns error if rendering fails.
    pub fn render(&self, template: TemplateName, vars: &TemplateVars) -> Result<String> {
        self.render_named(template.as_str(), vars)
    }

    /// Renders a template by its registry name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is not registered or rendering fails.
    pub fn render_named(&self, name: &str, vars: &TemplateVars) -> Result<String> {
        debug!("Rendering template '{name}'");
        self.handlebars
            .render(name, vars)
            .map_err(|e| Error::TemplateError {
                template: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Registers or overrides a template.
    ///
    /// # Errors
    ///
    /// Returns error if the template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                template: name.to_string(),
                message: format!("registration failed: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Class Template Tests
    // ========================================================================

    #[test]
    fn test_render_model_template() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set("namespace", "MyPlugin")
            .set("class", "Admin");

        let rendered = engine.render(TemplateName::Model, &vars).unwrap();
        assert!(rendered.starts_with("<?php\n"));
        assert!(rendered.contains("namespace MyPlugin;"));
        assert!(rendered.contains("class Admin extends Model"));
        assert!(rendered.contains("parent::__construct($plugin);"));
    }

    #[test]
    fn test_render_post_type_template() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set("namespace", "MyPlugin\\Content")
            .set("class", "Forms");

        let rendered = engine.render(TemplateName::PostType, &vars).unwrap();
        assert!(rendered.contains("namespace MyPlugin\\Content;"));
        assert!(rendered.contains("class Forms extends Model"));
        assert!(rendered.contains("register_post_type("));
    }

    #[test]
    fn test_render_taxonomy_template() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set("namespace", "MyPlugin")
            .set("class", "City");

        let rendered = engine.render(TemplateName::Taxonomy, &vars).unwrap();
        assert!(rendered.contains("class City extends Model"));
        assert!(rendered.contains("register_taxonomy("));
        assert!(rendered.contains("$post_types = array('post')"));
    }

    #[test]
    fn test_php_source_is_not_html_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set("namespace", "A\\B")
            .set("class", "C");

        let rendered = engine.render(TemplateName::PostType, &vars).unwrap();
        assert!(rendered.contains("'label' => $this->name"));
        assert!(!rendered.contains("&gt;"));
        assert!(!rendered.contains("&#x27;"));
    }

    // ========================================================================
    // Support Template Tests
    // ========================================================================

    #[test]
    fn test_render_composer_fragment_is_valid_json() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set_json("package_name", "wp-plugin/my-plugin")
            .set_json("description", "Says \"hello\"")
            .set_json("wp_trait_version", "^1.0")
            .set_json("namespace_key", "MyPlugin\\")
            .set_json("source_dir", "src/");

        let rendered = engine
            .render(TemplateName::ComposerFragment, &vars)
            .unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(manifest["description"], "Says \"hello\"");
        assert_eq!(manifest["require"]["mehrshaddarzi/wp-trait"], "^1.0");
        assert_eq!(manifest["autoload"]["psr-4"]["MyPlugin\\"], "src/");
    }

    #[test]
    fn test_render_ide_helper_template() {
        let engine = TemplateEngine::new().unwrap();
        let vars = TemplateVars::new()
            .set("plugin_slug", "my-plugin")
            .set("main_class", "MyPlugin")
            .set("variable", "my_plugin");

        let rendered = engine.render(TemplateName::IdeHelper, &vars).unwrap();
        assert!(rendered.contains("/** @var MyPlugin $my_plugin */"));
        assert!(rendered.contains("$my_plugin = null;"));
    }

    // ========================================================================
    // Variable Handling Tests
    // ========================================================================

    #[test]
    fn test_missing_variables_render_empty() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(TemplateName::Model, &TemplateVars::new())
            .unwrap();
        assert!(rendered.contains("namespace ;"));
        assert!(rendered.contains("class  extends Model"));
    }

    #[test]
    fn test_template_name_round_trip() {
        for name in TemplateName::ALL {
            assert_eq!(name.as_str().parse::<TemplateName>().unwrap(), name);
        }
        assert!("plugin".parse::<TemplateName>().is_err());
    }

    #[test]
    fn test_render_named_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine
            .render_named("nonexistent", &TemplateVars::new())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateError { .. }));
    }

    #[test]
    fn test_custom_template_override() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .register_template_string("model", "<?php // {{class}}")
            .unwrap();

        let vars = TemplateVars::new().set("class", "Admin");
        assert_eq!(
            engine.render(TemplateName::Model, &vars).unwrap(),
            "<?php // Admin"
        );
    }

    #[test]
    fn test_register_invalid_template_syntax() {
        let mut engine = TemplateEngine::new().unwrap();
        let result = engine.register_template_string("invalid", "Hello {{name");
        assert!(matches!(result, Err(Error::TemplateError { .. })));
    }

    #[test]
    fn test_set_json_escapes_control_characters() {
        let vars = TemplateVars::new().set_json("description", "line\nbreak");
        assert_eq!(vars.get("description"), Some("line\\nbreak"));
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine>();
    }
}
