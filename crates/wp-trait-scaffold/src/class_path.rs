//! Class path resolution.
//!
//! Turns a class path such as `Admin/Users/List` into the file to create, its
//! namespace, the bootstrap property that will hold the instance, and the
//! statement that constructs it.

use crate::manifest::NamespaceMapping;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use wp_trait_codegen::{TemplateName, TemplateVars};
use wp_trait_core::{Error, Result};

/// Property names already used by the WP-Trait base classes.
///
/// A requested variable equal to one of these is stored with its first letter
/// upper-cased instead.
pub const RESERVED_VARIABLE_NAMES: [&str; 19] = [
    "plugin",
    "post",
    "user",
    "term",
    "comment",
    "option",
    "meta",
    "attachment",
    "db",
    "wp",
    "query",
    "request",
    "rest",
    "ajax",
    "cache",
    "log",
    "constant",
    "hooks",
    "route",
];

/// Maps a requested variable name to the property name that is stored.
///
/// # Examples
///
/// ```
/// use wp_trait_scaffold::class_path::resolve_variable_name;
///
/// assert_eq!(resolve_variable_name("post"), "Post");
/// assert_eq!(resolve_variable_name("Post"), "Post");
/// assert_eq!(resolve_variable_name("forms"), "forms");
/// ```
#[must_use]
pub fn resolve_variable_name(name: &str) -> String {
    if RESERVED_VARIABLE_NAMES.contains(&name) {
        capitalize(name)
    } else {
        name.to_string()
    }
}

/// Kind of generated class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    /// Plain model
    Model,
    /// Custom post type
    PostType,
    /// Custom taxonomy
    Taxonomy,
    /// Support file of an integration; never wired into the bootstrap file
    IntegrationStub,
}

impl ClassKind {
    /// Every kind.
    pub const ALL: [Self; 4] = [
        Self::Model,
        Self::PostType,
        Self::Taxonomy,
        Self::IntegrationStub,
    ];

    /// Returns the command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::PostType => "post-type",
            Self::Taxonomy => "taxonomy",
            Self::IntegrationStub => "integration-stub",
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::PostType => "PostType",
            Self::Taxonomy => "Taxonomy",
            Self::IntegrationStub => "IntegrationStub",
        }
    }

    /// Returns the template the class file is rendered from.
    #[must_use]
    pub const fn template(self) -> TemplateName {
        match self {
            Self::Model => TemplateName::Model,
            Self::PostType => TemplateName::PostType,
            Self::Taxonomy => TemplateName::Taxonomy,
            Self::IntegrationStub => TemplateName::IdeHelper,
        }
    }

    /// Whether the kind takes a slug and a singular name.
    #[must_use]
    pub const fn is_registrable(self) -> bool {
        matches!(self, Self::PostType | Self::Taxonomy)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown class kind: '{s}'")))
    }
}

/// Raw `make` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRequest {
    /// Kind of class
    pub kind: ClassKind,
    /// Class path, segments separated by `/`, `\` or `.`
    pub class_path: String,
    /// Explicit property name
    pub variable: Option<String>,
    /// Explicit registration slug
    pub slug: Option<String>,
    /// Explicit singular display name
    pub singular_name: Option<String>,
}

impl ClassRequest {
    /// Creates a request with every optional value derived.
    #[must_use]
    pub fn new(kind: ClassKind, class_path: impl Into<String>) -> Self {
        Self {
            kind,
            class_path: class_path.into(),
            variable: None,
            slug: None,
            singular_name: None,
        }
    }

    /// Sets the property name.
    #[must_use]
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Sets the registration slug.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Sets the singular display name.
    #[must_use]
    pub fn with_singular_name(mut self, name: impl Into<String>) -> Self {
        self.singular_name = Some(name.into());
        self
    }
}

/// Validated class description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSpec {
    /// Kind of class
    pub kind: ClassKind,
    /// Folders followed by the class name
    pub segments: Vec<String>,
    /// Property name after reserved-word resolution
    pub variable: String,
    /// Registration slug (post types and taxonomies)
    pub slug: Option<String>,
    /// Singular display name (post types and taxonomies)
    pub singular_name: Option<String>,
}

impl ClassSpec {
    /// Validates a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the path has no segments, a
    /// segment or the variable is not a PHP identifier, or a slug or singular
    /// name is given for a kind that does not take one.
    pub fn from_request(request: ClassRequest) -> Result<Self> {
        let segments: Vec<String> = request
            .class_path
            .split(['/', '\\', '.'])
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "class path '{}' has no class name",
                request.class_path
            )));
        }
        if let Some(bad) = segments.iter().find(|s| !is_identifier(s)) {
            return Err(Error::InvalidArgument(format!(
                "'{bad}' in class path '{}' is not a valid PHP identifier",
                request.class_path
            )));
        }

        let requested = match request.variable {
            Some(variable) => {
                let variable = variable.trim_start_matches('$').to_string();
                if !is_identifier(&variable) {
                    return Err(Error::InvalidArgument(format!(
                        "variable '{variable}' is not a valid PHP identifier"
                    )));
                }
                variable
            }
            None => segments[segments.len() - 1].clone(),
        };
        let variable = resolve_variable_name(&requested);
        if variable != requested {
            debug!("Variable '{requested}' is reserved, using '{variable}'");
        }

        let class_name = &segments[segments.len() - 1];
        let (slug, singular_name) = if request.kind.is_registrable() {
            (
                Some(request.slug.unwrap_or_else(|| class_name.to_lowercase())),
                Some(
                    request
                        .singular_name
                        .unwrap_or_else(|| capitalize(class_name)),
                ),
            )
        } else if request.slug.is_some() || request.singular_name.is_some() {
            return Err(Error::InvalidArgument(format!(
                "{} classes take no slug or name",
                request.kind.label()
            )));
        } else {
            (None, None)
        };

        Ok(Self {
            kind: request.kind,
            segments,
            variable,
            slug,
            singular_name,
        })
    }

    /// Returns the class name, the last segment.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Returns the folder segments.
    #[must_use]
    pub fn folders(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

/// A class placed inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClass {
    /// Validated description
    pub spec: ClassSpec,
    /// Directory the file goes into
    pub directory: PathBuf,
    /// File to create
    pub file_path: PathBuf,
    /// Namespace declared by the file
    pub namespace: String,
    /// Fully-qualified class name, without leading separator
    pub fqn: String,
}

impl ResolvedClass {
    /// Property declaration for the bootstrap class.
    #[must_use]
    pub fn property_declaration(&self) -> String {
        format!("public ${};", self.spec.variable)
    }

    /// Statement that stores a new instance in the property, or `None` for
    /// kinds that are not wired into the bootstrap file.
    ///
    /// Post type and taxonomy names are wrapped in `__()` with `text_domain`.
    #[must_use]
    pub fn instantiation(&self, text_domain: &str) -> Option<String> {
        let target = format!("$this->{} = new \\{}", self.spec.variable, self.fqn);
        let registration = || {
            let slug = php_quote(self.spec.slug.as_deref().unwrap_or_default());
            let name = php_quote(self.spec.singular_name.as_deref().unwrap_or_default());
            format!("{slug}, __({name}, {})", php_quote(text_domain))
        };

        match self.spec.kind {
            ClassKind::Model => Some(format!("{target}($this->plugin);")),
            ClassKind::PostType => Some(format!(
                "{target}({}, array(), $this->plugin);",
                registration()
            )),
            ClassKind::Taxonomy => Some(format!(
                "{target}({}, array('post'), array(), $this->plugin);",
                registration()
            )),
            ClassKind::IntegrationStub => None,
        }
    }

    /// Variables for rendering the class template.
    #[must_use]
    pub fn template_vars(&self) -> TemplateVars {
        TemplateVars::new()
            .set("namespace", self.namespace.as_str())
            .set("class", self.spec.class_name())
            .set("variable", self.spec.variable.as_str())
            .set("slug", self.spec.slug.clone().unwrap_or_default())
            .set("name", self.spec.singular_name.clone().unwrap_or_default())
    }
}

/// Places a [`ClassSpec`] under a namespace mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    /// Computes the file, namespace and fully-qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetExists`] if the file is already there. Nothing
    /// is ever overwritten.
    pub fn resolve(spec: ClassSpec, mapping: &NamespaceMapping) -> Result<ResolvedClass> {
        let directory = spec
            .folders()
            .iter()
            .fold(mapping.source_dir.clone(), |dir, folder| dir.join(folder));
        let file_path = directory.join(format!("{}.php", spec.class_name()));

        if file_path.exists() {
            return Err(Error::TargetExists { path: file_path });
        }

        let namespace = std::iter::once(mapping.root_namespace.as_str())
            .chain(spec.folders().iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\\");
        let fqn = format!("{namespace}\\{}", spec.class_name());

        debug!("{} {} -> {}", spec.kind.label(), fqn, file_path.display());

        Ok(ResolvedClass {
            spec,
            directory,
            file_path,
            namespace,
            fqn,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn php_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
