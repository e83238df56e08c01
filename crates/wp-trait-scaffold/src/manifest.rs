//! Project manifest (`composer.json`) model and resolver.
//!
//! The manifest is kept as an ordered JSON document so that keys this tool
//! does not know about survive a read-modify-write cycle untouched, in their
//! original order. Only `require` and `autoload` are interpreted.
//!
//! Saving splices: top-level members whose value did not change are written
//! back as their original source text, and a document equal to the one that
//! was read renders as the original file.

use crate::fs::{read_to_string, write_atomic};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wp_trait_core::{Error, MANIFEST_FILE, Result, SCAFFOLD_PACKAGE};

const DEFAULT_INDENT: &str = "    ";

/// Ordered, round-trippable view of `composer.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    path: PathBuf,
    document: Map<String, Value>,
    original: Map<String, Value>,
    source: String,
    members: HashMap<String, String>,
    indent: String,
    trailing_newline: bool,
}

impl ProjectManifest {
    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::ManifestMissing`] if there is no file at `path`
    /// - [`Error::ReadFailed`] if it cannot be read
    /// - [`Error::ManifestMalformed`] if it is not a JSON object
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestMissing {
                path: path.to_path_buf(),
            });
        }
        let text = read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parses manifest text; `path` is used for error reporting and saving.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMalformed`] if `text` is not a JSON object.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let malformed = |e: serde_json::Error| Error::ManifestMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
            source: Some(e),
        };
        let value: Value = serde_json::from_str(text).map_err(malformed)?;

        let Value::Object(document) = value else {
            return Err(Error::ManifestMalformed {
                path: path.to_path_buf(),
                reason: "top-level value is not an object".to_string(),
                source: None,
            });
        };
        let members: HashMap<String, Box<RawValue>> =
            serde_json::from_str(text).map_err(malformed)?;

        let indent = text
            .lines()
            .skip(1)
            .map(crate::source::indentation)
            .find(|indent| !indent.is_empty())
            .unwrap_or(DEFAULT_INDENT)
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            original: document.clone(),
            document,
            source: text.to_string(),
            members: members
                .into_iter()
                .map(|(key, raw)| (key, raw.get().to_string()))
                .collect(),
            indent,
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// Returns the manifest location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the whole document.
    #[must_use]
    pub const fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Looks up a `require` entry by package name, ignoring ASCII case.
    ///
    /// Returns the key as spelled in the manifest together with its value.
    #[must_use]
    pub fn dependency(&self, package: &str) -> Option<(&str, &Value)> {
        self.document
            .get("require")?
            .as_object()?
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(package))
            .map(|(name, constraint)| (name.as_str(), constraint))
    }

    /// Returns `true` if `package` is required.
    #[must_use]
    pub fn has_dependency(&self, package: &str) -> bool {
        self.dependency(package).is_some()
    }

    /// Appends a `require` entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMalformed`] if `require` exists but is not an
    /// object.
    pub fn insert_dependency(&mut self, package: &str, constraint: &str) -> Result<()> {
        let require = self.object_entry("require")?;
        require.insert(package.to_string(), Value::String(constraint.to_string()));
        debug!("Required {package} {constraint}");
        Ok(())
    }

    /// Removes a `require` entry, keeping the order of the others.
    ///
    /// Returns the removed constraint.
    pub fn remove_dependency(&mut self, package: &str) -> Option<Value> {
        let key = self.dependency(package)?.0.to_string();
        self.document
            .get_mut("require")?
            .as_object_mut()?
            .shift_remove(&key)
    }

    /// Returns the `autoload.files` entries.
    #[must_use]
    pub fn autoload_files(&self) -> Vec<&str> {
        self.document
            .get("autoload")
            .and_then(|autoload| autoload.get("files"))
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Appends `file` to `autoload.files`, creating the list if needed.
    ///
    /// Returns `false` if the entry was already listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMalformed`] if `autoload` or `autoload.files`
    /// has the wrong type.
    pub fn add_autoload_file(&mut self, file: &str) -> Result<bool> {
        let path = self.path.clone();
        let autoload = self.object_entry("autoload")?;
        let files = autoload
            .entry("files")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| Error::ManifestMalformed {
                path,
                reason: "autoload.files is not an array".to_string(),
                source: None,
            })?;

        if files.iter().any(|entry| entry.as_str() == Some(file)) {
            return Ok(false);
        }
        files.push(Value::String(file.to_string()));
        Ok(true)
    }

    /// Removes `file` from `autoload.files`; drops the list once it is empty.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove_autoload_file(&mut self, file: &str) -> bool {
        let Some(autoload) = self
            .document
            .get_mut("autoload")
            .and_then(Value::as_object_mut)
        else {
            return false;
        };
        let Some(files) = autoload.get_mut("files").and_then(Value::as_array_mut) else {
            return false;
        };

        let before = files.len();
        files.retain(|entry| entry.as_str() != Some(file));
        let removed = files.len() != before;

        if files.is_empty() {
            autoload.shift_remove("files");
        }
        removed
    }

    /// Returns the first usable `autoload.psr-4` entry.
    ///
    /// An entry is usable when its prefix names a namespace and its directory
    /// is a string, or a list whose first element is a string. Later entries
    /// are ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::AutoloadMissing`] if there is no `autoload.psr-4` object
    /// - [`Error::NamespaceMappingMissing`] if no entry is usable
    pub fn namespace_mapping(&self, root: &Path) -> Result<NamespaceMapping> {
        let psr4 = self
            .document
            .get("autoload")
            .and_then(Value::as_object)
            .and_then(|autoload| {
                autoload
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case("psr-4"))
            })
            .and_then(|(_, value)| value.as_object())
            .ok_or_else(|| Error::AutoloadMissing {
                path: self.path.clone(),
            })?;

        if psr4.len() > 1 {
            debug!("{} psr-4 entries declared, using the first", psr4.len());
        }

        psr4.iter()
            .find_map(|(prefix, dir)| {
                let namespace = prefix.trim_matches('\\');
                if namespace.is_empty() {
                    return None;
                }
                let dir = match dir {
                    Value::String(dir) => dir.as_str(),
                    Value::Array(dirs) => dirs.first()?.as_str()?,
                    _ => return None,
                };
                Some(NamespaceMapping {
                    prefix: prefix.clone(),
                    root_namespace: namespace.to_string(),
                    source_dir: root.join(dir.trim_end_matches('/')),
                })
            })
            .ok_or_else(|| Error::NamespaceMappingMissing {
                path: self.path.clone(),
            })
    }

    /// Serializes the document with the original indentation.
    ///
    /// Unchanged top-level members keep their source text; changed ones are
    /// pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMalformed`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        if self.document == self.original {
            return Ok(self.source.clone());
        }

        let eol = if self.source.contains("\r\n") { "\r\n" } else { "\n" };
        let nested = format!("{eol}{}", self.indent);
        let mut text = String::from("{");
        for (position, (key, value)) in self.document.iter().enumerate() {
            if position > 0 {
                text.push(',');
            }
            text.push_str(&nested);
            text.push_str(&self.pretty(&Value::String(key.clone()))?);
            text.push_str(": ");
            match self.members.get(key) {
                Some(raw) if self.original.get(key) == Some(value) => text.push_str(raw),
                _ => text.push_str(&self.pretty(value)?.replace('\n', &nested)),
            }
        }
        if !self.document.is_empty() {
            text.push_str(eol);
        }
        text.push('}');

        if self.trailing_newline {
            text.push_str(eol);
        }
        Ok(text)
    }

    fn pretty(&self, value: &Value) -> Result<String> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| Error::ManifestMalformed {
                path: self.path.clone(),
                reason: e.to_string(),
                source: Some(e),
            })?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Writes the document back to its file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] if the file cannot be replaced.
    pub fn save(&self) -> Result<()> {
        write_atomic(&self.path, &self.to_json_string()?)?;
        info!("Saved {}", self.path.display());
        Ok(())
    }

    fn object_entry(&mut self, key: &str) -> Result<&mut Map<String, Value>> {
        let path = self.path.clone();
        self.document
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| Error::ManifestMalformed {
                path,
                reason: format!("{key} is not an object"),
                source: None,
            })
    }
}

/// The namespace-prefix to source-directory mapping used for new classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceMapping {
    /// Prefix as written in the manifest, e.g. `MyPlugin\`
    pub prefix: String,
    /// Prefix without surrounding separators, e.g. `MyPlugin`
    pub root_namespace: String,
    /// Absolute source directory
    pub source_dir: PathBuf,
}

/// A validated project, ready for scaffolding.
#[derive(Debug, Clone)]
pub struct Project {
    /// Canonical project root
    pub root: PathBuf,
    /// Plugin slug, the root directory name
    pub slug: String,
    /// Plugin main file, the bootstrap file that gets patched
    pub main_file: PathBuf,
    /// Parsed manifest
    pub manifest: ProjectManifest,
    /// Namespace mapping for new classes
    pub mapping: NamespaceMapping,
}

impl Project {
    /// Text domain used in generated translation calls.
    #[must_use]
    pub fn text_domain(&self) -> &str {
        &self.slug
    }
}

/// Validates a project root and builds a [`Project`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestResolver;

impl ManifestResolver {
    /// Resolves the project at `root`.
    ///
    /// Checks run in a fixed order and stop at the first failure; nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestMissing`], [`Error::ManifestMalformed`],
    /// [`Error::DependencyMissing`], [`Error::AutoloadMissing`],
    /// [`Error::NamespaceMappingMissing`] or [`Error::MainFileMissing`].
    pub fn resolve(root: &Path) -> Result<Project> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let manifest = ProjectManifest::load(&root.join(MANIFEST_FILE))?;

        if !manifest.has_dependency(SCAFFOLD_PACKAGE) {
            return Err(Error::DependencyMissing {
                package: SCAFFOLD_PACKAGE.to_string(),
            });
        }

        let mapping = manifest.namespace_mapping(&root)?;

        let slug = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let main_file = root.join(format!("{slug}.php"));
        if slug.is_empty() || !main_file.is_file() {
            return Err(Error::MainFileMissing { path: main_file });
        }

        debug!(
            "Resolved project {} (namespace {}, source {})",
            slug,
            mapping.root_namespace,
            mapping.source_dir.display()
        );

        Ok(Project {
            root,
            slug,
            main_file,
            manifest,
            mapping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
    "name": "acme/my-plugin",
    "type": "wordpress-plugin",
    "require": {
        "php": ">=7.4",
        "Mehrshaddarzi/WP-Trait": "^1.0"
    },
    "autoload": {
        "psr-4": {
            "MyPlugin\\": "src/"
        }
    },
    "config": {
        "sort-packages": true
    }
}
"#;

    fn manifest() -> ProjectManifest {
        ProjectManifest::parse(Path::new("composer.json"), MANIFEST).unwrap()
    }

    fn project(manifest: &str, main_file: bool) -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("my-plugin");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("composer.json"), manifest).unwrap();
        if main_file {
            fs::write(root.join("my-plugin.php"), "<?php\n").unwrap();
        }
        temp
    }

    #[test]
    fn test_unchanged_document_round_trips() {
        assert_eq!(manifest().to_json_string().unwrap(), MANIFEST);
    }

    #[test]
    fn test_indentation_is_preserved() {
        let text = "{\n  \"require\": {\n    \"a/b\": \"1\"\n  }\n}";
        let manifest = ProjectManifest::parse(Path::new("composer.json"), text).unwrap();
        assert_eq!(manifest.to_json_string().unwrap(), text);
    }

    #[test]
    fn test_dependency_lookup_ignores_case() {
        let manifest = manifest();
        let (key, constraint) = manifest.dependency("mehrshaddarzi/wp-trait").unwrap();
        assert_eq!(key, "Mehrshaddarzi/WP-Trait");
        assert_eq!(constraint, "^1.0");
        assert!(!manifest.has_dependency("cmb2/cmb2"));
    }

    #[test]
    fn test_dependency_round_trip_restores_text() {
        let mut manifest = manifest();
        manifest.insert_dependency("cmb2/cmb2", "dev-master").unwrap();
        assert!(manifest.to_json_string().unwrap().contains("\"cmb2/cmb2\": \"dev-master\""));

        assert!(manifest.remove_dependency("CMB2/cmb2").is_some());
        assert_eq!(manifest.to_json_string().unwrap(), MANIFEST);
    }

    #[test]
    fn test_untouched_members_keep_their_source_text() {
        let text = "{\n    \"keywords\": [\"wordpress\", \"plugin\"],\n    \"version\": 1.10,\n    \"require\": {\n        \"php\": \">=7.4\"\n    }\n}\n";
        let mut manifest = ProjectManifest::parse(Path::new("composer.json"), text).unwrap();

        manifest.insert_dependency("cmb2/cmb2", "dev-master").unwrap();
        let edited = manifest.to_json_string().unwrap();
        assert!(edited.starts_with(
            "{\n    \"keywords\": [\"wordpress\", \"plugin\"],\n    \"version\": 1.10,\n"
        ));
        assert!(edited.contains("\n        \"cmb2/cmb2\": \"dev-master\"\n    }\n}\n"));

        let reparsed = ProjectManifest::parse(Path::new("composer.json"), &edited).unwrap();
        assert_eq!(reparsed.document()["version"].to_string(), "1.10");

        manifest.remove_dependency("cmb2/cmb2").unwrap();
        assert_eq!(manifest.to_json_string().unwrap(), text);
    }

    #[test]
    fn test_crlf_manifest_keeps_line_endings() {
        let text = MANIFEST.replace('\n', "\r\n");
        let mut manifest = ProjectManifest::parse(Path::new("composer.json"), &text).unwrap();

        manifest.insert_dependency("cmb2/cmb2", "dev-master").unwrap();
        let edited = manifest.to_json_string().unwrap();
        assert_eq!(edited.matches("\r\n").count(), edited.matches('\n').count());
        assert!(edited.ends_with("}\r\n"));
    }

    #[test]
    fn test_remove_dependency_keeps_order() {
        let mut manifest = manifest();
        manifest.remove_dependency("php").unwrap();
        let require = manifest.document()["require"].as_object().unwrap();
        assert_eq!(require.keys().collect::<Vec<_>>(), ["Mehrshaddarzi/WP-Trait"]);
        assert!(manifest.remove_dependency("php").is_none());
    }

    #[test]
    fn test_autoload_files_round_trip() {
        let mut manifest = manifest();
        assert!(manifest.add_autoload_file("vendor/cmb2/cmb2/init.php").unwrap());
        assert!(!manifest.add_autoload_file("vendor/cmb2/cmb2/init.php").unwrap());
        assert_eq!(manifest.autoload_files(), ["vendor/cmb2/cmb2/init.php"]);

        assert!(manifest.remove_autoload_file("vendor/cmb2/cmb2/init.php"));
        assert!(manifest.document()["autoload"].get("files").is_none());
        assert_eq!(manifest.to_json_string().unwrap(), MANIFEST);
    }

    #[test]
    fn test_remove_autoload_file_keeps_other_entries() {
        let text = r#"{"autoload": {"files": ["a.php", "b.php"]}}"#;
        let mut manifest = ProjectManifest::parse(Path::new("composer.json"), text).unwrap();
        assert!(manifest.remove_autoload_file("a.php"));
        assert_eq!(manifest.autoload_files(), ["b.php"]);
        assert!(!manifest.remove_autoload_file("a.php"));
    }

    #[test]
    fn test_namespace_mapping() {
        let mapping = manifest().namespace_mapping(Path::new("/p")).unwrap();
        assert_eq!(mapping.prefix, "MyPlugin\\");
        assert_eq!(mapping.root_namespace, "MyPlugin");
        assert_eq!(mapping.source_dir, Path::new("/p/src"));
    }

    #[test]
    fn test_namespace_mapping_uses_first_usable_entry() {
        let text = r#"{"autoload": {"PSR-4": {"": "lib/", "First\\": ["src/", "more/"], "Second\\": "b/"}}}"#;
        let manifest = ProjectManifest::parse(Path::new("composer.json"), text).unwrap();
        let mapping = manifest.namespace_mapping(Path::new("/p")).unwrap();
        assert_eq!(mapping.root_namespace, "First");
        assert_eq!(mapping.source_dir, Path::new("/p/src"));
    }

    #[test]
    fn test_namespace_mapping_errors() {
        let missing = ProjectManifest::parse(Path::new("c.json"), r#"{"autoload": {}}"#).unwrap();
        assert!(matches!(
            missing.namespace_mapping(Path::new("/p")),
            Err(Error::AutoloadMissing { .. })
        ));

        let unusable =
            ProjectManifest::parse(Path::new("c.json"), r#"{"autoload": {"psr-4": {"A\\": 1}}}"#)
                .unwrap();
        assert!(matches!(
            unusable.namespace_mapping(Path::new("/p")),
            Err(Error::NamespaceMappingMissing { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            ProjectManifest::parse(Path::new("c.json"), "[1, 2]"),
            Err(Error::ManifestMalformed { source: None, .. })
        ));
        assert!(matches!(
            ProjectManifest::parse(Path::new("c.json"), "{"),
            Err(Error::ManifestMalformed { source: Some(_), .. })
        ));
    }

    #[test]
    fn test_resolve_valid_project() {
        let temp = project(MANIFEST, true);
        let project = ManifestResolver::resolve(&temp.path().join("my-plugin")).unwrap();
        assert_eq!(project.slug, "my-plugin");
        assert_eq!(project.text_domain(), "my-plugin");
        assert!(project.main_file.ends_with("my-plugin/my-plugin.php"));
        assert!(project.mapping.source_dir.ends_with("my-plugin/src"));
    }

    #[test]
    fn test_resolve_validation_order() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            ManifestResolver::resolve(temp.path()),
            Err(Error::ManifestMissing { .. })
        ));

        let temp = project("not json", true);
        assert!(matches!(
            ManifestResolver::resolve(&temp.path().join("my-plugin")),
            Err(Error::ManifestMalformed { .. })
        ));

        let temp = project(r#"{"require": {"php": "*"}}"#, true);
        assert!(matches!(
            ManifestResolver::resolve(&temp.path().join("my-plugin")),
            Err(Error::DependencyMissing { .. })
        ));

        let temp = project(r#"{"require": {"mehrshaddarzi/wp-trait": "*"}}"#, true);
        assert!(matches!(
            ManifestResolver::resolve(&temp.path().join("my-plugin")),
            Err(Error::AutoloadMissing { .. })
        ));

        let temp = project(MANIFEST, false);
        assert!(matches!(
            ManifestResolver::resolve(&temp.path().join("my-plugin")),
            Err(Error::MainFileMissing { .. })
        ));
    }
}
