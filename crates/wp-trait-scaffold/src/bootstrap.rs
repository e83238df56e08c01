//! Bootstrap file patcher.
//!
//! Every edit is planned against an in-memory copy first. Both anchors of an
//! edit are located before any line moves, so a failed lookup leaves nothing
//! half-applied, and the file is only written once the whole plan succeeded.

use crate::anchor::{AnchorLookup, AnchorScanner, INITIALIZER_MARKER, PatchAnchor};
use crate::fs::{read_to_string, write_atomic};
use crate::source::{SourceText, indentation};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};
use wp_trait_core::{Error, Result};

const PLUGIN_INSTANCE_LABEL: &str = "plugin instantiation";

/// An edit to the bootstrap file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapEdit {
    /// Declare a property above the constructor and assign it at the end of
    /// the initialization method.
    WireClass {
        /// Property declaration line, without indentation
        property: String,
        /// Instantiation statement, without indentation
        statement: String,
    },
    /// Prefix the top-level plugin instantiation with `$variable = `.
    BindInstance {
        /// Variable name without `$`
        variable: String,
    },
    /// Strip `$variable = ` from the plugin instantiation again.
    UnbindInstance {
        /// Variable name without `$`
        variable: String,
    },
}

/// How a line was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New line
    Inserted,
    /// Existing line rewritten
    Replaced,
}

/// One changed line in the patched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    /// 1-based line number in the patched file
    pub line: usize,
    /// Kind of change
    pub kind: ChangeKind,
    /// New line content
    pub text: String,
}

/// Planned file content plus the changes that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Full new content
    pub content: String,
    /// Changed lines; empty when the edit was already applied
    pub changes: Vec<LineChange>,
}

impl PatchOutcome {
    /// Returns `true` if the edit changed nothing.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Replaces a file's content.
type WriteFn = fn(&Path, &str) -> Result<()>;

/// Plans and applies [`BootstrapEdit`]s.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapPatcher {
    write: WriteFn,
}

impl Default for BootstrapPatcher {
    fn default() -> Self {
        Self {
            write: write_atomic,
        }
    }
}

impl BootstrapPatcher {
    /// Creates a patcher that writes through [`write_atomic`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) const fn with_writer(write: WriteFn) -> Self {
        Self { write }
    }

    /// Reads `path`, plans `edit` and writes the result if anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailed`], any error of [`plan`](Self::plan), or
    /// [`Error::WriteFailed`]. The file is untouched on error.
    pub fn apply(&self, path: &Path, edit: &BootstrapEdit) -> Result<PatchOutcome> {
        let text = read_to_string(path)?;
        let outcome = Self::plan(path, &text, edit)?;

        if outcome.is_unchanged() {
            debug!("{} already carries the edit", path.display());
        } else {
            (self.write)(path, &outcome.content)?;
            info!(
                "Patched {} ({} line(s) changed)",
                path.display(),
                outcome.changes.len()
            );
        }
        Ok(outcome)
    }

    /// Computes the result of `edit` on `text` without touching disk.
    ///
    /// `path` only appears in errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnchorNotFound`] or [`Error::AnchorAmbiguous`] if an
    /// insertion point cannot be located unambiguously.
    pub fn plan(path: &Path, text: &str, edit: &BootstrapEdit) -> Result<PatchOutcome> {
        let mut source = SourceText::parse(text);

        let changes = match edit {
            BootstrapEdit::WireClass {
                property,
                statement,
            } => Self::wire_class(path, &mut source, property, statement)?,
            BootstrapEdit::BindInstance { variable } => {
                Self::bind_instance(path, &mut source, variable)?
            }
            BootstrapEdit::UnbindInstance { variable } => {
                Self::unbind_instance(path, &mut source, variable)?
            }
        };

        Ok(PatchOutcome {
            content: source.render(),
            changes,
        })
    }

    fn wire_class(
        path: &Path,
        source: &mut SourceText,
        property: &str,
        statement: &str,
    ) -> Result<Vec<LineChange>> {
        let lines = source.lines();
        let scanner = AnchorScanner::new(lines);

        let property_anchor = PatchAnchor::BeforeConstructor;
        let property_at = scanner
            .locate(&property_anchor)
            .require(property_anchor.label(), path)?;
        let statement_anchor = PatchAnchor::EndOfInitializer;
        let close_at = scanner
            .locate(&statement_anchor)
            .require(statement_anchor.label(), path)?;

        let present = |wanted: &str| lines.iter().any(|line| line.trim() == wanted);

        let mut inserts = Vec::new();
        if present(property) {
            debug!("Property '{property}' already declared");
        } else {
            let indent = indentation(&lines[property_at]);
            inserts.push((property_at, format!("{indent}{property}")));
        }
        if present(statement) {
            debug!("Statement '{statement}' already present");
        } else {
            let indent = Self::body_indentation(lines, close_at);
            inserts.push((close_at, format!("{indent}{statement}")));
        }

        // Insert bottom-up so earlier indices stay valid.
        inserts.sort_by(|a, b| b.0.cmp(&a.0));
        let mut changes: Vec<LineChange> = inserts
            .iter()
            .map(|(at, text)| {
                let shift = inserts.iter().filter(|(other, _)| other < at).count();
                LineChange {
                    line: at + shift + 1,
                    kind: ChangeKind::Inserted,
                    text: text.clone(),
                }
            })
            .collect();
        for (at, text) in inserts {
            source.insert(at, text);
        }

        changes.sort_by_key(|change| change.line);
        Ok(changes)
    }

    /// Indentation for a new last statement of the body closed at `close_at`.
    fn body_indentation(lines: &[String], close_at: usize) -> String {
        let previous = (0..close_at)
            .rev()
            .map(|i| &lines[i])
            .find(|line| !line.trim().is_empty());

        match previous {
            Some(line)
                if line.trim() != "{" && !line.contains(INITIALIZER_MARKER) =>
            {
                indentation(line).to_string()
            }
            _ => {
                let closing = indentation(&lines[close_at]);
                let unit = if closing.contains('\t') { "\t" } else { "    " };
                format!("{closing}{unit}")
            }
        }
    }

    fn bind_instance(
        path: &Path,
        source: &mut SourceText,
        variable: &str,
    ) -> Result<Vec<LineChange>> {
        if Self::find_binding(source.lines(), variable).is_some() {
            debug!("${variable} is already bound");
            return Ok(Vec::new());
        }

        let anchor = plugin_instance_anchor()?;
        let at = AnchorScanner::new(source.lines())
            .locate(&anchor)
            .require(anchor.label(), path)?;

        let line = &source.lines()[at];
        let indent = indentation(line);
        let text = format!("{indent}${variable} = {}", &line[indent.len()..]);
        source.replace(at, text.clone());

        Ok(vec![LineChange {
            line: at + 1,
            kind: ChangeKind::Replaced,
            text,
        }])
    }

    fn unbind_instance(
        path: &Path,
        source: &mut SourceText,
        variable: &str,
    ) -> Result<Vec<LineChange>> {
        let at = Self::find_binding(source.lines(), variable).ok_or_else(|| {
            Error::AnchorNotFound {
                anchor: format!("${variable} binding"),
                path: path.to_path_buf(),
            }
        })?;

        let prefix = binding_prefix(variable)?;
        let line = &source.lines()[at];
        let indent = indentation(line);
        let text = prefix.replace(line, regex::NoExpand(indent)).into_owned();
        source.replace(at, text.clone());

        Ok(vec![LineChange {
            line: at + 1,
            kind: ChangeKind::Replaced,
            text,
        }])
    }

    /// Returns the 0-based line on which the top-level plugin instance is
    /// assigned to `$variable`.
    #[must_use]
    pub fn find_binding(lines: &[String], variable: &str) -> Option<usize> {
        let pattern = Regex::new(&format!(
            r"^[ \t]*\${}\s*=\s*new\s",
            regex::escape(variable)
        ))
        .ok()?;
        let anchor = PatchAnchor::Marker {
            label: format!("${variable} binding"),
            pattern,
            top_level: true,
        };
        match AnchorScanner::new(lines).locate(&anchor) {
            AnchorLookup::Found(line) => Some(line),
            AnchorLookup::Ambiguous { .. } | AnchorLookup::NotFound => None,
        }
    }

    /// Returns the class the plugin's main instance is created from, as
    /// written in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnchorNotFound`] if the file has no top-level `new`
    /// statement.
    pub fn main_instance(path: &Path, text: &str) -> Result<String> {
        let source = SourceText::parse(text);
        let pattern = Regex::new(
            r"^\s*(?:\$[A-Za-z_][A-Za-z0-9_]*\s*=\s*)?new\s+(\\?[A-Za-z_][A-Za-z0-9_\\]*)",
        )
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        let anchor = PatchAnchor::Marker {
            label: PLUGIN_INSTANCE_LABEL.to_string(),
            pattern: pattern.clone(),
            top_level: true,
        };
        let at = AnchorScanner::new(source.lines())
            .locate(&anchor)
            .require(anchor.label(), path)?;

        pattern
            .captures(&source.lines()[at])
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| Error::AnchorNotFound {
                anchor: PLUGIN_INSTANCE_LABEL.to_string(),
                path: path.to_path_buf(),
            })
    }
}

fn plugin_instance_anchor() -> Result<PatchAnchor> {
    let pattern = Regex::new(r"^\s*new\s+\\?[A-Za-z_]")
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;
    Ok(PatchAnchor::Marker {
        label: PLUGIN_INSTANCE_LABEL.to_string(),
        pattern,
        top_level: true,
    })
}

/// Matches `<indent>$variable = ` at the start of a line.
fn binding_prefix(variable: &str) -> Result<Regex> {
    Regex::new(&format!(r"^[ \t]*\${}\s*=\s*", regex::escape(variable)))
        .map_err(|e| Error::InvalidArgument(e.to_string()))
}
