//! Structural anchor scanner for PHP bootstrap files.
//!
//! The scanner does not parse PHP. It works on a masked copy of the file (see
//! [`mask_php`]) in which comments and string contents are blank, and tracks
//! brace depth over that copy. That is enough to find the two insertion
//! points the patcher needs and to refuse, rather than guess, when the file
//! does not have the expected shape.
//!
//! # Examples
//!
//! ```
//! use wp_trait_scaffold::anchor::{AnchorLookup, AnchorScanner, PatchAnchor};
//!
//! let lines: Vec<String> = [
//!     "class Plugin {",
//!     "    function __construct() {",
//!     "    }",
//!     "    function instantiate() {",
//!     "        if ($a) {",
//!     "        }",
//!     "    }",
//!     "}",
//! ]
//! .iter()
//! .map(ToString::to_string)
//! .collect();
//!
//! let scanner = AnchorScanner::new(&lines);
//! assert_eq!(scanner.locate(&PatchAnchor::BeforeConstructor), AnchorLookup::Found(1));
//! assert_eq!(scanner.locate(&PatchAnchor::EndOfInitializer), AnchorLookup::Found(6));
//! ```

use crate::source::mask_php;
use regex::Regex;
use std::path::Path;
use tracing::debug;
use wp_trait_core::{Error, Result};

/// Marker that opens the constructor declaration.
pub const CONSTRUCTOR_MARKER: &str = "function __construct(";

/// Marker that opens the initialization method.
pub const INITIALIZER_MARKER: &str = "function instantiate(";

/// An insertion or edit point to locate in a bootstrap file.
#[derive(Debug, Clone)]
pub enum PatchAnchor {
    /// Line before the constructor declaration, above its docblock and
    /// attributes.
    BeforeConstructor,
    /// The line holding the closing brace of the initialization method.
    EndOfInitializer,
    /// First code line matching `pattern`.
    Marker {
        /// Name used in error messages
        label: String,
        /// Pattern matched against the masked line
        pattern: Regex,
        /// Only consider lines outside any brace block
        top_level: bool,
    },
}

impl PatchAnchor {
    /// Human-readable name of the anchor.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::BeforeConstructor => "constructor declaration",
            Self::EndOfInitializer => "end of initialization method",
            Self::Marker { label, .. } => label,
        }
    }
}

/// Result of an anchor lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorLookup {
    /// 0-based line index
    Found(usize),
    /// Matched, but not at a single usable line
    Ambiguous {
        /// 1-based candidate lines
        lines: Vec<usize>,
        /// Why the match was rejected
        reason: String,
    },
    /// Nothing matched
    NotFound,
}

impl AnchorLookup {
    /// Converts the lookup into a line index or the matching error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AnchorNotFound`] or [`Error::AnchorAmbiguous`].
    pub fn require(self, anchor: &str, path: &Path) -> Result<usize> {
        match self {
            Self::Found(line) => Ok(line),
            Self::Ambiguous { lines, reason } => Err(Error::AnchorAmbiguous {
                anchor: anchor.to_string(),
                path: path.to_path_buf(),
                lines,
                reason,
            }),
            Self::NotFound => Err(Error::AnchorNotFound {
                anchor: anchor.to_string(),
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Scanner over one snapshot of a bootstrap file.
#[derive(Debug)]
pub struct AnchorScanner<'a> {
    lines: &'a [String],
    masked: Vec<Vec<char>>,
    depth: Vec<i64>,
}

impl<'a> AnchorScanner<'a> {
    /// Masks the lines and computes the brace depth at the start of each.
    #[must_use]
    pub fn new(lines: &'a [String]) -> Self {
        let masked: Vec<Vec<char>> = mask_php(lines)
            .into_iter()
            .map(|line| line.chars().collect())
            .collect();

        let mut depth = Vec::with_capacity(masked.len());
        let mut current = 0_i64;
        for line in &masked {
            depth.push(current);
            for c in line {
                match c {
                    '{' => current += 1,
                    '}' => current -= 1,
                    _ => {}
                }
            }
        }

        Self {
            lines,
            masked,
            depth,
        }
    }

    /// Locates `anchor`.
    #[must_use]
    pub fn locate(&self, anchor: &PatchAnchor) -> AnchorLookup {
        match anchor {
            PatchAnchor::BeforeConstructor => self.before_constructor(),
            PatchAnchor::EndOfInitializer => self.end_of_initializer(),
            PatchAnchor::Marker {
                pattern, top_level, ..
            } => self.first_match(pattern, *top_level),
        }
    }

    fn masked_line(&self, index: usize) -> String {
        self.masked[index].iter().collect()
    }

    /// Indices of code lines containing `marker`.
    fn marker_lines(&self, marker: &str) -> Vec<usize> {
        (0..self.masked.len())
            .filter(|&i| self.masked_line(i).contains(marker))
            .collect()
    }

    fn unique_marker(&self, marker: &str) -> std::result::Result<usize, AnchorLookup> {
        match self.marker_lines(marker).as_slice() {
            [] => Err(AnchorLookup::NotFound),
            [single] => Ok(*single),
            many => Err(AnchorLookup::Ambiguous {
                lines: many.iter().map(|i| i + 1).collect(),
                reason: format!("'{marker}' appears more than once"),
            }),
        }
    }

    fn before_constructor(&self) -> AnchorLookup {
        let marker_line = match self.unique_marker(CONSTRUCTOR_MARKER) {
            Ok(line) => line,
            Err(lookup) => return lookup,
        };

        let mut index = marker_line;
        while index > 0 {
            let previous = index - 1;
            let code = self.masked_line(previous);
            let code = code.trim();

            let start = if code.is_empty() {
                if self.lines[previous].trim().is_empty() {
                    break;
                }
                self.comment_start(previous)
            } else if code.ends_with(']') {
                self.attribute_start(previous)
            } else {
                break;
            };

            match start {
                Ok(start) => index = start,
                Err(lookup) => return lookup,
            }
        }

        debug!(
            "Constructor marker on line {}, property anchor on line {}",
            marker_line + 1,
            index + 1
        );
        AnchorLookup::Found(index)
    }

    /// First line of the comment-only block ending at `last`.
    fn comment_start(&self, last: usize) -> std::result::Result<usize, AnchorLookup> {
        let comment_only =
            |i: usize| self.masked_line(i).trim().is_empty() && !self.lines[i].trim().is_empty();

        let mut start = last;
        while start > 0 && comment_only(start - 1) {
            start -= 1;
        }

        let opener = self.lines[start].trim_start();
        if opener.starts_with("/*") || opener.starts_with("//") || opener.starts_with('#') {
            Ok(start)
        } else {
            Err(AnchorLookup::Ambiguous {
                lines: vec![start + 1, last + 1],
                reason: "comment above the constructor does not start on its own line".to_string(),
            })
        }
    }

    /// First line of the attribute group closing at the end of `last`.
    fn attribute_start(&self, last: usize) -> std::result::Result<usize, AnchorLookup> {
        let rejected = |line: usize| AnchorLookup::Ambiguous {
            lines: vec![line + 1, last + 1],
            reason: "code above the constructor is not an attribute".to_string(),
        };

        let mut depth = 0_i64;
        for line in (0..=last).rev() {
            let chars = &self.masked[line];
            let mut col = chars.len();
            while col > 0 {
                col -= 1;
                match chars[col] {
                    ']' => depth += 1,
                    '[' => {
                        depth -= 1;
                        if depth > 0 {
                            continue;
                        }
                        if depth < 0 || col == 0 || chars[col - 1] != '#' {
                            return Err(rejected(line));
                        }
                        col -= 1;
                        let before: String = chars[..col].iter().collect();
                        let before = before.trim();
                        if before.is_empty() {
                            return Ok(line);
                        }
                        if !before.ends_with(']') {
                            return Err(rejected(line));
                        }
                    }
                    c if depth == 0 && !c.is_whitespace() => return Err(rejected(line)),
                    _ => {}
                }
            }
        }
        Err(rejected(last))
    }

    fn end_of_initializer(&self) -> AnchorLookup {
        let marker = INITIALIZER_MARKER;
        let marker_line = match self.unique_marker(marker) {
            Ok(line) => line,
            Err(lookup) => return lookup,
        };

        let Some((open_line, close_line)) = self.method_body(marker_line, marker) else {
            return AnchorLookup::NotFound;
        };

        if close_line == open_line {
            return AnchorLookup::Ambiguous {
                lines: vec![open_line + 1],
                reason: "initialization method body opens and closes on one line".to_string(),
            };
        }
        if self.masked_line(close_line).trim() != "}" {
            return AnchorLookup::Ambiguous {
                lines: vec![close_line + 1],
                reason: "closing brace shares its line with other code".to_string(),
            };
        }

        let heuristic = (marker_line + 1..self.lines.len()).find(|&i| self.lines[i].trim() == "}");
        if heuristic != Some(close_line) {
            debug!(
                "First closing-brace line after the initializer is {:?}; structural end is line {}",
                heuristic.map(|i| i + 1),
                close_line + 1
            );
        }

        AnchorLookup::Found(close_line)
    }

    /// Returns the lines of the opening and matching closing brace of the
    /// method declared at `marker_line`.
    fn method_body(&self, marker_line: usize, marker: &str) -> Option<(usize, usize)> {
        let start_col = self
            .masked_line(marker_line)
            .find(marker)
            .map(|byte| self.masked_line(marker_line)[..byte].chars().count())?;

        let mut depth = 0_i64;
        let mut open_line = None;

        for line in marker_line..self.masked.len() {
            let from = if line == marker_line { start_col } else { 0 };
            for &c in &self.masked[line][from..] {
                match (c, open_line) {
                    (';', None) => return None,
                    ('{', _) => {
                        open_line.get_or_insert(line);
                        depth += 1;
                    }
                    ('}', Some(open)) => {
                        depth -= 1;
                        if depth == 0 {
                            return Some((open, line));
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn first_match(&self, pattern: &Regex, top_level: bool) -> AnchorLookup {
        (0..self.masked.len())
            .filter(|&i| !top_level || self.depth[i] == 0)
            .find(|&i| pattern.is_match(&self.masked_line(i)))
            .map_or(AnchorLookup::NotFound, AnchorLookup::Found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    const BOOTSTRAP: &str = r"<?php
class MyPlugin extends Kernel
{
    public $Admin;

    /**
     * Constructor.
     */
    public function __construct($plugin)
    {
        parent::__construct($plugin);
    }

    public function instantiate()
    {
        $this->Admin = new \MyPlugin\Admin($this->plugin);
    }
}

new MyPlugin('my-plugin');
";

    #[test]
    fn test_before_constructor_skips_docblock() {
        let source = lines(BOOTSTRAP);
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Found(5)
        );
    }

    #[test]
    fn test_before_constructor_skips_attributes() {
        let source = lines("class A {\n    #[Pure]\n    function __construct() {}\n}");
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Found(1)
        );
    }

    #[test]
    fn test_before_constructor_stops_at_code_with_trailing_comment() {
        let source = lines(
            "<?php\n/*\n * Plugin Name: P\n */\nclass P {\n    public $Old; /* legacy */\n    public function __construct() {\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Found(6)
        );
    }

    #[test]
    fn test_before_constructor_comment_opened_after_code_is_ambiguous() {
        let source = lines(
            "class P {\n    public $Old; /* legacy\n     * field */\n    public function __construct() {\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        match scanner.locate(&PatchAnchor::BeforeConstructor) {
            AnchorLookup::Ambiguous { lines, .. } => assert_eq!(lines, vec![3, 3]),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_before_constructor_skips_multiline_attribute() {
        let source = lines(
            "class P {\n    /** Boot. */\n    #[Hook(\n        'init'\n    )]\n    public function __construct() {\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Found(1)
        );
    }

    #[test]
    fn test_before_constructor_skips_attribute_group_on_one_line() {
        let source = lines("class P {\n    #[A] #[B('x]')]\n    function __construct() {}\n}");
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Found(1)
        );
    }

    #[test]
    fn test_before_constructor_array_above_is_ambiguous() {
        let source = lines("class P {\n    public $map = [\n        'a',\n    ]\n    function __construct() {}\n}");
        let scanner = AnchorScanner::new(&source);
        assert!(matches!(
            scanner.locate(&PatchAnchor::BeforeConstructor),
            AnchorLookup::Ambiguous { .. }
        ));
    }

    #[test]
    fn test_end_of_initializer() {
        let source = lines(BOOTSTRAP);
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Found(16)
        );
    }

    #[test]
    fn test_end_of_initializer_skips_nested_blocks() {
        let source = lines(
            "class A {\n    function instantiate() {\n        if (is_admin()) {\n            $x = 1;\n    }\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Found(5)
        );
    }

    #[test]
    fn test_braces_in_strings_and_comments_are_ignored() {
        let source = lines(
            "class A {\n    function instantiate() {\n        $a = '}'; // {\n        /* } */\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Found(4)
        );
    }

    #[test]
    fn test_marker_in_comment_is_ignored() {
        let source = lines(
            "class A {\n    // function instantiate() {}\n    function instantiate() {\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Found(3)
        );
    }

    #[test]
    fn test_missing_initializer_is_not_found() {
        let source = lines("class A {\n    function __construct() {\n    }\n}");
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::NotFound
        );
    }

    #[test]
    fn test_abstract_initializer_is_not_found() {
        let source = lines("abstract class A {\n    abstract function instantiate();\n}");
        let scanner = AnchorScanner::new(&source);
        assert_eq!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::NotFound
        );
    }

    #[test]
    fn test_duplicate_marker_is_ambiguous() {
        let source = lines(
            "class A {\n    function instantiate() {\n    }\n}\nclass B {\n    function instantiate() {\n    }\n}",
        );
        let scanner = AnchorScanner::new(&source);
        match scanner.locate(&PatchAnchor::EndOfInitializer) {
            AnchorLookup::Ambiguous { lines, .. } => assert_eq!(lines, vec![2, 6]),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_closing_brace_sharing_line_is_ambiguous() {
        let source = lines("class A {\n    function instantiate() {\n        $a = 1; }\n}");
        let scanner = AnchorScanner::new(&source);
        assert!(matches!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Ambiguous { .. }
        ));
    }

    #[test]
    fn test_single_line_body_is_ambiguous() {
        let source = lines("class A {\n    function instantiate() { }\n}");
        let scanner = AnchorScanner::new(&source);
        assert!(matches!(
            scanner.locate(&PatchAnchor::EndOfInitializer),
            AnchorLookup::Ambiguous { .. }
        ));
    }

    #[test]
    fn test_top_level_marker() {
        let source = lines(BOOTSTRAP);
        let scanner = AnchorScanner::new(&source);
        let anchor = PatchAnchor::Marker {
            label: "plugin instantiation".to_string(),
            pattern: Regex::new(r"^\s*new\s+").unwrap(),
            top_level: true,
        };
        assert_eq!(scanner.locate(&anchor), AnchorLookup::Found(19));
    }

    #[test]
    fn test_require_maps_errors() {
        let path = Path::new("my-plugin.php");
        assert_eq!(AnchorLookup::Found(3).require("x", path).unwrap(), 3);
        assert!(matches!(
            AnchorLookup::NotFound.require("x", path),
            Err(Error::AnchorNotFound { .. })
        ));
        let ambiguous = AnchorLookup::Ambiguous {
            lines: vec![1, 2],
            reason: "twice".to_string(),
        };
        assert!(matches!(
            ambiguous.require("x", path),
            Err(Error::AnchorAmbiguous { .. })
        ));
    }
}
