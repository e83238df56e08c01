//! Line model of a PHP source file.
//!
//! [`SourceText`] splits a file into lines while remembering its line ending
//! and whether it ended with a newline, so an edited file renders back
//! byte-identical outside the edited lines.
//!
//! [`mask_php`] produces a copy of the lines in which comments and string
//! contents are blanked out. Markers and braces are matched against the masked
//! copy so that text inside a comment or a string literal never counts.

/// Line terminator detected in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Returns the terminator string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Editable line buffer of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    lines: Vec<String>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl SourceText {
    /// Splits `text` into lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use wp_trait_scaffold::source::SourceText;
    ///
    /// let mut source = SourceText::parse("a\r\nc\r\n");
    /// source.insert(1, "b");
    /// assert_eq!(source.render(), "a\r\nb\r\nc\r\n");
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let line_ending = if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        let trailing_newline = text.ends_with('\n');

        let mut lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        if trailing_newline || text.is_empty() {
            lines.pop();
        }

        Self {
            lines,
            line_ending,
            trailing_newline,
        }
    }

    /// Returns the lines without terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the detected line ending.
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Inserts a line before `index`.
    pub fn insert(&mut self, index: usize, line: impl Into<String>) {
        self.lines.insert(index, line.into());
    }

    /// Replaces the line at `index`.
    pub fn replace(&mut self, index: usize, line: impl Into<String>) {
        self.lines[index] = line.into();
    }

    /// Joins the lines back into file content.
    #[must_use]
    pub fn render(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut out = self.lines.join(eol);
        if self.trailing_newline {
            out.push_str(eol);
        }
        out
    }
}

/// Returns the leading whitespace of a line.
#[must_use]
pub fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    SingleQuoted,
    DoubleQuoted,
    BlockComment,
}

/// Blanks comments and string contents in PHP source lines.
///
/// String delimiters are kept so statements keep their shape; everything
/// between them, and every comment character, becomes a space. State carries
/// across lines, so multi-line strings and block comments are handled. `#[`
/// starts an attribute, not a comment. Heredoc bodies are not recognised.
///
/// # Examples
///
/// ```
/// use wp_trait_scaffold::source::mask_php;
///
/// let lines = vec!["$a = '{'; // }".to_string()];
/// assert_eq!(mask_php(&lines), vec!["$a = ' ';     ".to_string()]);
/// ```
#[must_use]
pub fn mask_php(lines: &[String]) -> Vec<String> {
    let mut state = LexState::Code;
    let mut masked = Vec::with_capacity(lines.len());

    for line in lines {
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match state {
                LexState::Code => match (c, next) {
                    ('/', Some('/')) => {
                        blank_rest(&mut out, chars.len() - i);
                        break;
                    }
                    ('#', next) if next != Some('[') => {
                        blank_rest(&mut out, chars.len() - i);
                        break;
                    }
                    ('/', Some('*')) => {
                        out.push_str("  ");
                        state = LexState::BlockComment;
                        i += 2;
                        continue;
                    }
                    ('\'', _) => {
                        out.push(c);
                        state = LexState::SingleQuoted;
                    }
                    ('"', _) => {
                        out.push(c);
                        state = LexState::DoubleQuoted;
                    }
                    _ => out.push(c),
                },
                LexState::BlockComment => {
                    if c == '*' && next == Some('/') {
                        out.push_str("  ");
                        state = LexState::Code;
                        i += 2;
                        continue;
                    }
                    out.push(' ');
                }
                LexState::SingleQuoted | LexState::DoubleQuoted => {
                    let delimiter = if state == LexState::SingleQuoted {
                        '\''
                    } else {
                        '"'
                    };
                    if c == '\\' && next.is_some() {
                        out.push_str("  ");
                        i += 2;
                        continue;
                    }
                    if c == delimiter {
                        out.push(c);
                        state = LexState::Code;
                    } else {
                        out.push(' ');
                    }
                }
            }
            i += 1;
        }

        masked.push(out);
    }

    masked
}

fn blank_rest(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n(' ', count));
}
