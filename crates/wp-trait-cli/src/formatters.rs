//! Output formatters for CLI commands.
//!
//! Every command prints a serializable report. JSON is for tools, text is a
//! flat `key: value` listing for shell scripts, and pretty is a colored tree
//! for people.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wp_trait_core::cli::OutputFormat;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if the data cannot be serialized.
///
/// # Examples
///
/// ```
/// use wp_trait_cli::formatters::format_output;
/// use wp_trait_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Created {
///     file: String,
/// }
///
/// let report = Created { file: "src/Admin.php".to_string() };
/// let output = format_output(&report, OutputFormat::Text)?;
/// assert_eq!(output, "file: src/Admin.php");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// Prints `report`, preceded by a green status line in pretty mode.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn print_report<T: Serialize>(message: &str, report: &T, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Pretty {
        println!("{} {message}", "Success:".green().bold());
    }
    println!("{}", format_output(report, format)?);
    Ok(())
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let json = serde_json::to_string_pretty(data)?;
        Ok(json)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize};
    use serde_json::Value;

    /// Format data as one `path: value` line per leaf.
    ///
    /// Nested keys are joined with `.`, array items are addressed by index.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut lines = Vec::new();
        flatten(&value, String::new(), &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, path: String, lines: &mut Vec<String>) {
        let child = |key: &str| {
            if path.is_empty() {
                key.to_string()
            } else {
                format!("{path}.{key}")
            }
        };

        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, val) in map {
                    flatten(val, child(key), lines);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, item) in items.iter().enumerate() {
                    flatten(item, child(&i.to_string()), lines);
                }
            }
            Value::String(s) => lines.push(leaf(&path, s)),
            other => lines.push(leaf(&path, &other.to_string())),
        }
    }

    fn leaf(path: &str, value: &str) -> String {
        if path.is_empty() {
            value.to_string()
        } else {
            format!("{path}: {value}")
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use serde_json::Value;

    /// Format data as a colored, indented tree.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = Vec::new();
        match &value {
            Value::Object(_) | Value::Array(_) => write_children(&value, 0, &mut out),
            scalar => out.push(scalar_str(scalar)),
        }
        Ok(out.join("\n"))
    }

    fn write_children(value: &Value, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        match value {
            Value::Object(map) => {
                for (key, val) in map {
                    write_entry(&format!("{indent}{}", key.blue().bold()), val, depth, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    write_entry(&format!("{indent}{}", "-".dimmed()), item, depth, out);
                }
            }
            _ => {}
        }
    }

    fn write_entry(label: &str, value: &Value, depth: usize, out: &mut Vec<String>) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                out.push(format!("{label}:"));
                write_children(value, depth + 1, out);
            }
            Value::Array(items) if !items.is_empty() => {
                out.push(format!("{label}:"));
                write_children(value, depth + 1, out);
            }
            scalar => out.push(format!("{label}: {}", scalar_str(scalar))),
        }
    }

    fn scalar_str(value: &Value) -> String {
        match value {
            Value::Null => "none".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(_) => "[]".to_string(),
            Value::Object(_) => "{}".to_string(),
        }
    }
}
