//! Make command implementation.
//!
//! Generates a class into the project and wires it into the main plugin
//! file.

use crate::actions::MakeKind;
use crate::formatters::print_report;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use wp_trait_core::cli::{ExitCode, OutputFormat};
use wp_trait_scaffold::{ClassRequest, Scaffolder};

/// Builds the library request from command-line arguments.
#[must_use]
pub fn build_request(
    kind: MakeKind,
    class_path: String,
    slug: Option<String>,
    name: Option<String>,
    variable: Option<String>,
) -> ClassRequest {
    let mut request = ClassRequest::new(kind.into(), class_path);
    if let Some(variable) = variable {
        request = request.with_variable(variable);
    }
    if let Some(slug) = slug {
        request = request.with_slug(slug);
    }
    if let Some(name) = name {
        request = request.with_singular_name(name);
    }
    request
}

/// Runs the make command.
///
/// # Errors
///
/// Returns the library error (with context) if the project is invalid, the
/// target exists or the main plugin file cannot be patched. The class file is
/// rolled back in the latter case.
pub fn run(
    kind: MakeKind,
    class_path: String,
    slug: Option<String>,
    name: Option<String>,
    variable: Option<String>,
    path: &Path,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!("Making {:?} '{}' in {}", kind, class_path, path.display());

    let request = build_request(kind, class_path.clone(), slug, name, variable);
    let scaffolder = Scaffolder::new()?;
    let report = scaffolder
        .make(path, request)
        .with_context(|| format!("failed to make '{class_path}'"))?;

    let message = format!("Created {} {}.", report.kind.label(), report.class);
    print_report(&message, &report, output_format)?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::exit_code_for;
    use std::fs;
    use tempfile::TempDir;
    use wp_trait_scaffold::ClassKind;

    #[test]
    fn test_build_request_carries_optional_fields() {
        let request = build_request(
            MakeKind::PostType,
            "Forms".to_string(),
            Some("form".to_string()),
            Some("Form".to_string()),
            Some("forms".to_string()),
        );
        assert_eq!(request.kind, ClassKind::PostType);
        assert_eq!(request.slug.as_deref(), Some("form"));
        assert_eq!(request.singular_name.as_deref(), Some("Form"));
        assert_eq!(request.variable.as_deref(), Some("forms"));

        let bare = build_request(MakeKind::Model, "Admin".to_string(), None, None, None);
        assert_eq!(bare.slug, None);
        assert_eq!(bare.variable, None);
    }

    #[test]
    fn test_make_outside_project_maps_to_validation_exit_code() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        let err = run(
            MakeKind::Model,
            "Admin".to_string(),
            None,
            None,
            None,
            &temp.path().join("empty"),
            OutputFormat::Json,
        )
        .unwrap_err();

        assert_eq!(exit_code_for(&err), ExitCode::INVALID_INPUT);
    }
}
