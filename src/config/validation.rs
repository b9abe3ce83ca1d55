//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (defaults and redirects name known components)
//! - Validate value ranges (guard limit > 0)
//! - Detect duplicate viewport names and clashing separators
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{RouterConfig, SeparatorConfig, ViewportConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("navigation.guard_limit must be greater than 0")]
    ZeroGuardLimit,

    #[error("separator '{0}' must not be empty")]
    EmptySeparator(&'static str),

    #[error("separators '{0}' and '{1}' must differ")]
    SeparatorClash(&'static str, &'static str),

    #[error("viewport '{name}' is declared more than once in {scope}")]
    DuplicateViewport { name: String, scope: String },

    #[error("viewport with empty name in {0}")]
    UnnamedViewport(String),

    #[error("'{reference}' in {location} names unknown component '{component}'")]
    UnknownComponent {
        location: String,
        reference: String,
        component: String,
    },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.navigation.guard_limit == 0 {
        errors.push(ValidationError::ZeroGuardLimit);
    }

    validate_separators(&config.separators, &mut errors);

    let known: HashSet<&str> = config.components.iter().map(|c| c.name.as_str()).collect();

    validate_viewports(&config.viewports, "root scope", &config.separators, &known, &mut errors);
    for component in &config.components {
        let location = format!("component '{}'", component.name);
        validate_viewports(&component.viewports, &location, &config.separators, &known, &mut errors);
        if let Some(redirect) = &component.redirect {
            check_references(redirect, &location, &config.separators, &known, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_separators(separators: &SeparatorConfig, errors: &mut Vec<ValidationError>) {
    let named = [
        ("viewport", &separators.viewport),
        ("sibling", &separators.sibling),
        ("scope", &separators.scope),
        ("parameters", &separators.parameters),
        ("parameters_end", &separators.parameters_end),
        ("parameter_separator", &separators.parameter_separator),
        ("clear", &separators.clear),
    ];
    for (name, value) in named {
        if value.is_empty() {
            errors.push(ValidationError::EmptySeparator(name));
        }
    }
    for (i, (a, va)) in named.iter().enumerate() {
        for (b, vb) in named.iter().skip(i + 1) {
            if !va.is_empty() && va == vb {
                errors.push(ValidationError::SeparatorClash(*a, *b));
            }
        }
    }
}

fn validate_viewports(
    viewports: &[ViewportConfig],
    location: &str,
    separators: &SeparatorConfig,
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for viewport in viewports {
        if viewport.name.is_empty() {
            errors.push(ValidationError::UnnamedViewport(location.to_string()));
        } else if !seen.insert(viewport.name.as_str()) {
            errors.push(ValidationError::DuplicateViewport {
                name: viewport.name.clone(),
                scope: location.to_string(),
            });
        }
        if let Some(default) = &viewport.default {
            let location = format!("viewport '{}' default", viewport.name);
            check_references(default, &location, separators, known, errors);
        }
    }
}

/// Component names referenced by an instruction string, checked against the
/// declared components. Skipped when no components are declared (they are
/// then registered programmatically).
fn check_references(
    instruction: &str,
    location: &str,
    separators: &SeparatorConfig,
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if known.is_empty() {
        return;
    }
    let splitters = [&separators.sibling, &separators.scope];
    let mut parts = vec![instruction.to_string()];
    for splitter in splitters.iter().filter(|s| !s.is_empty()) {
        parts = parts
            .iter()
            .flat_map(|p| p.split(splitter.as_str()).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    for part in parts {
        // Group parentheses share the parameter characters.
        let name = part
            .trim_start_matches(separators.parameters.as_str())
            .split(separators.parameters.as_str())
            .next()
            .unwrap_or_default()
            .split(separators.viewport.as_str())
            .next()
            .unwrap_or_default()
            .trim_end_matches(separators.parameters_end.as_str());
        if name.is_empty() || name == separators.clear || known.contains(name) {
            continue;
        }
        errors.push(ValidationError::UnknownComponent {
            location: location.to_string(),
            reference: instruction.to_string(),
            component: name.to_string(),
        });
    }
}
