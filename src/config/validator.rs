//! Configuration validation rules.
//!
//! Runs on the resolved configuration, before any stage touches the host:
//! - Paths must be absolute
//! - Session and service names must be usable as identifiers
//! - The package list must not be empty

use crate::config::schema::ProvisioningConfig;
use crate::error::{ProvisionError, Result};
use std::path::Path;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Offending field
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, field: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            field: field.to_string(),
            message,
        }
    }
}

/// Validate a resolved configuration and return all errors.
///
/// Collects every problem rather than stopping at the first one.
pub fn validate_config(config: &ProvisioningConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, path) in [
        ("project_dir", &config.project_dir),
        ("venv_dir", &config.venv_dir),
        ("entry_point", &config.entry_point),
        ("requirements", &config.requirements),
        ("gps_device", &config.gps_device),
    ] {
        errors.extend(check_absolute(field, path));
    }

    errors.extend(check_identifier("session_name", &config.session_name));
    errors.extend(check_identifier("service_name", &config.service_name));
    errors.extend(check_identifier("user", &config.user));

    if config.service_name.ends_with(".service") {
        errors.push(ValidationError::new(
            "unit-suffix",
            "service_name",
            format!(
                "service_name '{}' must not include the .service suffix",
                config.service_name
            ),
        ));
    }

    if config.python.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty",
            "python",
            "python must name an interpreter".to_string(),
        ));
    }

    if config.packages.is_empty() {
        errors.push(ValidationError::new(
            "empty",
            "packages",
            "packages must list at least one package".to_string(),
        ));
    }
    for pkg in &config.packages {
        if pkg.trim().is_empty() || pkg.chars().any(char::is_whitespace) {
            errors.push(ValidationError::new(
                "package-name",
                "packages",
                format!("invalid package name '{}'", pkg),
            ));
        }
    }

    if config.health.gps_read_seconds == 0 {
        errors.push(ValidationError::new(
            "zero",
            "health.gps_read_seconds",
            "health.gps_read_seconds must be greater than zero".to_string(),
        ));
    }

    errors
}

/// Validate and return a single error summarizing every problem.
pub fn validate(config: &ProvisioningConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(ProvisionError::ConfigValidationError { message })
}

fn check_absolute(field: &str, path: &Path) -> Option<ValidationError> {
    if path.is_absolute() {
        None
    } else {
        Some(ValidationError::new(
            "absolute-path",
            field,
            format!("{} must be an absolute path (got '{}')", field, path.display()),
        ))
    }
}

fn check_identifier(field: &str, value: &str) -> Option<ValidationError> {
    if value.is_empty() {
        return Some(ValidationError::new(
            "empty",
            field,
            format!("{} must not be empty", field),
        ));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '/') {
        return Some(ValidationError::new(
            "identifier",
            field,
            format!("{} '{}' must not contain whitespace or '/'", field, value),
        ));
    }
    None
}
