//! Variable interpolation for configuration values.
//!
//! Config values may reference other config fields using `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with the value of another field
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Example
//!
//! ```yaml
//! project_dir: /home/${user}/sqm
//! venv_dir: ${project_dir}/venv
//! ```

use crate::config::schema::ProvisioningConfig;
use crate::error::{ProvisionError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing `${var}` interpolations into segments.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix("$${") {
            // $${...} is kept verbatim minus one dollar sign
            let end = escaped.find('}').map(|i| i + 1).unwrap_or(escaped.len());
            literal.push_str("${");
            literal.push_str(&escaped[..end]);
            rest = &escaped[end..];
        } else if let Some(var) = tail.strip_prefix("${") {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let end = var.find('}').unwrap_or(var.len());
            segments.push(Segment::Variable(var[..end].to_string()));
            rest = var.get(end + 1..).unwrap_or("");
        } else if let Some(after) = tail.strip_prefix("$$") {
            literal.push('$');
            rest = after;
        } else {
            literal.push('$');
            rest = &tail[1..];
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Extract all variable names from an interpolated string, in sorted order.
pub fn extract_variables(input: &str) -> BTreeSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Resolve a single string against already-resolved values.
///
/// # Errors
///
/// Returns `ConfigValidationError` if a variable is not defined.
pub fn resolve_string(input: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::new();
    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Variable(name) => {
                let value = values
                    .get(&name)
                    .ok_or_else(|| ProvisionError::ConfigValidationError {
                        message: format!("Unresolved variable: ${{{}}}", name),
                    })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

/// Resolve a set of mutually-referencing variables.
///
/// Each value may reference any other name in the set. References are
/// followed depth-first; a cycle or an unknown name is an error.
pub fn resolve_all(raw: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();
    for name in raw.keys() {
        let mut stack = Vec::new();
        resolve_one(name, raw, &mut resolved, &mut stack)?;
    }
    Ok(resolved)
}

fn resolve_one(
    name: &str,
    raw: &BTreeMap<String, String>,
    resolved: &mut BTreeMap<String, String>,
    stack: &mut Vec<String>,
) -> Result<String> {
    if let Some(done) = resolved.get(name) {
        return Ok(done.clone());
    }
    if stack.iter().any(|s| s == name) {
        stack.push(name.to_string());
        return Err(ProvisionError::ConfigValidationError {
            message: format!("Circular variable reference: {}", stack.join(" -> ")),
        });
    }
    let template = raw
        .get(name)
        .ok_or_else(|| ProvisionError::ConfigValidationError {
            message: format!("Unresolved variable: ${{{}}}", name),
        })?;

    stack.push(name.to_string());
    for dep in extract_variables(template) {
        resolve_one(&dep, raw, resolved, stack)?;
    }
    stack.pop();

    let out = resolve_string(template, resolved)?;
    resolved.insert(name.to_string(), out.clone());
    Ok(out)
}

/// Return a copy of `config` with every `${var}` reference expanded.
pub fn resolve_config(config: &ProvisioningConfig) -> Result<ProvisioningConfig> {
    let values = resolve_all(&config.variables())?;
    let mut resolved = config.clone();
    resolved.set_variables(&values);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_literal_only() {
        let result = parse_interpolation("/dev/ttyACM0");
        assert_eq!(result, vec![Segment::Literal("/dev/ttyACM0".to_string())]);
    }

    #[test]
    fn parse_variable_with_surrounding_text() {
        let result = parse_interpolation("/home/${user}/sqm");
        assert_eq!(
            result,
            vec![
                Segment::Literal("/home/".to_string()),
                Segment::Variable("user".to_string()),
                Segment::Literal("/sqm".to_string()),
            ]
        );
    }

    #[test]
    fn parse_adjacent_variables() {
        let result = parse_interpolation("${a}${b}");
        assert_eq!(
            result,
            vec![
                Segment::Variable("a".to_string()),
                Segment::Variable("b".to_string()),
            ]
        );
    }

    #[test]
    fn parse_escaped_dollar_brace() {
        let result = parse_interpolation("$${HOME}/x");
        assert_eq!(result, vec![Segment::Literal("${HOME}/x".to_string())]);
    }

    #[test]
    fn parse_dollar_without_brace() {
        let result = parse_interpolation("cost $5");
        assert_eq!(result, vec![Segment::Literal("cost $5".to_string())]);
    }

    #[test]
    fn parse_empty_string() {
        assert!(parse_interpolation("").is_empty());
    }

    #[test]
    fn extract_variables_returns_unique_names() {
        let names = extract_variables("${a}/${b}/${a}");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn resolve_string_replaces_known_names() {
        let values = vars(&[("user", "pi")]);
        assert_eq!(
            resolve_string("/home/${user}", &values).unwrap(),
            "/home/pi"
        );
    }

    #[test]
    fn resolve_string_fails_on_unknown_name() {
        let result = resolve_string("${nope}", &BTreeMap::new());
        assert!(matches!(
            result,
            Err(ProvisionError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn resolve_all_follows_chains() {
        let raw = vars(&[
            ("user", "pi"),
            ("project_dir", "/home/${user}/sqm"),
            ("venv_dir", "${project_dir}/venv"),
        ]);
        let resolved = resolve_all(&raw).unwrap();
        assert_eq!(resolved["venv_dir"], "/home/pi/sqm/venv");
    }

    #[test]
    fn resolve_all_detects_cycles() {
        let raw = vars(&[("a", "${b}"), ("b", "${a}")]);
        let err = resolve_all(&raw).unwrap_err();
        assert!(err.to_string().contains("Circular"));
    }

    #[test]
    fn resolve_all_detects_self_reference() {
        let raw = vars(&[("a", "x${a}")]);
        assert!(resolve_all(&raw).is_err());
    }

    #[test]
    fn resolve_config_expands_defaults() {
        let config = resolve_config(&ProvisioningConfig::default()).unwrap();
        assert_eq!(config.project_dir, PathBuf::from("/home/pi/sqm"));
        assert_eq!(config.venv_dir, PathBuf::from("/home/pi/sqm/venv"));
        assert_eq!(config.entry_point, PathBuf::from("/home/pi/sqm/main.py"));
        assert_eq!(
            config.requirements,
            PathBuf::from("/home/pi/sqm/requirements.txt")
        );
    }

    #[test]
    fn resolve_config_honours_overridden_user() {
        let config = ProvisioningConfig {
            user: "astro".to_string(),
            ..Default::default()
        };
        let resolved = resolve_config(&config).unwrap();
        assert_eq!(resolved.venv_dir, PathBuf::from("/home/astro/sqm/venv"));
    }
}
