//! Configuration file discovery and loading.
//!
//! This module finds the configuration file, parses it, expands
//! `${var}` references and validates the result.

use crate::config::interpolation::resolve_config;
use crate::config::schema::ProvisioningConfig;
use crate::config::validator::validate;
use crate::error::{ProvisionError, Result};
use crate::host::HostRoot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sqm-provision.yml";

/// System-wide config location (resolved under the host root).
pub const SYSTEM_CONFIG_FILE: &str = "/etc/sqm-provision/config.yml";

/// A resolved, validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The resolved configuration.
    pub config: ProvisioningConfig,
    /// File it was read from (None means built-in defaults).
    pub source: Option<PathBuf>,
}

/// Find the config file to use.
///
/// Lookup order:
/// 1. `explicit` (from `--config`), which must exist
/// 2. `sqm-provision.yml` in `cwd`
/// 3. `/etc/sqm-provision/config.yml` under `root`
///
/// Returns `Ok(None)` when nothing is found and no explicit path was given.
pub fn discover_config(
    explicit: Option<&Path>,
    cwd: &Path,
    root: &HostRoot,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    let system = root.resolve(Path::new(SYSTEM_CONFIG_FILE));
    if system.is_file() {
        return Ok(Some(system));
    }

    Ok(None)
}

/// Parse YAML content into a raw (unresolved) config.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ProvisioningConfig> {
    if content.trim().is_empty() {
        return Ok(ProvisioningConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| ProvisionError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single config file without resolving it.
pub fn load_config_file(path: &Path) -> Result<ProvisioningConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProvisionError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Resolve interpolation and validate a raw config.
pub fn finalize(raw: &ProvisioningConfig) -> Result<ProvisioningConfig> {
    let config = resolve_config(raw)?;
    validate(&config)?;
    Ok(config)
}

/// Discover, load, resolve and validate the configuration.
pub fn load_config(explicit: Option<&Path>, cwd: &Path, root: &HostRoot) -> Result<LoadedConfig> {
    let source = discover_config(explicit, cwd, root)?;

    let raw = match &source {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        None => {
            debug!("No config file found, using built-in defaults");
            ProvisioningConfig::default()
        }
    };

    Ok(LoadedConfig {
        config: finalize(&raw)?,
        source,
    })
}
