//! Configuration loading, interpolation, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - `${var}` expansion in [`interpolation`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use sqm_provision::config::{finalize, ProvisioningConfig};
//!
//! let raw: ProvisioningConfig = serde_yaml::from_str("user: astro").unwrap();
//! let config = finalize(&raw).unwrap();
//! assert_eq!(config.project_dir.to_str(), Some("/home/astro/sqm"));
//! ```

pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

pub use interpolation::{
    extract_variables, parse_interpolation, resolve_all, resolve_config,
    resolve_string, Segment,
};
pub use loader::{
    discover_config, finalize, load_config, load_config_file, parse_config, LoadedConfig,
    LOCAL_CONFIG_FILE, SYSTEM_CONFIG_FILE,
};
pub use schema::{HealthSettings, ProvisioningConfig, SYSTEMD_UNIT_DIR};
pub use validator::{validate, validate_config, ValidationError};
