//! Renderers for the generated host artifacts.
//!
//! Each renderer is a pure function of the resolved configuration and
//! returns a [`FileResource`] ready for convergence. Same config in, same
//! bytes out.

pub mod chrony;
pub mod gpsd;
pub mod unit;

use crate::config::ProvisioningConfig;
use crate::error::{ProvisionError, Result};
use crate::host::FileResource;

pub use chrony::{render_chrony_dropin, RefClock, CHRONY_DROPIN_PATH, GPS_REFCLOCK};
pub use gpsd::{render_gpsd_defaults, GPSD_DEFAULTS_PATH};
pub use unit::{render_service_unit, start_command, stop_command, ServiceUnit, SCREEN_BIN};

/// First line of every generated file.
pub const GENERATED_BANNER: &str =
    "# Generated by sqm-provision. Manual edits are overwritten on the next run.";

/// Names accepted by [`render_artifact`].
pub const ARTIFACTS: [&str; 3] = ["gpsd", "chrony", "unit"];

/// Render an artifact by name.
pub fn render_artifact(name: &str, config: &ProvisioningConfig) -> Result<FileResource> {
    match name {
        "gpsd" => Ok(render_gpsd_defaults(config)),
        "chrony" => Ok(render_chrony_dropin()),
        "unit" => Ok(render_service_unit(config)),
        other => Err(ProvisionError::ConfigValidationError {
            message: format!(
                "Unknown artifact '{}' (expected one of: {})",
                other,
                ARTIFACTS.join(", ")
            ),
        }),
    }
}

/// All generated files, in the order the pipeline writes them.
pub fn all_artifacts(config: &ProvisioningConfig) -> Vec<FileResource> {
    vec![
        render_gpsd_defaults(config),
        render_chrony_dropin(),
        render_service_unit(config),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::finalize;

    #[test]
    fn render_artifact_by_name() {
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        for name in ARTIFACTS {
            let res = render_artifact(name, &config).unwrap();
            assert!(res.content.starts_with(GENERATED_BANNER));
        }
    }

    #[test]
    fn render_artifact_rejects_unknown() {
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        let err = render_artifact("fstab", &config).unwrap_err();
        assert!(err.to_string().contains("fstab"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = finalize(&ProvisioningConfig::default()).unwrap();
        assert_eq!(all_artifacts(&config), all_artifacts(&config));
    }
}
