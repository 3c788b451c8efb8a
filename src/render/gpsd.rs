//! GPS daemon defaults file.

use std::fmt::Write;

use crate::config::ProvisioningConfig;
use crate::host::FileResource;

use super::GENERATED_BANNER;

/// Where gpsd reads its startup settings.
pub const GPSD_DEFAULTS_PATH: &str = "/etc/default/gpsd";

/// Render `/etc/default/gpsd`.
///
/// The device path is written as given; whether it exists is only
/// discovered by the health check.
pub fn render_gpsd_defaults(config: &ProvisioningConfig) -> FileResource {
    let mut out = String::new();
    let _ = writeln!(out, "{}", GENERATED_BANNER);
    let _ = writeln!(out, "START_DAEMON=\"true\"");
    let _ = writeln!(out, "DEVICES=\"{}\"", config.gps_device.display());
    let _ = writeln!(out, "GPSD_OPTIONS=\"{}\"", config.gpsd_options);
    let _ = writeln!(out, "USBAUTO=\"true\"");
    FileResource::new(GPSD_DEFAULTS_PATH, out)
}
