//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file. Every field has a default, so an empty file (or no
//! file at all) yields the stock Raspberry Pi layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory holding systemd unit definitions.
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";

/// Root configuration structure for `sqm-provision.yml`.
///
/// Path and string fields may reference each other with `${name}`
/// (see [`crate::config::interpolation`]). Values are resolved once at
/// load time and are immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Account that owns the logger service.
    pub user: String,

    /// Checkout of the logger application.
    pub project_dir: PathBuf,

    /// Isolated Python environment.
    pub venv_dir: PathBuf,

    /// Script the service launches.
    pub entry_point: PathBuf,

    /// Dependency manifest installed into the environment when present.
    pub requirements: PathBuf,

    /// Serial device the GPS daemon reads.
    pub gps_device: PathBuf,

    /// Extra flags passed to the GPS daemon at startup.
    pub gpsd_options: String,

    /// Name of the detached screen session running the logger.
    pub session_name: String,

    /// Unit name, without the `.service` suffix.
    pub service_name: String,

    /// Interpreter used to create the environment.
    pub python: String,

    /// OS packages installed before anything else.
    pub packages: Vec<String>,

    /// Health check tuning.
    pub health: HealthSettings,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            user: "pi".to_string(),
            project_dir: PathBuf::from("/home/${user}/sqm"),
            venv_dir: PathBuf::from("${project_dir}/venv"),
            entry_point: PathBuf::from("${project_dir}/main.py"),
            requirements: PathBuf::from("${project_dir}/requirements.txt"),
            gps_device: PathBuf::from("/dev/ttyACM0"),
            gpsd_options: "-n".to_string(),
            session_name: "sqm".to_string(),
            service_name: "sqm-logger".to_string(),
            python: "python3".to_string(),
            packages: default_packages(),
            health: HealthSettings::default(),
        }
    }
}

fn default_packages() -> Vec<String> {
    [
        "python3",
        "python3-venv",
        "python3-pip",
        "gpsd",
        "gpsd-clients",
        "chrony",
        "screen",
        "git",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Settings for the diagnostic stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Upper bound on the raw GPS read, in seconds.
    pub gps_read_seconds: u32,

    /// Number of NMEA sentences to read from the GPS feed.
    pub gps_sentences: u32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            gps_read_seconds: 5,
            gps_sentences: 10,
        }
    }
}

impl ProvisioningConfig {
    /// Interpreter inside the isolated environment.
    pub fn venv_python(&self) -> PathBuf {
        self.venv_bin().join("python")
    }

    /// Directory of executables inside the isolated environment.
    pub fn venv_bin(&self) -> PathBuf {
        self.venv_dir.join("bin")
    }

    /// Full unit name, e.g. `sqm-logger.service`.
    pub fn unit_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Where the unit definition is written.
    pub fn unit_path(&self) -> PathBuf {
        Path::new(SYSTEMD_UNIT_DIR).join(self.unit_name())
    }

    /// Logger settings file that sits next to the entry point.
    pub fn logger_config_path(&self) -> PathBuf {
        self.entry_point
            .parent()
            .unwrap_or(&self.project_dir)
            .join("config.yaml")
    }

    /// Interpolatable fields by name.
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("user".to_string(), self.user.clone());
        vars.insert("project_dir".to_string(), path_str(&self.project_dir));
        vars.insert("venv_dir".to_string(), path_str(&self.venv_dir));
        vars.insert("entry_point".to_string(), path_str(&self.entry_point));
        vars.insert("requirements".to_string(), path_str(&self.requirements));
        vars.insert("gps_device".to_string(), path_str(&self.gps_device));
        vars.insert("gpsd_options".to_string(), self.gpsd_options.clone());
        vars.insert("session_name".to_string(), self.session_name.clone());
        vars.insert("service_name".to_string(), self.service_name.clone());
        vars.insert("python".to_string(), self.python.clone());
        vars
    }

    /// Replace interpolatable fields with resolved values.
    ///
    /// Names missing from `vars` keep their current value.
    pub fn set_variables(&mut self, vars: &BTreeMap<String, String>) {
        let take = |name: &str, current: &mut String| {
            if let Some(v) = vars.get(name) {
                current.clone_from(v);
            }
        };
        let take_path = |name: &str, current: &mut PathBuf| {
            if let Some(v) = vars.get(name) {
                *current = PathBuf::from(v);
            }
        };

        take("user", &mut self.user);
        take_path("project_dir", &mut self.project_dir);
        take_path("venv_dir", &mut self.venv_dir);
        take_path("entry_point", &mut self.entry_point);
        take_path("requirements", &mut self.requirements);
        take_path("gps_device", &mut self.gps_device);
        take("gpsd_options", &mut self.gpsd_options);
        take("session_name", &mut self.session_name);
        take("service_name", &mut self.service_name);
        take("python", &mut self.python);
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
