//! sqm-provision - Provision a single-board computer for the SQM logger.
//!
//! A run takes the host through six stages in order: OS packages, the
//! Python environment, the GPS daemon, chrony's GPS reference clock, the
//! logger's systemd unit, and health checks. The first failing stage stops
//! the run. Generated files are converged by content hash, so re-running is
//! safe and `plan` can show exactly what would change.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, interpolation, and validation
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host root mapping and declarative file convergence
//! - [`render`] - Generated gpsd, chrony, and systemd files
//! - [`runner`] - Pipeline execution
//! - [`shell`] - External command execution
//! - [`stages`] - The provisioning stages
//! - [`state`] - Persisted run reports
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use sqm_provision::config::{finalize, ProvisioningConfig};
//! use sqm_provision::render::start_command;
//!
//! let config = finalize(&ProvisioningConfig::default()).unwrap();
//! assert_eq!(
//!     start_command(&config),
//!     "/usr/bin/screen -dmS sqm /home/pi/sqm/venv/bin/python /home/pi/sqm/main.py"
//! );
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod render;
pub mod runner;
pub mod shell;
pub mod stages;
pub mod state;
pub mod ui;

pub use error::{ProvisionError, Result};
