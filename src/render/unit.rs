//! Service unit definition for the logger.
//!
//! The unit is `Type=oneshot` with `RemainAfterExit=yes`: systemd only
//! supervises the `screen -dmS` launcher, which forks the session and exits.
//! The logger itself lives in the detached screen session, outside
//! systemd's restart policy.
//!
//! Values are escaped for systemd's own parser: `%` and `$` are doubled so
//! they are not expanded, and command arguments that contain whitespace,
//! quotes or backslashes are wrapped in `"..."` so each one stays one word.

use std::fmt;
use std::path::PathBuf;

use crate::config::ProvisioningConfig;
use crate::host::FileResource;

use super::GENERATED_BANNER;

/// Absolute path of the terminal multiplexer.
pub const SCREEN_BIN: &str = "/usr/bin/screen";

/// Fields of the rendered unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnit {
    pub description: String,
    pub after: String,
    pub service_type: String,
    pub exec_start: String,
    pub exec_stop: String,
    pub working_directory: PathBuf,
    pub remain_after_exit: bool,
    pub user: String,
    pub wanted_by: String,
}

/// Escape `%` specifiers so systemd keeps them literal.
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}

/// One `ExecStart=`/`ExecStop=` argument, escaped so systemd reads it back
/// as exactly `arg`.
fn exec_arg(arg: &str) -> String {
    let escaped = escape_specifiers(arg).replace('$', "$$");
    let needs_quotes = escaped.is_empty()
        || escaped
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'));
    if !needs_quotes {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 2);
    out.push('"');
    for c in escaped.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn exec_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| exec_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Command that opens the detached, named session running the logger.
pub fn start_command(config: &ProvisioningConfig) -> String {
    exec_line(&[
        SCREEN_BIN.to_string(),
        "-dmS".to_string(),
        config.session_name.clone(),
        config.venv_python().to_string_lossy().into_owned(),
        config.entry_point.to_string_lossy().into_owned(),
    ])
}

/// Command that closes the session.
pub fn stop_command(config: &ProvisioningConfig) -> String {
    exec_line(&[SCREEN_BIN, "-S", config.session_name.as_str(), "-X", "quit"])
}

impl ServiceUnit {
    /// Build the unit from the resolved configuration.
    pub fn from_config(config: &ProvisioningConfig) -> Self {
        Self {
            description: format!(
                "SQM light-sensor logger (screen session '{}')",
                config.session_name
            ),
            after: "network.target".to_string(),
            service_type: "oneshot".to_string(),
            exec_start: start_command(config),
            exec_stop: stop_command(config),
            working_directory: config.project_dir.clone(),
            remain_after_exit: true,
            user: config.user.clone(),
            wanted_by: "multi-user.target".to_string(),
        }
    }
}

impl fmt::Display for ServiceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Unit]")?;
        writeln!(f, "Description={}", escape_specifiers(&self.description))?;
        writeln!(f, "After={}", self.after)?;
        writeln!(f)?;
        writeln!(f, "[Service]")?;
        writeln!(f, "Type={}", self.service_type)?;
        writeln!(f, "ExecStart={}", self.exec_start)?;
        writeln!(f, "ExecStop={}", self.exec_stop)?;
        writeln!(
            f,
            "WorkingDirectory={}",
            escape_specifiers(&self.working_directory.to_string_lossy())
        )?;
        writeln!(
            f,
            "RemainAfterExit={}",
            if self.remain_after_exit { "yes" } else { "no" }
        )?;
        writeln!(f, "User={}", self.user)?;
        writeln!(f)?;
        writeln!(f, "[Install]")?;
        writeln!(f, "WantedBy={}", self.wanted_by)
    }
}

/// Render `/etc/systemd/system/<service>.service`.
pub fn render_service_unit(config: &ProvisioningConfig) -> FileResource {
    let unit = ServiceUnit::from_config(config);
    FileResource::new(config.unit_path(), format!("{}\n{}", GENERATED_BANNER, unit))
}
