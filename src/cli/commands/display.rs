//! Shared display helpers for stage reports.
//!
//! Used by `run`, `plan`, `check`, and `last` so effects render the same way
//! everywhere.

use crate::config::ProvisioningConfig;
use crate::host::FileChange;
use crate::stages::{Effect, StageReport};
use crate::ui::UserInterface;

/// Symbol for a file change in plan output.
pub fn change_symbol(change: FileChange) -> &'static str {
    match change {
        FileChange::Create => "+",
        FileChange::Update => "~",
        FileChange::Unchanged => "=",
    }
}

/// One line describing an effect.
pub fn effect_line(effect: &Effect) -> String {
    match effect {
        Effect::CommandRan { command } => format!("$ {}", command),
        Effect::FileWritten { path, change } => {
            format!("{} {} ({})", change_symbol(*change), path.display(), change)
        }
        Effect::Skipped { reason } => format!("- skipped: {}", reason),
        Effect::Diagnostic { name, success, .. } => {
            format!("{} {}", if *success { "✓" } else { "✗" }, name)
        }
    }
}

/// Short summary after a stage finishes, e.g. `gpsd (1 file changed, 1 command)`.
pub fn stage_summary(report: &StageReport) -> String {
    let commands = report.commands().count();
    let changed = report
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::FileWritten { change, .. } if change.is_write()))
        .count();

    let mut parts = Vec::new();
    if changed > 0 {
        parts.push(plural(changed, "file changed", "files changed"));
    }
    if commands > 0 {
        parts.push(plural(commands, "command", "commands"));
    }
    if report
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Skipped { .. }))
    {
        parts.push("some work skipped".to_string());
    }

    if parts.is_empty() {
        report.stage.to_string()
    } else {
        format!("{} ({})", report.stage, parts.join(", "))
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Print every effect of a report as an indented line.
pub fn show_effects(ui: &mut dyn UserInterface, report: &StageReport) {
    for effect in &report.effects {
        ui.message(&format!("    {}", effect_line(effect)));
    }
}

/// Print captured diagnostic output as blocks; failures also as warnings.
pub fn show_diagnostics(ui: &mut dyn UserInterface, report: &StageReport) {
    for effect in &report.effects {
        if let Effect::Diagnostic {
            name,
            success,
            output,
        } = effect
        {
            let body = if output.is_empty() { "(no output)" } else { output.as_str() };
            ui.show_block(name, body);
            if !success {
                ui.warning(&format!("{} did not succeed", name));
            }
        }
    }
}

/// How to reach the logger once the service is running.
///
/// The session belongs to the unit's `User=`, so attaching goes through
/// that user's screen socket.
pub fn operator_guidance(config: &ProvisioningConfig) -> Vec<String> {
    let unit = config.unit_name();
    vec![
        format!(
            "Attach to the logger:   sudo -u {} screen -r {}",
            config.user, config.session_name
        ),
        "Detach again:           Ctrl-A D".to_string(),
        format!("Start the service:      sudo systemctl start {}", unit),
        format!("Stop the service:       sudo systemctl stop {}", unit),
        format!("Service status:         systemctl status {}", unit),
    ]
}
