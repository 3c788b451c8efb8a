//! Duration and timestamp formatting.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format a duration for stage summaries.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{}m {}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}

/// Format a timestamp relative to now (e.g. "3 hours ago").
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now().signed_duration_since(timestamp).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    plural(hours / 24, "day")
}
