//! Visual theme and styling.

use console::Style;

/// Terminal theme for provisioning output.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for stage counters (dim).
    pub stage_number: Style,
    /// Style for commands and captured output (dim italic).
    pub command: Style,
    /// Style for box-drawing borders (dim).
    pub border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            stage_number: Style::new().dim(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            stage_number: Style::new(),
            command: Style::new(),
            border: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message (icon + text in dim).
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("◈"),
            self.highlight.apply_to(title)
        )
    }

    /// Format a block of captured output under a title.
    pub fn format_block(&self, title: &str, body: &str) -> String {
        let mut out = format!("{} {}", self.border.apply_to("┌"), self.highlight.apply_to(title));
        for line in body.lines() {
            out.push('\n');
            out.push_str(&format!(
                "{} {}",
                self.border.apply_to("│"),
                self.command.apply_to(line)
            ));
        }
        out.push('\n');
        out.push_str(&format!("{}", self.border.apply_to("└")));
        out
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_status_icons() {
        let theme = Theme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("failed"), "✗ failed");
        assert_eq!(theme.format_skipped("skipped"), "○ skipped");
    }

    #[test]
    fn theme_formats_header() {
        let msg = Theme::plain().format_header("sqm-provision");
        assert!(msg.contains("sqm-provision"));
    }

    #[test]
    fn block_frames_every_line() {
        let block = Theme::plain().format_block("chronyc sources -v", "a\nb");
        assert_eq!(block, "┌ chronyc sources -v\n│ a\n│ b\n└");
    }

    #[test]
    fn default_impl_matches_new() {
        assert_eq!(
            Theme::default().format_success("x"),
            Theme::new().format_success("x")
        );
    }
}
