//! Non-interactive UI for CI/headless environments.

use super::theme::Theme;
use super::{NoopSpinner, OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Prints plain lines with no cursor movement, so output stays readable in
/// logs and `journalctl`.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: Theme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: Theme::plain(),
        }
    }
}

/// Spinner replacement that prints one line when the operation finishes.
pub struct LineSpinner {
    theme: Theme,
}

impl LineSpinner {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        println!("{}", self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        println!("{}", self.theme.format_skipped(msg));
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("{}", message);
            Box::new(LineSpinner::new(self.theme.clone()))
        } else {
            Box::new(NoopSpinner)
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            println!("[{}/{}]", current, total);
        }
    }

    fn show_block(&mut self, title: &str, body: &str) {
        if self.mode.shows_diagnostics() {
            println!("{}", self.theme.format_block(title, body));
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
