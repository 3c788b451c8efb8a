//! sqm-provision CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use sqm_provision::cli::{Cli, CommandDispatcher, GlobalOptions};
use sqm_provision::shell::is_ci;
use sqm_provision::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. `--verbose` sets INFO
/// 4. Default is WARN, so spinners are not interleaved with log lines
///
/// Logs go to stderr so `render` and `config` output stays clean.
fn init_tracing(debug: bool, verbose: bool) {
    let filter = if debug {
        EnvFilter::new("sqm_provision=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose {
                "sqm_provision=info"
            } else {
                "sqm_provision=warn"
            })
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);

    tracing::debug!("sqm-provision starting with args: {:?}", cli);

    // Determine output mode
    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let mut ui = create_ui(!is_ci(), output_mode);

    let dispatcher = CommandDispatcher::new(GlobalOptions::from_cli(&cli, &cwd));

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
