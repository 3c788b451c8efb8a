//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::render::ARTIFACTS;

/// sqm-provision - Provision a single-board computer for the GPS-disciplined SQM logger.
#[derive(Debug, Parser)]
#[command(name = "sqm-provision")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./sqm-provision.yml and /etc/sqm-provision/config.yml)
    #[arg(short, long, global = true, env = "SQM_PROVISION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Apply changes under this directory instead of / (e.g. a mounted image)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Show verbose output, including command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision the host (default if no command specified)
    Run(RunArgs),

    /// Show what a run would change, without changing anything
    Plan(PlanArgs),

    /// Run the health checks only
    Check,

    /// Print a generated file
    Render(RenderArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Show the last run report
    Last(LastArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Preview commands and file changes without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Run only specified stages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip specified stages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run even when not root
    #[arg(long)]
    pub allow_unprivileged: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Plan only specified stages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Leave out specified stages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RenderArgs {
    /// File to render
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(ARTIFACTS))]
    pub artifact: String,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `last` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LastArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["sqm-provision"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_stage_lists_split_on_commas() {
        let cli = Cli::try_parse_from([
            "sqm-provision",
            "run",
            "--dry-run",
            "--only",
            "gpsd,timesync",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.dry_run);
                assert_eq!(args.only, vec!["gpsd", "timesync"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["sqm-provision", "plan", "--root", "/mnt/img", "-q"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/mnt/img")));
        assert!(cli.quiet);
    }

    #[test]
    fn render_rejects_unknown_artifact() {
        assert!(Cli::try_parse_from(["sqm-provision", "render", "fstab"]).is_err());
    }
}
