//! Command-line interface for sqm-provision.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, ConfigArgs, LastArgs, PlanArgs, RenderArgs, RunArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult, GlobalOptions};
