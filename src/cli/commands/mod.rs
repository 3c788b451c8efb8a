//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations and shares the global flags.

pub mod check;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod last;
pub mod plan;
pub mod render;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, GlobalOptions};
