//! External command execution.
//!
//! - [`CommandSpec`] describes a command as an argv vector
//! - [`CommandRunner`] is the seam every stage runs commands through
//! - [`SystemRunner`] executes, [`DryRunRunner`] previews,
//!   [`RecordingRunner`] records for tests

pub mod command;
pub mod mock;
pub mod platform;
pub mod runner;

pub use command::{
    execute, execute_streaming, CommandResult, CommandSpec, OutputCallback, OutputLine,
};
pub use mock::RecordingRunner;
pub use platform::{is_ci, is_elevated};
pub use runner::{CommandRunner, DryRunRunner, SystemRunner};
