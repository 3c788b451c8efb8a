//! Error types for provisioning operations.
//!
//! This module defines [`ProvisionError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Any external command exiting non-zero becomes [`ProvisionError::CommandFailed`]
//! - A command that cannot be started at all is [`ProvisionError::SpawnFailed`]
//! - The pipeline keeps a failing stage's error as-is, next to the stage name
//! - Use `anyhow::Error` (via `ProvisionError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A stage name given on the command line does not exist.
    #[error("Unknown stage: {name}")]
    UnknownStage { name: String },

    /// External command failed or could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command could not be started.
    #[error("Could not start {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A real run was attempted without root privileges.
    #[error("Provisioning requires root privileges (re-run with sudo or pass --dry-run)")]
    NotPrivileged,

    /// A real run was pointed at an alternate root. Commands would act on
    /// the live host while files land under the root.
    #[error("A real run cannot target --root {root}; use --dry-run or `plan` to stage into it")]
    ForeignRoot { root: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
