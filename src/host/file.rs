//! Declarative file convergence.
//!
//! A [`FileResource`] is the full desired content of one generated file.
//! Planning compares it against what is on disk; applying replaces the file
//! wholesale. Files are never edited in place.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

use super::root::HostRoot;

/// What converging a file did (or would do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChange {
    /// File did not exist.
    Create,
    /// File existed with different content.
    Update,
    /// File already had the desired content.
    Unchanged,
}

impl FileChange {
    /// True if applying writes to disk.
    pub fn is_write(&self) -> bool {
        !matches!(self, FileChange::Unchanged)
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileChange::Create => "create",
            FileChange::Update => "update",
            FileChange::Unchanged => "unchanged",
        };
        write!(f, "{}", s)
    }
}

/// Desired state of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    /// Absolute host path.
    pub path: PathBuf,
    /// Complete file content.
    pub content: String,
    /// Permission bits applied on unix.
    pub mode: u32,
}

/// SHA-256 of `bytes`, hex encoded.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl FileResource {
    /// Create a resource with mode `0644`.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: 0o644,
        }
    }

    /// Hash of the desired content.
    pub fn desired_hash(&self) -> String {
        content_hash(self.content.as_bytes())
    }

    /// Compare desired content with the file under `root`.
    pub fn plan(&self, root: &HostRoot) -> Result<FileChange> {
        let target = root.resolve(&self.path);
        match fs::read(&target) {
            Ok(existing) => {
                if content_hash(&existing) == self.desired_hash() {
                    Ok(FileChange::Unchanged)
                } else {
                    Ok(FileChange::Update)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileChange::Create),
            Err(e) => Err(e.into()),
        }
    }

    /// Converge the file under `root` to the desired content.
    ///
    /// The new content is written to a sibling temp file and renamed over
    /// the target, so an interrupted write never leaves a truncated file.
    pub fn apply(&self, root: &HostRoot) -> Result<FileChange> {
        let change = self.plan(root)?;
        let target = root.resolve(&self.path);

        if change.is_write() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let staging = staging_path(&target);
            fs::write(&staging, self.content.as_bytes())?;
            set_mode(&staging, self.mode)?;
            fs::rename(&staging, &target)?;
            debug!("Wrote {} ({})", target.display(), change);
        } else {
            debug!("{} already up to date", target.display());
        }

        Ok(change)
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".sqm-provision.tmp");
    target.with_file_name(name)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
