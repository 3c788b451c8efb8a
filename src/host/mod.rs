//! Host filesystem access.
//!
//! - [`HostRoot`] maps absolute host paths under an alternate root
//! - [`FileResource`] describes a generated file and converges the host to it

pub mod file;
pub mod root;

pub use file::{content_hash, FileChange, FileResource};
pub use root::HostRoot;
