//! Alternate filesystem root.

use std::path::{Component, Path, PathBuf};

/// Filesystem root that absolute host paths are resolved against.
///
/// The default root is `/`, which leaves paths untouched. Any other root
/// stages files into a directory tree instead, e.g. a mounted SD-card image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRoot {
    root: PathBuf,
}

impl Default for HostRoot {
    fn default() -> Self {
        Self::system()
    }
}

impl HostRoot {
    /// The live system root.
    pub fn system() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }

    /// A root at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    /// Get the root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// True when this is the live system root.
    pub fn is_system(&self) -> bool {
        self.root == Path::new("/")
    }

    /// Map a host path onto this root.
    ///
    /// `/etc/default/gpsd` under root `/mnt/img` becomes
    /// `/mnt/img/etc/default/gpsd`. Relative paths are joined as-is.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if self.is_system() {
            return path.to_path_buf();
        }
        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.root.join(relative)
    }

    /// Check whether a host path exists under this root.
    pub fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_root_leaves_paths_alone() {
        let root = HostRoot::system();
        assert!(root.is_system());
        assert_eq!(
            root.resolve(Path::new("/etc/default/gpsd")),
            PathBuf::from("/etc/default/gpsd")
        );
    }

    #[test]
    fn alternate_root_prefixes_absolute_paths() {
        let root = HostRoot::new("/mnt/img");
        assert!(!root.is_system());
        assert_eq!(
            root.resolve(Path::new("/etc/chrony/conf.d/gps.conf")),
            PathBuf::from("/mnt/img/etc/chrony/conf.d/gps.conf")
        );
    }

    #[test]
    fn exists_checks_under_root() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("home/pi/sqm/venv")).unwrap();
        let root = HostRoot::new(temp.path());
        assert!(root.exists(Path::new("/home/pi/sqm/venv")));
        assert!(!root.exists(Path::new("/home/pi/sqm/missing")));
    }
}
