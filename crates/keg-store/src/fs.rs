//! Mutating filesystem primitives
//!
//! Every write the store performs goes through [`FsOps`]. Directory rename
//! and symlink creation are assumed atomic on the underlying filesystem.

use std::io::{self, Write};
use std::path::Path;

/// Mutating operations on the cellar
pub trait FsOps: std::fmt::Debug {
    /// Rename a file or directory
    ///
    /// # Errors
    /// Propagates the OS error.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory symlink at `link` whose content is `target`
    ///
    /// # Errors
    /// Propagates the OS error.
    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Remove a symlink or file
    ///
    /// # Errors
    /// Propagates the OS error.
    fn remove_link(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory tree
    ///
    /// # Errors
    /// Propagates the OS error.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace `path` with `contents` atomically
    ///
    /// An existing file keeps its permissions.
    ///
    /// # Errors
    /// Propagates the OS error.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`FsOps`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FsOps for OsFs {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        platform_symlink_dir(target, link)
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        if let Ok(meta) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn platform_symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn platform_symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn platform_symlink_dir(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("receipt.json");
        std::fs::write(&path, "old").unwrap();

        OsFs.write_atomic(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("receipt.json");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        OsFs.write_atomic(&path, b"new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn symlink_dir_is_relative() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();

        OsFs.symlink_dir(Path::new("real"), &dir.path().join("alias"))
            .unwrap();

        let link = std::fs::read_link(dir.path().join("alias")).unwrap();
        assert_eq!(link, Path::new("real"));
        assert!(dir.path().join("alias").is_dir());
    }
}
