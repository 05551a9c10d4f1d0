use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Byte-level access to list files.
///
/// The tables never open files themselves; all I/O goes through a
/// `FileSystem` supplied by the caller. This keeps the table logic testable
/// without touching the disk and lets embedders store lists elsewhere.
///
/// # Usage
///
/// ```
/// # use logid::fs::{FileSystem, MemFileSystem};
/// # use std::path::Path;
/// let fs = MemFileSystem::new();
/// fs.write(Path::new("til.json"), b"{}").unwrap();
/// assert_eq!(fs.read(Path::new("til.json")).unwrap(), b"{}");
/// ```
pub trait FileSystem {
    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates or truncates the file at `path` and writes `bytes` into it.
    ///
    /// Implementations must report errors that only surface when the file is
    /// closed instead of dropping them.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// The real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        // Dropping a File swallows close errors; sync first so they reach us.
        file.sync_all()
    }
}

/// In-memory file system for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemFileSystem {
    files: RefCell<HashMap<PathBuf, Vec<u8>>>,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, replacing any previous content.
    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.borrow_mut().insert(path.into(), bytes.into());
        self
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileSystem for MemFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.borrow().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_missing_file_is_not_found() {
        let fs = MemFileSystem::new();
        let err = fs.read(Path::new("nope.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mem_write_truncates() {
        let fs = MemFileSystem::new().with_file("a.json", b"old content".to_vec());
        fs.write(Path::new("a.json"), b"new").unwrap();
        assert_eq!(fs.contents(Path::new("a.json")).unwrap(), b"new");
    }

    #[test]
    fn test_os_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("til.json");
        OsFileSystem.write(&path, b"{}").unwrap();
        assert_eq!(OsFileSystem.read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_os_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("til.json");
        assert!(OsFileSystem.write(&path, b"{}").is_err());
    }
}
