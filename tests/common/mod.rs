//! Shared fixtures for integration tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A scratch directory holding module documents and the artifact cache.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    /// Write a module document and return its path.
    pub fn write(&self, name: &str, xml: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, xml).unwrap();
        path
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }
}

/// Move a file's mtime `secs` into the future.
#[allow(dead_code)]
pub fn touch(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(secs)).unwrap();
}
