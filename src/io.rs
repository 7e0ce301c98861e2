//! Virtual File System
//!
//! Descriptor and shader source lookups go through [`VirtualFileSystem`], so
//! the host engine decides where `shaders/...` paths actually live.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Read access to engine-relative paths.
pub trait VirtualFileSystem {
    /// Reads the whole file at `path` as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns whether `path` can be read.
    fn exists(&self, path: &Path) -> bool {
        self.read_to_string(path).is_ok()
    }
}

/// Local directory reader.
pub struct DirectoryFileSystem {
    root_path: PathBuf,
}

impl DirectoryFileSystem {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl VirtualFileSystem for DirectoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(self.root_path.join(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.root_path.join(path).is_file()
    }
}

/// In-memory file table, for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.files.remove(path)
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
