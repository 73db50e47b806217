use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::file_entry::DirectoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Missing,
    File,
    Directory,
}

impl PathStatus {
    pub fn exists(self) -> bool {
        self != Self::Missing
    }

    pub fn is_directory(self) -> bool {
        self == Self::Directory
    }
}

/// Filesystem operations the organizer needs. Implementations must not
/// overwrite on `move_item` when they can detect a collision, and
/// `remove_directory` must refuse non-empty directories.
pub trait FileSystem: Send + Sync {
    /// Immediate children, unsorted, hidden entries included.
    fn list_directory(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>>;

    fn path_status(&self, path: &Path) -> PathStatus;

    fn create_directory(&self, path: &Path, create_intermediates: bool) -> io::Result<()>;

    fn move_item(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_directory(&self, path: &Path) -> io::Result<()>;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    fn is_empty_directory(&self, path: &Path) -> io::Result<bool> {
        Ok(self.list_directory(path)?.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn list_directory(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            // Follow symlinks so a link to a folder lists as a folder.
            let is_directory = entry_path.is_dir();
            entries.push(DirectoryEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry_path,
                is_directory,
            });
        }
        Ok(entries)
    }

    fn path_status(&self, path: &Path) -> PathStatus {
        match fs::symlink_metadata(path) {
            Err(_) => PathStatus::Missing,
            Ok(_) if path.is_dir() => PathStatus::Directory,
            Ok(_) => PathStatus::File,
        }
    }

    fn create_directory(&self, path: &Path, create_intermediates: bool) -> io::Result<()> {
        if create_intermediates {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        }
    }

    fn move_item(&self, from: &Path, to: &Path) -> io::Result<()> {
        if fs::symlink_metadata(to).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination already exists: {}", to.display()),
            ));
        }
        fs::rename(from, to)
    }

    fn remove_directory(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// Wraps [`StdFileSystem`] and fails selected operations, for exercising
/// the fatal-error paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FaultyFileSystem {
    pub fail_move_named: Option<String>,
    pub fail_create_named: Option<String>,
    pub kind: Option<io::ErrorKind>,
}

#[cfg(test)]
impl FaultyFileSystem {
    fn injected(&self) -> io::Error {
        io::Error::new(self.kind.unwrap_or(io::ErrorKind::Other), "injected failure")
    }

    fn matches(name: &Option<String>, path: &Path) -> bool {
        match (name, path.file_name()) {
            (Some(wanted), Some(actual)) => actual == wanted.as_str(),
            _ => false,
        }
    }
}

#[cfg(test)]
impl FileSystem for FaultyFileSystem {
    fn list_directory(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        StdFileSystem.list_directory(path)
    }

    fn path_status(&self, path: &Path) -> PathStatus {
        StdFileSystem.path_status(path)
    }

    fn create_directory(&self, path: &Path, create_intermediates: bool) -> io::Result<()> {
        if Self::matches(&self.fail_create_named, path) {
            return Err(self.injected());
        }
        StdFileSystem.create_directory(path, create_intermediates)
    }

    fn move_item(&self, from: &Path, to: &Path) -> io::Result<()> {
        if Self::matches(&self.fail_move_named, from) {
            return Err(self.injected());
        }
        StdFileSystem.move_item(from, to)
    }

    fn remove_directory(&self, path: &Path) -> io::Result<()> {
        StdFileSystem.remove_directory(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        StdFileSystem.canonicalize(path)
    }
}
