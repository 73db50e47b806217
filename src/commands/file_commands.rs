use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::file_entry::DirectoryEntry;
use crate::services::file_service::{FileSystem, StdFileSystem};
use crate::services::snapshot_service;

/// Absolute, symlink-free form of a directory argument.
pub(crate) fn resolve_base(dir: &Path) -> Result<PathBuf> {
    StdFileSystem
        .canonicalize(dir)
        .with_context(|| format!("cannot resolve directory {}", dir.display()))
}

fn format_listing(entries: &[DirectoryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            if entry.is_directory {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            }
        })
        .collect()
}

pub fn list(dir: &Path) -> Result<()> {
    let entries = snapshot_service::list_directory(&StdFileSystem, dir)
        .with_context(|| format!("cannot list {}", dir.display()))?;
    if entries.is_empty() {
        println!("{} is empty.", dir.display());
        return Ok(());
    }
    for line in format_listing(&entries) {
        println!("{line}");
    }
    Ok(())
}
