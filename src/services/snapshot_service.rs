use std::path::Path;

use crate::error::AppError;
use crate::models::file_entry::DirectoryEntry;
use crate::services::file_service::FileSystem;

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Lists the visible immediate children of `path`, sorted by name
/// case-insensitively. Either the whole listing succeeds or nothing is returned.
pub fn list_directory(fs: &dyn FileSystem, path: &Path) -> Result<Vec<DirectoryEntry>, AppError> {
    if !fs.path_status(path).is_directory() {
        return Err(AppError::General(format!(
            "not a directory: {}",
            path.display()
        )));
    }

    let mut entries: Vec<DirectoryEntry> = fs
        .list_directory(path)
        .map_err(|e| AppError::filesystem("list directory", path, e))?
        .into_iter()
        .filter(|entry| !is_hidden(&entry.name))
        .collect();

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(entries)
}

/// Loose files and existing subfolders, the two lists the model prompt needs.
pub fn split_files_and_folders(entries: &[DirectoryEntry]) -> (Vec<String>, Vec<String>) {
    let (folders, files): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.is_directory);
    (
        files.into_iter().map(|e| e.name.clone()).collect(),
        folders.into_iter().map(|e| e.name.clone()).collect(),
    )
}
