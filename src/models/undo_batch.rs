use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMoveRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryCreationRecord {
    pub created_path: PathBuf,
}

/// Everything one `apply` call changed, in the order it happened.
///
/// Consumed by `undo_service::undo`; a batch is never replayed or reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoBatch {
    pub id: uuid::Uuid,
    pub timestamp: DateTime<Utc>,
    pub base_directory: PathBuf,
    #[serde(default)]
    pub file_moves: Vec<FileMoveRecord>,
    #[serde(default)]
    pub directory_creations: Vec<DirectoryCreationRecord>,
}

impl UndoBatch {
    pub fn new(base_directory: impl AsRef<Path>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: Utc::now(),
            base_directory: base_directory.as_ref().to_path_buf(),
            file_moves: Vec::new(),
            directory_creations: Vec::new(),
        }
    }

    pub fn record_move(&mut self, original_path: PathBuf, new_path: PathBuf) {
        self.file_moves.push(FileMoveRecord {
            original_path,
            new_path,
        });
    }

    pub fn record_directory(&mut self, created_path: PathBuf) {
        self.directory_creations
            .push(DirectoryCreationRecord { created_path });
    }

    pub fn is_empty(&self) -> bool {
        self.file_moves.is_empty() && self.directory_creations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_insertion_order() {
        let mut batch = UndoBatch::new("/base");
        batch.record_directory(PathBuf::from("/base/Docs"));
        batch.record_move(PathBuf::from("/base/a.txt"), PathBuf::from("/base/Docs/a.txt"));
        batch.record_move(PathBuf::from("/base/b.txt"), PathBuf::from("/base/Docs/b.txt"));

        assert!(!batch.is_empty());
        assert_eq!(batch.file_moves[0].original_path, PathBuf::from("/base/a.txt"));
        assert_eq!(batch.file_moves[1].new_path, PathBuf::from("/base/Docs/b.txt"));
        assert_eq!(batch.directory_creations.len(), 1);
    }

    #[test]
    fn serialized_shape_uses_camel_case_paths() {
        let mut batch = UndoBatch::new("/base");
        batch.record_move(PathBuf::from("/base/a.txt"), PathBuf::from("/base/Docs/a.txt"));
        let value = serde_json::to_value(&batch).unwrap();

        assert_eq!(value["baseDirectory"], "/base");
        assert_eq!(value["fileMoves"][0]["originalPath"], "/base/a.txt");
        assert_eq!(value["fileMoves"][0]["newPath"], "/base/Docs/a.txt");
        assert!(value["directoryCreations"].as_array().unwrap().is_empty());
        assert!(value["timestamp"].as_str().is_some());
    }
}
