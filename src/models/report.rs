use serde::Serialize;

use crate::models::undo_batch::UndoBatch;

/// Why an item was skipped instead of acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    UnsafeTargetFolder,
    TargetNotDirectory,
    MissingTargetFolder,
    InvalidFileName,
    SelfMove,
    MissingSource,
    DestinationExists,
    MoveFailed,
    MissingMovedFile,
    OriginalOccupied,
    DirectoryMissing,
    DirectoryNotEmpty,
    RemoveFailed,
    OutsideBase,
}

impl AnomalyReason {
    /// Reported but acted on anyway; everything else means the item was skipped.
    pub fn is_warning(self) -> bool {
        self == Self::MissingTargetFolder
    }
}

impl std::fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsafeTargetFolder => write!(f, "target folder escapes the base directory"),
            Self::TargetNotDirectory => write!(f, "target exists but is not a folder"),
            Self::MissingTargetFolder => {
                write!(f, "folder marked as existing was missing and got created")
            }
            Self::InvalidFileName => write!(f, "not a bare file name"),
            Self::SelfMove => write!(f, "cannot move a folder into itself"),
            Self::MissingSource => write!(f, "source file not found"),
            Self::DestinationExists => write!(f, "destination already exists"),
            Self::MoveFailed => write!(f, "move failed"),
            Self::MissingMovedFile => write!(f, "moved file no longer at its new location"),
            Self::OriginalOccupied => write!(f, "original location is occupied"),
            Self::DirectoryMissing => write!(f, "created folder no longer exists"),
            Self::DirectoryNotEmpty => write!(f, "created folder is not empty, left in place"),
            Self::RemoveFailed => write!(f, "could not remove created folder"),
            Self::OutsideBase => write!(f, "recorded path is outside the batch's base directory"),
        }
    }
}

/// Per-item condition that was skipped without aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub item: String,
    pub reason: AnomalyReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Anomaly {
    pub fn new(item: impl Into<String>, reason: AnomalyReason) -> Self {
        Self {
            item: item.into(),
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {} ({detail})", self.item, self.reason),
            None => write!(f, "{}: {}", self.item, self.reason),
        }
    }
}

/// Result of applying a plan: the batch to undo it plus everything skipped.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub batch: UndoBatch,
    pub anomalies: Vec<Anomaly>,
}

impl ApplyOutcome {
    pub fn new(batch: UndoBatch) -> Self {
        Self {
            batch,
            anomalies: Vec::new(),
        }
    }

    pub fn moved(&self) -> usize {
        self.batch.file_moves.len()
    }

    pub fn created(&self) -> usize {
        self.batch.directory_creations.len()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} file(s) moved, {} folder(s) created",
            self.moved(),
            self.created()
        );
        let warnings = self.anomalies.iter().filter(|a| a.reason.is_warning()).count();
        let skipped = self.anomalies.len() - warnings;
        if skipped > 0 {
            summary.push_str(&format!(", {skipped} skipped"));
        }
        if warnings > 0 {
            summary.push_str(&format!(", {warnings} warning(s)"));
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct UndoReport {
    pub restored: usize,
    pub removed_directories: usize,
    pub anomalies: Vec<Anomaly>,
}

impl UndoReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} file(s) restored, {} folder(s) removed",
            self.restored, self.removed_directories
        );
        if !self.anomalies.is_empty() {
            summary.push_str(&format!(", {} skipped", self.anomalies.len()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_display_includes_detail() {
        let plain = Anomaly::new("a.txt", AnomalyReason::MissingSource);
        assert_eq!(plain.to_string(), "a.txt: source file not found");

        let detailed = Anomaly::new("b.txt", AnomalyReason::MoveFailed).with_detail("denied");
        assert_eq!(detailed.to_string(), "b.txt: move failed (denied)");
    }

    #[test]
    fn apply_summary_mentions_skips_only_when_present() {
        let mut outcome = ApplyOutcome::new(UndoBatch::new("/base"));
        assert_eq!(outcome.summary(), "0 file(s) moved, 0 folder(s) created");

        outcome
            .anomalies
            .push(Anomaly::new("x", AnomalyReason::MissingSource));
        assert_eq!(
            outcome.summary(),
            "0 file(s) moved, 0 folder(s) created, 1 skipped"
        );
    }

    #[test]
    fn apply_summary_counts_created_missing_folder_as_warning() {
        let mut outcome = ApplyOutcome::new(UndoBatch::new("/base"));
        outcome.batch.record_directory("/base/Photos".into());
        outcome
            .batch
            .record_move("/base/c.jpg".into(), "/base/Photos/c.jpg".into());
        outcome
            .anomalies
            .push(Anomaly::new("Photos", AnomalyReason::MissingTargetFolder));

        assert_eq!(
            outcome.summary(),
            "1 file(s) moved, 1 folder(s) created, 1 warning(s)"
        );
    }

    #[test]
    fn reasons_serialize_as_snake_case() {
        let value = serde_json::to_value(AnomalyReason::DirectoryNotEmpty).unwrap();
        assert_eq!(value, "directory_not_empty");
    }
}
