use std::fs;
use std::io;
use std::path::Path;

use crate::error::{AppError, UndoError};
use crate::models::report::{Anomaly, AnomalyReason, UndoReport};
use crate::models::undo_batch::UndoBatch;
use crate::scope_path;
use crate::services::file_service::FileSystem;

fn skip(report: &mut UndoReport, anomaly: Anomaly) {
    tracing::warn!(item = %anomaly.item, reason = %anomaly.reason, "skipped during undo");
    report.anomalies.push(anomaly);
}

fn fatal(source: AppError, partial: UndoReport) -> UndoError {
    tracing::error!(error = %source, restored = partial.restored, "undo aborted");
    UndoError { source, partial }
}

/// Reverses a batch: files go back in reverse move order, then created
/// folders are removed deepest-first, but only while they are empty.
/// Records pointing outside the batch's base directory are never acted on.
pub fn undo(fs: &dyn FileSystem, batch: UndoBatch) -> Result<UndoReport, UndoError> {
    let mut report = UndoReport::default();
    let inside_base =
        |path: &Path| scope_path::is_strictly_within_scope(path, &batch.base_directory);

    for record in batch.file_moves.iter().rev() {
        let original = &record.original_path;
        let moved = &record.new_path;

        if !inside_base(original) || !inside_base(moved) {
            skip(
                &mut report,
                Anomaly::new(moved.display().to_string(), AnomalyReason::OutsideBase)
                    .with_detail(format!("recorded origin {}", original.display())),
            );
            continue;
        }

        if let Some(parent) = original.parent() {
            if !fs.path_status(parent).is_directory() {
                if let Err(e) = fs.create_directory(parent, true) {
                    return Err(fatal(
                        AppError::filesystem("create directory", parent, e),
                        report,
                    ));
                }
            }
        }

        if !fs.path_status(moved).exists() {
            skip(
                &mut report,
                Anomaly::new(moved.display().to_string(), AnomalyReason::MissingMovedFile),
            );
            continue;
        }
        if fs.path_status(original).exists() {
            skip(
                &mut report,
                Anomaly::new(original.display().to_string(), AnomalyReason::OriginalOccupied),
            );
            continue;
        }

        match fs.move_item(moved, original) {
            Ok(()) => {
                tracing::debug!(from = %moved.display(), to = %original.display(), "restored");
                report.restored += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => skip(
                &mut report,
                Anomaly::new(original.display().to_string(), AnomalyReason::OriginalOccupied),
            ),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => skip(
                &mut report,
                Anomaly::new(moved.display().to_string(), AnomalyReason::MoveFailed)
                    .with_detail(e.to_string()),
            ),
            Err(e) => return Err(fatal(AppError::filesystem("move", moved, e), report)),
        }
    }

    for record in batch.directory_creations.iter().rev() {
        let dir = &record.created_path;
        let item = dir.display().to_string();

        if !inside_base(dir) {
            skip(&mut report, Anomaly::new(item, AnomalyReason::OutsideBase));
            continue;
        }
        if !fs.path_status(dir).is_directory() {
            skip(&mut report, Anomaly::new(item, AnomalyReason::DirectoryMissing));
            continue;
        }
        match fs.is_empty_directory(dir) {
            Ok(true) => {}
            Ok(false) => {
                skip(&mut report, Anomaly::new(item, AnomalyReason::DirectoryNotEmpty));
                continue;
            }
            Err(e) => {
                skip(
                    &mut report,
                    Anomaly::new(item, AnomalyReason::RemoveFailed).with_detail(e.to_string()),
                );
                continue;
            }
        }
        match fs.remove_directory(dir) {
            Ok(()) => report.removed_directories += 1,
            Err(e) => skip(
                &mut report,
                Anomaly::new(item, AnomalyReason::RemoveFailed).with_detail(e.to_string()),
            ),
        }
    }

    tracing::info!(
        batch = %batch.id,
        restored = report.restored,
        removed = report.removed_directories,
        skipped = report.anomalies.len(),
        "batch undone"
    );
    Ok(report)
}

/// Writes the batch as JSON next to `path` first, then renames it into place.
pub fn save_batch(path: &Path, batch: &UndoBatch) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(batch)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_batch(path: &Path) -> Result<UndoBatch, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::filesystem("read undo batch", path, e))?;
    Ok(serde_json::from_str(&raw)?)
}
