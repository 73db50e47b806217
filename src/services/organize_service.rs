use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, ApplyError};
use crate::models::plan::{Approvals, ProposedChange};
use crate::models::report::{Anomaly, AnomalyReason, ApplyOutcome};
use crate::models::undo_batch::UndoBatch;
use crate::safety;
use crate::services::file_service::{FileSystem, PathStatus};

fn skip(outcome: &mut ApplyOutcome, anomaly: Anomaly) {
    tracing::warn!(item = %anomaly.item, reason = %anomaly.reason, "skipped during apply");
    outcome.anomalies.push(anomaly);
}

fn fatal(source: AppError, partial: ApplyOutcome) -> ApplyError {
    tracing::error!(error = %source, moved = partial.moved(), "apply aborted");
    ApplyError { source, partial }
}

/// Per-file move failures the batch survives. Everything else is fatal.
fn is_recoverable_move_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
    )
}

/// Applies every approved change in plan order and returns the batch that
/// reverses exactly what happened.
///
/// Missing sources, collisions, unsafe folder names and similar per-item
/// problems become anomalies. Only an unexpected I/O failure aborts, and the
/// error then carries the partial outcome so the completed part can be undone.
pub fn apply(
    fs: &dyn FileSystem,
    plan: &[ProposedChange],
    approvals: &Approvals,
    base: &Path,
) -> Result<ApplyOutcome, ApplyError> {
    let mut outcome = ApplyOutcome::new(UndoBatch::new(base));

    if !fs.path_status(base).is_directory() {
        let err = AppError::General(format!("not a directory: {}", base.display()));
        return Err(fatal(err, outcome));
    }
    let canonical_base = match fs.canonicalize(base) {
        Ok(path) => path,
        Err(e) => {
            return Err(fatal(
                AppError::filesystem("resolve base directory", base, e),
                outcome,
            ))
        }
    };

    for (index, change) in plan.iter().enumerate() {
        if !approvals.is_approved(index) {
            tracing::debug!(index, folder = %change.folder_name, "change not approved");
            continue;
        }

        let relative = match safety::validate_target_folder(&change.folder_name) {
            Ok(relative) => relative,
            Err(e) => {
                skip(
                    &mut outcome,
                    Anomaly::new(&change.folder_name, AnomalyReason::UnsafeTargetFolder)
                        .with_detail(e.to_string()),
                );
                continue;
            }
        };
        let target = base.join(&relative);

        match ensure_target(fs, base, &canonical_base, &target, change, &mut outcome) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => return Err(fatal(e, outcome)),
        }

        for file_name in &change.files_to_move {
            if let Err(e) = move_file(fs, base, &relative, &target, file_name, &mut outcome) {
                return Err(fatal(e, outcome));
            }
        }
    }

    tracing::info!(
        batch = %outcome.batch.id,
        moved = outcome.moved(),
        created = outcome.created(),
        skipped = outcome.anomalies.len(),
        "plan applied"
    );
    Ok(outcome)
}

/// Makes sure `target` exists as a directory inside the base, creating the
/// missing segments one by one so each gets its own creation record.
/// Returns `Ok(false)` when the whole change has to be skipped.
fn ensure_target(
    fs: &dyn FileSystem,
    base: &Path,
    canonical_base: &Path,
    target: &Path,
    change: &ProposedChange,
    outcome: &mut ApplyOutcome,
) -> Result<bool, AppError> {
    let mut existing = target.to_path_buf();
    let mut missing: Vec<PathBuf> = Vec::new();
    while existing != base {
        match fs.path_status(&existing) {
            PathStatus::Directory => break,
            PathStatus::File => {
                skip(
                    outcome,
                    Anomaly::new(&change.folder_name, AnomalyReason::TargetNotDirectory)
                        .with_detail(existing.display().to_string()),
                );
                return Ok(false);
            }
            PathStatus::Missing => {
                missing.push(existing.clone());
                if !existing.pop() {
                    break;
                }
            }
        }
    }

    // An existing segment may be a symlink pointing elsewhere.
    if existing != base {
        let escapes = match fs.canonicalize(&existing) {
            Ok(resolved) => !resolved.starts_with(canonical_base),
            Err(_) => true,
        };
        if escapes {
            skip(
                outcome,
                Anomaly::new(&change.folder_name, AnomalyReason::UnsafeTargetFolder)
                    .with_detail(format!("{} resolves outside the base", existing.display())),
            );
            return Ok(false);
        }
    }

    if missing.is_empty() {
        return Ok(true);
    }

    if !change.is_new_folder {
        tracing::warn!(folder = %change.folder_name, "existing folder was missing, creating it");
        outcome.anomalies.push(Anomaly::new(
            &change.folder_name,
            AnomalyReason::MissingTargetFolder,
        ));
    }

    for dir in missing.into_iter().rev() {
        fs.create_directory(&dir, false)
            .map_err(|e| AppError::filesystem("create directory", &dir, e))?;
        tracing::debug!(path = %dir.display(), "created folder");
        outcome.batch.record_directory(dir);
    }
    Ok(true)
}

fn move_file(
    fs: &dyn FileSystem,
    base: &Path,
    relative_target: &Path,
    target: &Path,
    file_name: &str,
    outcome: &mut ApplyOutcome,
) -> Result<(), AppError> {
    if let Err(e) = safety::validate_file_name(file_name) {
        skip(
            outcome,
            Anomaly::new(file_name, AnomalyReason::InvalidFileName).with_detail(e.to_string()),
        );
        return Ok(());
    }

    let moves_into_itself = matches!(
        relative_target.components().next(),
        Some(Component::Normal(first)) if first == file_name
    );
    if moves_into_itself {
        skip(outcome, Anomaly::new(file_name, AnomalyReason::SelfMove));
        return Ok(());
    }

    let source = base.join(file_name);
    let destination = target.join(file_name);

    if !fs.path_status(&source).exists() {
        skip(outcome, Anomaly::new(file_name, AnomalyReason::MissingSource));
        return Ok(());
    }
    if fs.path_status(&destination).exists() {
        skip(
            outcome,
            Anomaly::new(file_name, AnomalyReason::DestinationExists)
                .with_detail(destination.display().to_string()),
        );
        return Ok(());
    }

    match fs.move_item(&source, &destination) {
        Ok(()) => {
            tracing::debug!(
                from = %source.display(),
                to = %destination.display(),
                "moved"
            );
            outcome.batch.record_move(source, destination);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            skip(
                outcome,
                Anomaly::new(file_name, AnomalyReason::DestinationExists)
                    .with_detail(e.to_string()),
            );
            Ok(())
        }
        Err(e) if is_recoverable_move_error(&e) => {
            skip(
                outcome,
                Anomaly::new(file_name, AnomalyReason::MoveFailed).with_detail(e.to_string()),
            );
            Ok(())
        }
        Err(e) => Err(AppError::filesystem("move", source, e)),
    }
}
