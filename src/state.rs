use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::AppError;
use crate::models::undo_batch::UndoBatch;
use crate::services::undo_service;

/// Session state shared by the commands: at most one pending undo batch,
/// mirrored to `undo_file`, and a flag that serializes apply/undo calls.
pub struct AppState {
    pending_undo: Mutex<Option<UndoBatch>>,
    undo_file: PathBuf,
    busy: AtomicBool,
}

/// Held while an apply or undo runs; releases the busy flag on drop.
pub struct OperationGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl AppState {
    pub fn new(undo_file: impl Into<PathBuf>) -> Self {
        Self {
            pending_undo: Mutex::new(None),
            undo_file: undo_file.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn undo_file(&self) -> &Path {
        &self.undo_file
    }

    pub fn begin_operation(&self, label: &str) -> Result<OperationGuard<'_>, AppError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Busy(format!(
                "cannot {label} while another operation is running"
            )));
        }
        Ok(OperationGuard { busy: &self.busy })
    }

    /// Replaces the pending batch. The previous one can no longer be undone.
    pub fn store_pending(&self, batch: UndoBatch) -> Result<(), AppError> {
        let mut pending = self
            .pending_undo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.as_ref() {
            tracing::warn!(batch = %previous.id, "discarding earlier undo batch");
        } else if self.undo_file.exists() {
            tracing::warn!(file = %self.undo_file.display(), "replacing earlier undo batch");
        }
        undo_service::save_batch(&self.undo_file, &batch)?;
        *pending = Some(batch);
        Ok(())
    }

    /// Takes the pending batch out of memory, or off disk when this session
    /// has none yet. The persisted copy is removed so it cannot be reused.
    pub fn take_pending(&self) -> Result<Option<UndoBatch>, AppError> {
        let mut pending = self
            .pending_undo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let batch = match pending.take() {
            Some(batch) => Some(batch),
            None if self.undo_file.exists() => Some(undo_service::load_batch(&self.undo_file)?),
            None => None,
        };
        self.discard_file()?;
        Ok(batch)
    }

    pub fn has_pending(&self) -> bool {
        let pending = self
            .pending_undo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.is_some() || self.undo_file.exists()
    }

    fn discard_file(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.undo_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::filesystem("remove undo batch", &self.undo_file, e)),
        }
    }
}
