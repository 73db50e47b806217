use std::path::Path;

use anyhow::{Context, Result};

use crate::commands::{print_anomalies, CommandCtx};
use crate::models::report::UndoReport;
use crate::services::file_service::StdFileSystem;
use crate::services::undo_service;

fn print_report(report: &UndoReport) {
    println!("{}", report.summary());
    print_anomalies(&report.anomalies);
}

/// Undoes the batch in `batch_file`, or the pending batch when none is given.
///
/// The batch is consumed on success. After a fatal error it stays available
/// so the remainder can be retried; already restored files then show up as
/// missing and are skipped.
pub async fn undo(ctx: &CommandCtx, batch_file: Option<&Path>) -> Result<()> {
    let _guard = ctx.state.begin_operation("undo")?;

    let batch = match batch_file {
        Some(path) => undo_service::load_batch(path)
            .with_context(|| format!("cannot load undo batch {}", path.display()))?,
        None => match ctx
            .state
            .take_pending()
            .context("cannot read the pending undo batch")?
        {
            Some(batch) => batch,
            None => {
                println!("Nothing to undo.");
                return Ok(());
            }
        },
    };
    tracing::info!(
        batch = %batch.id,
        moves = batch.file_moves.len(),
        folders = batch.directory_creations.len(),
        "undoing batch"
    );

    let retry = batch.clone();
    let result = tokio::task::spawn_blocking(move || undo_service::undo(&StdFileSystem, batch))
        .await
        .context("undo task failed")?;

    match result {
        Ok(report) => {
            print_report(&report);
            if let Some(path) = batch_file {
                std::fs::remove_file(path)
                    .with_context(|| format!("cannot remove undo batch {}", path.display()))?;
            }
            Ok(())
        }
        Err(err) => {
            print_report(&err.partial);
            if batch_file.is_none() {
                if let Err(store_err) = ctx.state.store_pending(retry) {
                    tracing::error!(error = %store_err, "undo batch could not be kept for retry");
                }
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::undo_batch::UndoBatch;
    use crate::state::AppState;
    use std::fs;

    fn test_ctx(dir: &tempfile::TempDir) -> CommandCtx {
        CommandCtx {
            config: AppConfig::default(),
            state: AppState::new(dir.path().join("last_undo.json")),
        }
    }

    fn moved_batch(base: &Path) -> UndoBatch {
        fs::create_dir_all(base.join("Docs")).unwrap();
        fs::write(base.join("Docs/a.txt"), "a").unwrap();
        let mut batch = UndoBatch::new(base);
        batch.record_directory(base.join("Docs"));
        batch.record_move(base.join("a.txt"), base.join("Docs/a.txt"));
        batch
    }

    #[tokio::test]
    async fn undo_consumes_pending_batch() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&scratch);
        ctx.state.store_pending(moved_batch(base.path())).unwrap();

        undo(&ctx, None).await.unwrap();

        assert!(base.path().join("a.txt").exists());
        assert!(!base.path().join("Docs").exists());
        assert!(!ctx.state.has_pending());
    }

    #[tokio::test]
    async fn undo_deletes_consumed_batch_file() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&scratch);
        let file = scratch.path().join("batch.json");
        undo_service::save_batch(&file, &moved_batch(base.path())).unwrap();

        undo(&ctx, Some(&file)).await.unwrap();

        assert!(base.path().join("a.txt").exists());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn undo_without_pending_batch_is_a_no_op() {
        let scratch = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&scratch);
        undo(&ctx, None).await.unwrap();
    }

    #[tokio::test]
    async fn undo_is_rejected_while_apply_runs() {
        let scratch = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&scratch);
        let _apply = ctx.state.begin_operation("apply").unwrap();

        let err = undo(&ctx, None).await.unwrap_err();

        assert!(err.to_string().contains("another operation"));
    }
}
