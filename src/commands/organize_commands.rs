use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::commands::file_commands::resolve_base;
use crate::commands::{print_anomalies, CommandCtx};
use crate::models::plan::{Approvals, ProposedChange};
use crate::models::report::ApplyOutcome;
use crate::models::undo_batch::UndoBatch;
use crate::services::file_service::StdFileSystem;
use crate::services::{organize_service, plan_parser, undo_service};

fn record_batch(ctx: &CommandCtx, batch: &UndoBatch, undo_file: Option<&Path>) -> Result<()> {
    if batch.is_empty() {
        println!("Nothing was changed, so there is nothing to undo.");
        return Ok(());
    }
    match undo_file {
        Some(path) => {
            undo_service::save_batch(path, batch)
                .with_context(|| format!("cannot write undo batch to {}", path.display()))?;
            println!("Undo with `orderly undo {}`", path.display());
        }
        None => {
            ctx.state
                .store_pending(batch.clone())
                .context("cannot store undo batch")?;
            println!("Undo with `orderly undo`");
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ApplyOutcome) {
    println!("{}", outcome.summary());
    print_anomalies(&outcome.anomalies);
}

/// Applies on a blocking thread and records the batch, including the partial
/// batch of an aborted apply.
pub(crate) async fn apply_and_record(
    ctx: &CommandCtx,
    plan: Vec<ProposedChange>,
    approvals: Approvals,
    base: PathBuf,
    undo_file: Option<&Path>,
) -> Result<ApplyOutcome> {
    let _guard = ctx.state.begin_operation("apply")?;
    let result = tokio::task::spawn_blocking(move || {
        organize_service::apply(&StdFileSystem, &plan, &approvals, &base)
    })
    .await
    .context("apply task failed")?;

    match result {
        Ok(outcome) => {
            print_outcome(&outcome);
            record_batch(ctx, &outcome.batch, undo_file)?;
            Ok(outcome)
        }
        Err(err) => {
            print_outcome(&err.partial);
            if let Err(record_err) = record_batch(ctx, &err.partial.batch, undo_file) {
                tracing::error!(error = %record_err, "partial undo batch was not saved");
            }
            Err(err.into())
        }
    }
}

pub async fn organize(
    ctx: &CommandCtx,
    dir: &Path,
    plan_file: &Path,
    reject: &[usize],
    undo_file: Option<&Path>,
) -> Result<()> {
    let base = resolve_base(dir)?;
    let raw = std::fs::read_to_string(plan_file)
        .with_context(|| format!("cannot read plan {}", plan_file.display()))?;
    let plan = plan_parser::parse_plan(&raw)
        .with_context(|| format!("invalid plan in {}", plan_file.display()))?;

    for &index in reject.iter().filter(|&&index| index >= plan.len()) {
        tracing::warn!(index, changes = plan.len(), "rejected index is not in the plan");
    }
    let approvals = Approvals::rejecting(reject.iter().copied());
    println!(
        "Applying {} of {} change(s) in {}",
        approvals.approved_count(plan.len()),
        plan.len(),
        base.display()
    );

    apply_and_record(ctx, plan, approvals, base, undo_file).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use std::fs;

    fn test_ctx(dir: &tempfile::TempDir) -> CommandCtx {
        CommandCtx {
            config: AppConfig::default(),
            state: AppState::new(dir.path().join("state/last_undo.json")),
        }
    }

    #[tokio::test]
    async fn organize_applies_plan_file_and_stores_pending_batch() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.jpg"] {
            fs::write(base.path().join(name), name).unwrap();
        }
        let plan_file = scratch.path().join("plan.json");
        fs::write(
            &plan_file,
            r#"[{"folderName":"Docs","filesToMove":["a.txt","b.txt"],"isNewFolder":true},
                {"folderName":"Images","filesToMove":["c.jpg"],"isNewFolder":true}]"#,
        )
        .unwrap();
        let ctx = test_ctx(&scratch);

        organize(&ctx, base.path(), &plan_file, &[1], None)
            .await
            .unwrap();

        assert!(base.path().join("Docs/a.txt").exists());
        assert!(base.path().join("c.jpg").exists());
        assert!(!base.path().join("Images").exists());
        let batch = ctx.state.take_pending().unwrap().unwrap();
        assert_eq!(batch.file_moves.len(), 2);
    }

    #[tokio::test]
    async fn organize_writes_explicit_undo_file() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(base.path().join("a.txt"), "a").unwrap();
        let plan_file = scratch.path().join("plan.json");
        fs::write(
            &plan_file,
            "```json\n[{\"folderName\":\"Docs\",\"filesToMove\":[\"a.txt\"]}]\n```",
        )
        .unwrap();
        let undo_file = scratch.path().join("batch.json");
        let ctx = test_ctx(&scratch);

        organize(&ctx, base.path(), &plan_file, &[], Some(&undo_file))
            .await
            .unwrap();

        let batch = undo_service::load_batch(&undo_file).unwrap();
        assert_eq!(batch.directory_creations.len(), 1);
        assert!(!ctx.state.has_pending());
    }

    #[tokio::test]
    async fn nothing_moved_leaves_previous_batch_alone() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&scratch);
        let previous = UndoBatch::new(base.path());
        let previous_id = previous.id;
        ctx.state.store_pending(previous).unwrap();

        let plan = vec![ProposedChange::new("Docs", &["missing.txt"], true)];
        let outcome = apply_and_record(
            &ctx,
            plan,
            Approvals::all(),
            base.path().to_path_buf(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(outcome.moved(), 0);
        assert_eq!(outcome.anomalies.len(), 1);
        assert_eq!(ctx.state.take_pending().unwrap().unwrap().id, previous_id);
    }

    #[tokio::test]
    async fn malformed_plan_file_is_rejected_before_touching_disk() {
        let base = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(base.path().join("a.txt"), "a").unwrap();
        let plan_file = scratch.path().join("plan.json");
        fs::write(&plan_file, "I could not decide.").unwrap();
        let ctx = test_ctx(&scratch);

        let err = organize(&ctx, base.path(), &plan_file, &[], None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid plan"));
        assert!(base.path().join("a.txt").exists());
        assert!(!ctx.state.has_pending());
    }
}
