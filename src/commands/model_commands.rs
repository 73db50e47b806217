use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::commands::file_commands::resolve_base;
use crate::commands::CommandCtx;
use crate::models::plan::ProposedChange;
use crate::services::file_service::StdFileSystem;
use crate::services::ollama_service::OllamaClient;
use crate::services::{plan_parser, snapshot_service};

pub(crate) fn format_change(index: usize, change: &ProposedChange) -> String {
    let kind = if change.is_new_folder { "new" } else { "existing" };
    format!(
        "[{index}] {} ({kind}): {}",
        change.folder_name,
        change.files_to_move.join(", ")
    )
}

/// Snapshots `dir` and asks the model for a plan. `None` when there is
/// nothing loose to organize.
pub(crate) async fn request_plan(
    ctx: &CommandCtx,
    dir: &Path,
) -> Result<Option<(PathBuf, Vec<ProposedChange>)>> {
    let base = resolve_base(dir)?;
    let entries = snapshot_service::list_directory(&StdFileSystem, &base)
        .with_context(|| format!("cannot list {}", base.display()))?;
    let (files, folders) = snapshot_service::split_files_and_folders(&entries);
    if files.is_empty() {
        println!("No loose files in {}.", base.display());
        return Ok(None);
    }

    let client = OllamaClient::new(ctx.config.ollama.clone())?;
    if !client.check_availability().await {
        bail!(
            "Ollama is not reachable at {}. Start it with `ollama serve`.",
            ctx.config.ollama.endpoint
        );
    }

    println!(
        "Asking {} to organize {} file(s)...",
        client.model(),
        files.len()
    );
    let plan = client
        .propose_plan(&files, &folders)
        .await
        .context("failed to get a plan from the model")?;
    tracing::info!(changes = plan.len(), "plan received");
    Ok(Some((base, plan)))
}

pub async fn status(ctx: &CommandCtx) -> Result<()> {
    let endpoint = &ctx.config.ollama.endpoint;
    let client = OllamaClient::new(ctx.config.ollama.clone())?;
    if !client.check_availability().await {
        bail!("Ollama is not reachable at {endpoint}");
    }
    println!("Ollama is running at {endpoint}");

    let models = client.list_models().await.context("failed to list models")?;
    if models.is_empty() {
        println!("No models installed.");
    }
    for name in &models {
        let marker = if name == client.model() { "*" } else { " " };
        println!("{marker} {name}");
    }
    if !models.iter().any(|name| name == client.model()) {
        println!(
            "Configured model {} is not installed. Try `ollama pull {}`.",
            client.model(),
            client.model()
        );
    }
    if ctx.state.has_pending() {
        println!("An undo batch is pending: {}", ctx.state.undo_file().display());
    }
    Ok(())
}

pub async fn propose(ctx: &CommandCtx, dir: &Path, output: Option<&Path>) -> Result<()> {
    let Some((_, plan)) = request_plan(ctx, dir).await? else {
        return Ok(());
    };
    if plan.is_empty() {
        println!("The model proposed no changes.");
    }
    for (index, change) in plan.iter().enumerate() {
        println!("{}", format_change(index, change));
    }

    if let Some(path) = output {
        let json = plan_parser::plan_to_json(&plan)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write plan to {}", path.display()))?;
        println!("Plan written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_line_shows_index_kind_and_files() {
        let change = ProposedChange::new("Docs", &["a.txt", "b.txt"], true);
        assert_eq!(format_change(0, &change), "[0] Docs (new): a.txt, b.txt");

        let change = ProposedChange::new("Photos", &["c.jpg"], false);
        assert_eq!(format_change(3, &change), "[3] Photos (existing): c.jpg");
    }
}
