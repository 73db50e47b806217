pub mod cli;
pub mod file_commands;
pub mod model_commands;
pub mod organize_commands;
pub mod organize_pipeline;
pub mod undo_commands;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::models::report::Anomaly;
use crate::state::AppState;
use cli::{Cli, Commands};

/// Resolved configuration and session state shared by the handlers.
pub struct CommandCtx {
    pub config: AppConfig,
    pub state: AppState,
}

impl CommandCtx {
    /// Config file, then environment, then command-line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config =
            AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
        if let Some(endpoint) = &cli.endpoint {
            config.ollama.endpoint = endpoint.clone();
        }
        if let Some(model) = &cli.model {
            config.ollama.model = model.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.ollama.timeout_seconds = timeout;
        }
        config.ollama.validate().context("invalid --timeout")?;
        let state = AppState::new(config.undo_file());
        Ok(Self { config, state })
    }
}

pub async fn dispatch(cli: &Cli) -> Result<()> {
    let ctx = CommandCtx::from_cli(cli)?;
    match &cli.command {
        Commands::List { dir } => file_commands::list(dir),
        Commands::Status => model_commands::status(&ctx).await,
        Commands::Propose { dir, output } => {
            model_commands::propose(&ctx, dir, output.as_deref()).await
        }
        Commands::Organize {
            dir,
            plan_file,
            reject,
            undo_file,
        } => organize_commands::organize(&ctx, dir, plan_file, reject, undo_file.as_deref()).await,
        Commands::Undo { batch_file } => undo_commands::undo(&ctx, batch_file.as_deref()).await,
        Commands::Run { dir, yes } => organize_pipeline::run(&ctx, dir, *yes).await,
    }
}

pub(crate) fn print_anomalies(anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        return;
    }
    println!("Skipped:");
    for anomaly in anomalies {
        println!("  - {anomaly}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        let undo_file = dir.path().join("undo.json");
        std::fs::write(
            &config_file,
            format!(
                "undo_file = {:?}\n[ollama]\nmodel = \"from-file\"\nendpoint = \"http://file:1\"\n",
                undo_file.display().to_string()
            ),
        )
        .unwrap();
        let config_arg = config_file.display().to_string();
        let cli = Cli::parse_from([
            "orderly",
            "--config",
            config_arg.as_str(),
            "--model",
            "from-flag",
            "--timeout",
            "10",
            "status",
        ]);

        let ctx = CommandCtx::from_cli(&cli).unwrap();

        assert_eq!(ctx.config.ollama.model, "from-flag");
        assert_eq!(ctx.config.ollama.timeout_seconds, 10);
        assert_eq!(ctx.state.undo_file(), undo_file.as_path());
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, "").unwrap();
        let config_arg = config_file.display().to_string();
        let cli = Cli::parse_from([
            "orderly",
            "--config",
            config_arg.as_str(),
            "--timeout",
            "0",
            "status",
        ]);

        assert!(CommandCtx::from_cli(&cli).is_err());
    }
}
