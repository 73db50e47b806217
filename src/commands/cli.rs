//! Command-line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Orderly - organize a folder with a local model, with one-step undo
#[derive(Parser, Debug)]
#[command(name = "orderly")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama endpoint, e.g. http://localhost:11434
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model used to propose plans
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the visible entries of a directory
    List {
        dir: PathBuf,
    },

    /// Check whether the inference service is reachable
    Status,

    /// Ask the model for an organization plan
    Propose {
        dir: PathBuf,

        /// Write the plan as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a plan file to a directory
    Organize {
        dir: PathBuf,

        /// Plan JSON, or a raw model reply containing it
        plan_file: PathBuf,

        /// Zero-based index of a change to leave out (repeatable)
        #[arg(long = "reject", value_name = "INDEX")]
        reject: Vec<usize>,

        /// Write the undo batch here instead of the pending slot
        #[arg(long)]
        undo_file: Option<PathBuf>,
    },

    /// Undo a batch (the pending one when no file is given)
    Undo {
        batch_file: Option<PathBuf>,
    },

    /// Propose, review, apply and optionally undo in one session
    Run {
        dir: PathBuf,

        /// Approve every change without asking
        #[arg(short, long)]
        yes: bool,
    },
}
