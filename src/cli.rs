//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use releasaurus_planner::config::DEFAULT_CONFIG_FILE;

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = ".", global = true)]
    /// Local checkout the version files are read from.
    pub repo: PathBuf,

    #[arg(long, global = true)]
    /// Configuration file. Defaults to releasaurus-planner.toml in the repo.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Planning subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan release pull requests from per-package commit histories.
    Plan {
        #[arg(long)]
        /// JSON file of commits and latest releases keyed by package path.
        input: PathBuf,

        #[arg(long)]
        /// Write the candidates as JSON to this file instead of stdout.
        out_file: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        /// Apply the planned file updates to the checkout.
        write: bool,
    },

    /// Build the releases published by a merged release pull request.
    Release {
        #[arg(long)]
        /// Title of the merged pull request.
        title: String,

        #[arg(long)]
        /// File holding the body of the merged pull request.
        body_file: PathBuf,

        #[arg(long)]
        /// Head branch of the merged pull request.
        head_branch: String,

        #[arg(long)]
        /// Merge commit sha the releases are tagged at.
        sha: String,

        #[arg(long)]
        /// Labels of the merged pull request.
        label: Vec<String>,

        #[arg(long)]
        /// Write the releases as JSON to this file instead of stdout.
        out_file: Option<PathBuf>,
    },
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.repo.join(DEFAULT_CONFIG_FILE))
    }
}
