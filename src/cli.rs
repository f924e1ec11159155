//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::sync::ProviderKind;

/// Top-level CLI parser for `issuesync`.
#[derive(Debug, Parser)]
#[command(name = "issuesync", version, about = "Sync td issues with GitHub or Jira")]
pub struct Cli {
    /// Project directory (defaults to the current directory).
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file to use instead of `issuesync.yaml` in the project.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print every per-issue error after the summary.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether a provider can be used from the project.
    Check {
        /// Remote tracker.
        #[arg(long, short)]
        provider: ProviderKind,
    },
    /// Bring remote changes into td.
    Pull {
        /// Remote tracker.
        #[arg(long, short)]
        provider: ProviderKind,
    },
    /// Send td changes to the remote.
    Push {
        /// Remote tracker.
        #[arg(long, short)]
        provider: ProviderKind,
    },
    /// Push a single td issue.
    PushOne {
        /// Local issue ID.
        id: String,
        /// Remote tracker.
        #[arg(long, short)]
        provider: ProviderKind,
    },
    /// Pull, then push.
    Sync {
        /// Remote tracker.
        #[arg(long, short)]
        provider: ProviderKind,
    },
    /// Show the sync state files and how many issues each pairs.
    Status,
}
