use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use episub_core::DownloadOptions;

#[derive(Debug, Parser)]
#[command(name = "episub")]
#[command(about = "Track episodic feeds and hand new releases to download agents")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, short = 'c', env = "EPISUB_CONFIG", default_value = "episub.toml")]
    pub config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Subscribe to a feed
    Add {
        /// Series name
        name: String,
        /// Extra search keywords (group, resolution, ...)
        keywords: Vec<String>,
    },

    /// Unsubscribe by sid
    Remove {
        sid: String,
    },

    /// List subscriptions, newest first
    List,

    /// Show a subscription's threads
    Show {
        /// Subscription sid, or its vid from `list`
        subscription: String,
        /// Episode selector: `all`, `12`, `3..7`, `1,3,5..8`
        #[arg(default_value = "all")]
        selector: String,
    },

    /// Fetch new threads for every subscription
    Update,

    /// Send selected threads to a download agent
    Download {
        /// Subscription sid, or its vid from `list`
        subscription: String,
        /// Episode selector: `all`, `12`, `3..7`, `1,3,5..8`
        #[arg(default_value = "all")]
        selector: String,
        #[command(flatten)]
        options: DownloadArgs,
    },
}

/// Per-invocation overrides of the configured download defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct DownloadArgs {
    /// Download client (aria2 or deluge)
    #[arg(long)]
    pub client: Option<String>,

    /// Directory to save into
    #[arg(long, short = 'd')]
    pub destination: Option<String>,

    /// aria2 JSON-RPC endpoint
    #[arg(long)]
    pub jsonrpc: Option<String>,
}

impl From<DownloadArgs> for DownloadOptions {
    fn from(args: DownloadArgs) -> Self {
        Self {
            client: args.client,
            destination: args.destination,
            jsonrpc: args.jsonrpc,
        }
    }
}
