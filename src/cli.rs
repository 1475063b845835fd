//! CLI definitions for pagewatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pagewatch CLI.
#[derive(Parser)]
#[command(name = "pagewatch")]
#[command(about = "Reload a browser tab and ring an alarm when keywords show up")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagewatch/pagewatch.toml)
    #[arg(short, long, global = true, env = "PAGEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the monitor in foreground (default)
    Run,

    /// Show or change the monitor settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Count keyword matches in a text file
    Check {
        /// File holding the page text
        #[arg(long)]
        file: PathBuf,

        /// Keyword to count (repeatable; defaults to the stored keywords)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Occurrences required to trigger (defaults to the stored value)
        #[arg(long)]
        min_count: Option<u32>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the stored settings and their validation report
    Show {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Validate and save settings
    Set {
        /// Polling interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Substring of the tab URL to monitor
        #[arg(long)]
        target_url: Option<String>,

        /// Keyword to watch for (repeatable; replaces the stored list)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Total occurrences required to trigger an alert
        #[arg(long)]
        min_count: Option<u32>,

        /// Turn monitoring on
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Turn monitoring off
        #[arg(long)]
        disable: bool,
    },
}
