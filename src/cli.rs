use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

pub const DEFAULT_OUTPUT_PATH: &str = "./out.css";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "tugboat", version, about = "A CSS utility class generator")]
pub struct Cli {
    /// Show debug output (repeat for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the default config file
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Generate the stylesheet once
    Build(BuildArgs),
    /// Generate, then regenerate whenever project files change
    Watch(WatchArgs),
    /// List the supported utility classes found in the project
    Scan {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Rule catalog CSV (name,rule) replacing the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct BuildArgs {
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Base stylesheet appended after the reset block
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Rule catalog CSV (name,rule) replacing the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Poll the filesystem instead of using native notifications
    #[arg(long)]
    pub poll: bool,

    /// Poll interval in milliseconds (implies --poll)
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,
}

impl WatchArgs {
    pub fn polling(&self) -> bool {
        self.poll || self.poll_interval.is_some()
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_MS)
    }
}
