// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `nowpub`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nowpub",
    version,
    about = "Fetch external data on a schedule and publish snapshots to a git data branch.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Nowpub.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Nowpub.toml")]
    pub config: String,

    /// Run a single fetch-and-publish cycle now, then exit.
    ///
    /// This is the manual trigger; without it, nowpub keeps running and
    /// triggers a cycle on every configured interval.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NOWPUB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved plan, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
