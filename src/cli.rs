// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `batchroute`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "batchroute",
    version,
    about = "Submit delivery batches for route optimization and follow them until the route is ready.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Batchroute.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BATCHROUTE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a batch draft file and submit it.
    Submit {
        /// Draft file (TOML) with name, delivery_date, depot_address and
        /// [[deliveries]].
        #[arg(value_name = "DRAFT")]
        draft: PathBuf,

        /// Validate and print the request, but don't send anything.
        #[arg(long)]
        dry_run: bool,

        /// Keep polling the new batch until it is ready or failed.
        #[arg(long)]
        watch: bool,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Poll an existing batch until it is ready or failed.
    Watch {
        #[arg(value_name = "BATCH_ID")]
        batch_id: String,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Fetch a batch once and print its route if it is ready.
    Show {
        #[arg(value_name = "BATCH_ID")]
        batch_id: String,
    },
}

/// Overrides for the `[polling]` config section.
#[derive(Debug, Clone, Default, Args)]
pub struct PollArgs {
    /// Milliseconds between status polls.
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Consecutive failed polls to tolerate before giving up.
    #[arg(long, value_name = "N")]
    pub max_failures: Option<u32>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_with_overrides() {
        let args = CliArgs::try_parse_from([
            "batchroute",
            "watch",
            "b1",
            "--interval-ms",
            "500",
            "--max-failures",
            "4",
        ])
        .unwrap();
        match args.command {
            Command::Watch { batch_id, poll } => {
                assert_eq!(batch_id, "b1");
                assert_eq!(poll.interval_ms, Some(500));
                assert_eq!(poll.max_failures, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(CliArgs::try_parse_from(["batchroute", "watch", "b1", "--interval-ms", "0"]).is_err());
    }
}
