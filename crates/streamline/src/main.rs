// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streamline - streaming message lifecycle pipeline.
//!
//! Command-line entry point for inspecting content, matching interrupted
//! messages with recoverable streams, and replaying recorded sessions.

mod backend;
mod input;
mod inspect;
mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use streamline_config::StreamlineConfig;
use streamline_core::error::StreamlineError;
use streamline_core::types::Role;

/// Streamline - streaming message lifecycle pipeline.
#[derive(Parser, Debug)]
#[command(name = "streamline", version, about, long_about = None)]
struct Cli {
    /// Configuration file, used instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override `log.level` from the configuration.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    User,
    Assistant,
    System,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Assistant => Role::Assistant,
            RoleArg::System => Role::System,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether content needs processing.
    Classify {
        /// Input file; stdin when omitted.
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "assistant")]
        role: RoleArg,
        /// Treat the content as still streaming.
        #[arg(long)]
        streaming: bool,
    },
    /// Split content into visible text and a thinking block.
    Extract {
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "assistant")]
        role: RoleArg,
    },
    /// Match an interrupted message against recoverable streams (JSON input).
    Match { file: Option<PathBuf> },
    /// Replay a recorded session script (JSON input) and print message views.
    Replay { file: Option<PathBuf> },
}

fn load_config(path: Option<&std::path::Path>) -> StreamlineConfig {
    let loaded = match path {
        Some(path) => streamline_config::load_and_validate_path(path),
        None => streamline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            streamline_config::render_errors(&errors);
            std::process::exit(2);
        }
    }
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("streamline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, config: StreamlineConfig) -> Result<(), StreamlineError> {
    match cli.command {
        Commands::Classify {
            file,
            role,
            streaming,
        } => inspect::run_classify(&config, file.as_deref(), role.into(), streaming),
        Commands::Extract { file, role } => inspect::run_extract(file.as_deref(), role.into()),
        Commands::Match { file } => inspect::run_match(&config, file.as_deref()),
        Commands::Replay { file } => replay::run_replay(&config, file.as_deref()).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref());
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    init_tracing(&config.log.level);
    streamline_scheduler::recording::register_metrics();
    streamline_lifecycle::recording::register_metrics();

    if let Err(e) = run(cli, config).await {
        eprintln!("streamline: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_classify_flags() {
        let cli = Cli::try_parse_from(["streamline", "classify", "--role", "user", "--streaming", "in.md"])
            .unwrap();
        match cli.command {
            Commands::Classify {
                file,
                role,
                streaming,
            } => {
                assert_eq!(file, Some(PathBuf::from("in.md")));
                assert_eq!(Role::from(role), Role::User);
                assert!(streaming);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = streamline_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.log.level, "info");
    }
}
