use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::StubgenConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = format!("moonbind={log_level},moonbind_cli={log_level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    match cli.command {
        Commands::Stubgen {
            source,
            out,
            config,
        } => {
            let file_config = StubgenConfig::load(config)?;
            let source = source
                .or(file_config.source)
                .unwrap_or_else(|| PathBuf::from("src"));
            let out = out
                .or(file_config.out)
                .unwrap_or_else(|| PathBuf::from("stubs"));
            commands::stubgen::execute(&source, &out)
        }
    }
}
