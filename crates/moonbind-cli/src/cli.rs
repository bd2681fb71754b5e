//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moonbind", about = "Typed Lua scripting bridge tooling", version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate editor stub files from annotated Rust sources
    Stubgen {
        /// Source directory to scan for @luamodule annotations
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output directory for generated stub files
        #[arg(long)]
        out: Option<PathBuf>,

        /// Path to a moonbind.toml config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
