//! Shelf CLI - Library build tool for Retroshelf
//!
//! # Commands
//!
//! - `shelf build` - Scan `public/roms`, fetch missing covers, write `public/games.json`
//! - `shelf audio-files` - Print the background music tracks as a JSON array
//!
//! # Usage
//!
//! From the project root:
//! ```bash
//! # Rebuild the catalog
//! shelf build
//!
//! # Rebuild without touching the network
//! shelf build --offline
//! ```
//!
//! Directory layout and cover lookup settings come from `retroshelf.toml`
//! (all optional).

mod audio_files;
mod build;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Shelf CLI - Library build tool for Retroshelf
#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Library build tool for Retroshelf")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build games.json from the ROM directory
    Build(build::BuildArgs),

    /// List background music tracks as JSON
    AudioFiles(audio_files::AudioFilesArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build::execute(args),
        Commands::AudioFiles(args) => audio_files::execute(args),
    }
}

/// Resolve the project root (defaults to the current directory).
pub(crate) fn project_root(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}
