//! Retroshelf launcher
//!
//! Reads commands from stdin (type `help`) and drives one emulator session
//! at a time.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use retroshelf_core::config;
use retroshelf_core::session::{
    BlobStore, EngineHost, ProcessEngineHost, SessionManager, SessionSettings, TempBlobStore,
};
use retroshelf_library::{App, Flow, Shelf, parse_line};

#[derive(Parser)]
#[command(name = "retroshelf")]
#[command(about = "Play cartridge ROMs from your Retroshelf library")]
#[command(version)]
struct Args {
    /// Path to project directory (defaults to current directory)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Base URL the engine loads catalog ROMs from (defaults to the public directory)
    #[arg(long)]
    rom_base: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let root = match args.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let config = config::load(&root)?;
    let paths = config.paths.resolve(&root);
    let shelf = Shelf::load(&paths.catalog)?;

    let rom_base = match args.rom_base {
        Some(base) => base,
        None => public_base_url(&paths.public)?,
    };

    let settings = SessionSettings {
        rom_base,
        data_path: config.engine.data_path.clone(),
        system: config.session.default_system,
        volume: config.session.default_volume,
    };
    let host = ProcessEngineHost::new(&config.engine);
    tracing::info!("Using engine {}", host.program().display());

    let session = SessionManager::new(host, TempBlobStore::new(), settings);
    let mut app = App::new(session, shelf);

    run_prompt(&mut app)
}

/// `file://` URL of the public directory, with a trailing slash.
fn public_base_url(public: &Path) -> Result<String> {
    let absolute = std::path::absolute(public)
        .with_context(|| format!("Failed to resolve {}", public.display()))?;
    let url = Url::from_directory_path(&absolute)
        .map_err(|()| anyhow::anyhow!("Cannot express {} as a URL", absolute.display()))?;
    Ok(url.to_string())
}

fn run_prompt<H: EngineHost, B: BlobStore>(app: &mut App<H, B>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "retroshelf - {} game(s) in the library. Type 'help'.", app.shelf().len())?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        match parse_line(&line) {
            Ok(Some(command)) => {
                if app.execute(command, &mut stdout)? == Flow::Exit {
                    return Ok(());
                }
            }
            Ok(None) => app.poll(),
            Err(err) => writeln!(stdout, "{}", err)?,
        }
        stdout.flush()?;
    }

    Ok(())
}
