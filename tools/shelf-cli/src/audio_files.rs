//! Audio-files command - list background music tracks
//!
//! Prints a JSON array of file names on success. When the music directory
//! cannot be read, prints the error body and exits non-zero.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use retroshelf_core::audio::{MUSIC_DIR_ERROR, list_audio_files};
use retroshelf_core::config;
use retroshelf_shared::ErrorResponse;

/// Arguments for the audio-files command
#[derive(Args)]
pub struct AudioFilesArgs {
    /// Path to project directory (defaults to current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,
}

/// Execute the audio-files command
pub fn execute(args: AudioFilesArgs) -> Result<()> {
    let root = crate::project_root(args.project)?;
    let config = config::load(&root)?;
    let music_dir = config.paths.resolve(&root).music;

    match render_listing(&music_dir) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(body) => {
            println!("{}", serde_json::to_string(&body)?);
            Err(body.into())
        }
    }
}

/// JSON listing of `music_dir`, or the error body to return instead.
fn render_listing(music_dir: &Path) -> Result<String, ErrorResponse> {
    let tracks = list_audio_files(music_dir).map_err(|err| {
        tracing::error!("Failed to read music directory {}: {}", music_dir.display(), err);
        ErrorResponse::new(MUSIC_DIR_ERROR)
    })?;
    serde_json::to_string(&tracks).map_err(|err| ErrorResponse::new(err.to_string()))
}
