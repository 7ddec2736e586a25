//! Background music track listing.

use std::io;
use std::path::Path;

/// Extensions (lower-case) recognized as playable tracks.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "opus", "wav", "ogg"];

/// Message returned to clients when the music directory cannot be read.
pub const MUSIC_DIR_ERROR: &str = "Could not read music directory.";

/// Returns true if `file_name` has a recognized audio extension (any case).
pub fn is_audio_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// List audio file names directly inside `dir`, sorted.
pub fn list_audio_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut tracks = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("Skipping non-UTF-8 file name in {}", dir.display());
            continue;
        };
        if is_audio_file(&name) && !entry.file_type()?.is_dir() {
            tracks.push(name);
        }
    }

    tracks.sort();
    Ok(tracks)
}
