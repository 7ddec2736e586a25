//! Atomic file replacement for the catalog document and cover images.

use std::io::{self, Write};
use std::path::Path;

use retroshelf_shared::CatalogEntry;
use tempfile::NamedTempFile;

/// Write `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over the target. Readers see either the old file or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Serialize the catalog as a pretty-printed JSON array.
pub fn render_catalog(entries: &[CatalogEntry]) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    Ok(json)
}
