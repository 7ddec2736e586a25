//! Filesystem helpers shared by the catalog builder and the launcher.

use std::path::{Component, Path};

use anyhow::{Context, Result};

/// Maximum allowed catalog document size for reading into memory.
pub const MAX_CATALOG_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Express `path` relative to `base` using `/` separators.
///
/// Platform separators never appear in the result. Returns `None` if `path`
/// is not inside `base`.
pub fn to_posix_relative(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}
