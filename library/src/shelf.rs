//! The browsable game library backed by `games.json`.

use std::path::Path;

use anyhow::{Context, Result};
use retroshelf_shared::{CatalogEntry, MAX_CATALOG_BYTES, SystemId, parse_catalog, read_file_with_limit};

/// Hint shown when no catalog has been built yet.
pub const EMPTY_LIBRARY_HINT: &str = "No games.json yet. Run `shelf build` to scan public/roms.";

/// Loaded catalog entries, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shelf {
    entries: Vec<CatalogEntry>,
}

impl Shelf {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load the catalog document.
    ///
    /// A missing document is an empty library, not an error. An unreadable
    /// or malformed one is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("{}", EMPTY_LIBRARY_HINT);
            return Ok(Self::default());
        }

        let bytes = read_file_with_limit(path, MAX_CATALOG_BYTES)?;
        let json = String::from_utf8(bytes)
            .with_context(|| format!("Catalog is not valid UTF-8: {}", path.display()))?;
        let entries =
            parse_catalog(&json).with_context(|| format!("Failed to parse catalog: {}", path.display()))?;

        tracing::info!("Loaded {} game(s) from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries for one system, or all when `system` is `None`, paired with
    /// their 1-based position in the full list (the number `find` accepts).
    pub fn filter(&self, system: Option<SystemId>) -> impl Iterator<Item = (usize, &CatalogEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index + 1, entry))
            .filter(move |(_, entry)| system.is_none_or(|system| entry.system == system))
    }

    /// Find an entry by id, or by its 1-based position in the list.
    pub fn find(&self, key: &str) -> Option<&CatalogEntry> {
        if let Some(entry) = self.entries.iter().find(|entry| entry.id == key) {
            return Some(entry);
        }
        key.parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.entries.get(index))
    }
}
