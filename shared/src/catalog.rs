//! Catalog document types.
//!
//! The catalog is stored as `games.json` in the public directory: a JSON array
//! of [`CatalogEntry`] objects sorted by title.

use serde::{Deserialize, Serialize};

use crate::system::SystemId;

/// One cartridge image known to the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Slug of `"<system>-<title>"`, unique within the catalog.
    pub id: String,
    /// Display title derived from the ROM filename.
    pub title: String,
    /// System the ROM belongs to (decided by file extension).
    pub system: SystemId,
    /// ROM path relative to the public directory, always `/`-separated.
    #[serde(rename = "rom")]
    pub rom_path: String,
    /// Cover path relative to the public directory, or empty if none.
    #[serde(rename = "cover", default)]
    pub cover_path: String,
}

impl CatalogEntry {
    /// Returns true if a cover image was resolved for this entry.
    pub fn has_cover(&self) -> bool {
        !self.cover_path.is_empty()
    }
}

/// Parse a catalog document.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, serde_json::Error> {
    serde_json::from_str(json)
}
