//! Catalog builder
//!
//! Turns a directory of ROM files into `games.json`:
//!
//! 1. Discovery and classification ([`scanning`])
//! 2. Title and id derivation ([`title`], [`scanning::entry_id`])
//! 3. Duplicate id removal (first one wins)
//! 4. Best-effort cover resolution ([`cover`])
//! 5. Locale-aware sort ([`collate`]) and atomic persistence ([`persist`])
//!
//! Only discovery and the final write can fail the build. Cover problems
//! degrade the affected entry to an empty cover path.

pub mod collate;
pub mod cover;
pub mod persist;
pub mod scanning;
pub mod title;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use retroshelf_shared::{CatalogEntry, to_posix_relative};
use thiserror::Error;

use crate::config::ProjectPaths;
pub use collate::compare_titles;
pub use cover::{CoverError, CoverSource, NoCovers, WikipediaCovers};
pub use scanning::{DiscoveredRom, discover_roms, entry_id};
pub use title::title_from_filename;

/// Fatal catalog build failure.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to list ROM directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create cover directory {path}: {source}")]
    CoverDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Summary of one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Entries written, in catalog order
    pub entries: Vec<CatalogEntry>,
    /// Covers already present on disk
    pub covers_reused: usize,
    /// Covers fetched during this run
    pub covers_downloaded: usize,
    /// Entries left without a cover
    pub covers_missing: usize,
    /// ROMs dropped because their id was already taken
    pub skipped_duplicates: usize,
    /// Catalog path relative to the project root
    pub catalog_path: String,
}

enum CoverOutcome {
    Reused,
    Downloaded,
    Missing,
}

/// Builds the catalog for one project layout.
pub struct CatalogBuilder<S: CoverSource> {
    paths: ProjectPaths,
    covers: S,
    pacing: Duration,
}

impl<S: CoverSource> CatalogBuilder<S> {
    pub fn new(paths: ProjectPaths, covers: S) -> Self {
        Self {
            paths,
            covers,
            pacing: Duration::from_millis(400),
        }
    }

    /// Delay after each successful cover download.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn cover_source(&self) -> &S {
        &self.covers
    }

    /// Run a full build and replace the catalog document.
    ///
    /// On error the previous document is left untouched.
    pub fn build(&self) -> Result<BuildReport, CatalogError> {
        std::fs::create_dir_all(&self.paths.roms).map_err(|source| CatalogError::Discovery {
            path: self.paths.roms.clone(),
            source,
        })?;
        std::fs::create_dir_all(&self.paths.covers).map_err(|source| CatalogError::CoverDir {
            path: self.paths.covers.clone(),
            source,
        })?;

        let (roms, skipped_duplicates) = self.collect_entries()?;
        tracing::info!("Discovered {} ROM(s) in {}", roms.len(), self.paths.roms.display());

        let mut entries = Vec::with_capacity(roms.len());
        let mut covers_reused = 0;
        let mut covers_downloaded = 0;
        let mut covers_missing = 0;

        for rom in roms {
            let (cover_path, outcome) = self.resolve_cover(&rom);
            match outcome {
                CoverOutcome::Reused => covers_reused += 1,
                CoverOutcome::Downloaded => covers_downloaded += 1,
                CoverOutcome::Missing => covers_missing += 1,
            }

            entries.push(CatalogEntry {
                id: rom.id,
                title: rom.title,
                system: rom.system,
                rom_path: rom.rom_path,
                cover_path,
            });
        }

        // Stable: equal titles keep discovery order
        entries.sort_by(|a, b| compare_titles(&a.title, &b.title));

        let json = persist::render_catalog(&entries)?;
        persist::write_atomic(&self.paths.catalog, json.as_bytes()).map_err(|source| {
            CatalogError::Write {
                path: self.paths.catalog.clone(),
                source,
            }
        })?;

        let catalog_path = to_posix_relative(&self.paths.root, &self.paths.catalog)
            .unwrap_or_else(|| self.paths.catalog.display().to_string());
        tracing::info!("Wrote {} entries to {}", entries.len(), catalog_path);

        Ok(BuildReport {
            entries,
            covers_reused,
            covers_downloaded,
            covers_missing,
            skipped_duplicates,
            catalog_path,
        })
    }

    /// Discover ROMs and drop those whose id is already taken.
    ///
    /// Returns the surviving ROMs and the number dropped.
    pub fn collect_entries(&self) -> Result<(Vec<DiscoveredRom>, usize), CatalogError> {
        let discovered = discover_roms(&self.paths.public, &self.paths.roms)?;

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(discovered.len());
        let mut skipped = 0;

        for rom in discovered {
            if seen.insert(rom.id.clone()) {
                kept.push(rom);
            } else {
                tracing::warn!(
                    "Duplicate id '{}' for {}, keeping the first occurrence",
                    rom.id,
                    rom.rom_path
                );
                skipped += 1;
            }
        }

        Ok((kept, skipped))
    }

    /// Resolve the cover for one ROM, never failing.
    ///
    /// Ids are slugs (`[a-z0-9-]`, led by the system name), so `<id>.jpg` is
    /// always a plain file name inside the cover directory.
    fn resolve_cover(&self, rom: &DiscoveredRom) -> (String, CoverOutcome) {
        let file_name = format!("{}.jpg", rom.id);
        let target = self.paths.covers.join(&file_name);
        let Some(relative) = to_posix_relative(&self.paths.public, &target) else {
            tracing::warn!("Cover directory is outside the public directory");
            return (String::new(), CoverOutcome::Missing);
        };

        if target.exists() {
            tracing::debug!("Reusing cover for '{}'", rom.title);
            return (relative, CoverOutcome::Reused);
        }

        match self.fetch_cover(&rom.title, &target) {
            Ok(true) => {
                tracing::info!("Downloaded cover for '{}'", rom.title);
                cover::pace(self.pacing);
                (relative, CoverOutcome::Downloaded)
            }
            Ok(false) => {
                tracing::info!("No cover found for '{}'", rom.title);
                (String::new(), CoverOutcome::Missing)
            }
            Err(err) => {
                tracing::warn!("Cover lookup failed for '{}': {:#}", rom.title, err);
                (String::new(), CoverOutcome::Missing)
            }
        }
    }

    fn fetch_cover(&self, title: &str, target: &Path) -> anyhow::Result<bool> {
        let Some(url) = cover::find_cover_url(&self.covers, title)? else {
            return Ok(false);
        };

        let bytes = self.covers.download(&url)?;
        persist::write_atomic(target, &bytes)
            .map_err(|err| anyhow::anyhow!("Failed to write {}: {}", target.display(), err))?;
        Ok(true)
    }
}
