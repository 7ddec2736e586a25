//! ROM discovery and classification

use std::io;
use std::path::{Path, PathBuf};

use retroshelf_shared::{SystemId, slugify, system_from_path, to_posix_relative};
use walkdir::WalkDir;

use super::CatalogError;
use super::title::title_from_filename;

/// A ROM file found under the ROM root, classified and named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredRom {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the public directory, `/`-separated
    pub rom_path: String,
    pub system: SystemId,
    pub title: String,
    pub id: String,
}

/// Derive the catalog id for a (system, title) pair.
pub fn entry_id(system: SystemId, title: &str) -> String {
    slugify(&format!("{}-{}", system.as_str(), title))
}

/// Recursively enumerate ROM files under `roms_dir`.
///
/// Files with unknown extensions are skipped silently. Entries inside the
/// tree that cannot be read are logged and skipped; only a failure to list
/// the root itself is an error. Symlinks are followed, so a linked ROM file
/// or directory is catalogued under its link path. Results come back in
/// file-name order so that duplicate resolution is deterministic.
pub fn discover_roms(public_dir: &Path, roms_dir: &Path) -> Result<Vec<DiscoveredRom>, CatalogError> {
    let mut roms = Vec::new();

    for entry in WalkDir::new(roms_dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let message = err.to_string();
                let source = err.into_io_error().unwrap_or_else(|| io::Error::other(message));
                return Err(CatalogError::Discovery {
                    path: roms_dir.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", roms_dir.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(system) = system_from_path(path) else {
            continue;
        };

        let Some(rom_path) = to_posix_relative(public_dir, path) else {
            tracing::warn!("ROM outside public directory, skipping: {}", path.display());
            continue;
        };

        let file_name = entry.file_name().to_string_lossy();
        let title = title_from_filename(&file_name);
        let id = entry_id(system, &title);

        tracing::debug!("Found {} ROM '{}' ({})", system, title, rom_path);

        roms.push(DiscoveredRom {
            path: path.to_path_buf(),
            rom_path,
            system,
            title,
            id,
        });
    }

    Ok(roms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"rom").unwrap();
    }

    #[test]
    fn test_entry_id() {
        assert_eq!(entry_id(SystemId::Gba, "Metroid Fusion"), "gba-metroid-fusion");
        assert_eq!(entry_id(SystemId::Gb, "Kirby's Dream Land"), "gb-kirbys-dream-land");
        assert_eq!(entry_id(SystemId::Nes, ""), "nes");
    }

    #[test]
    fn test_entry_id_is_a_plain_file_stem() {
        for title in ["../../etc/passwd", "C:\\evil", "bad|name.", " .. ", "Ünïcödé"] {
            let id = entry_id(SystemId::Snes, title);
            assert!(id.starts_with("snes"), "{id:?}");
            assert!(
                id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{id:?}"
            );
        }
        assert_eq!(entry_id(SystemId::Snes, "../../etc/passwd"), "snes-etc-passwd");
    }

    #[test]
    fn test_discovers_known_extensions_recursively() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let roms = public.join("roms");
        touch(&roms.join("Tetris (World).GB"));
        touch(&roms.join("snes").join("super_metroid.sfc"));
        touch(&roms.join("notes.txt"));
        touch(&roms.join("README"));

        let found = discover_roms(&public, &roms).unwrap();
        let paths: Vec<_> = found.iter().map(|rom| rom.rom_path.as_str()).collect();
        assert_eq!(paths, vec!["roms/Tetris (World).GB", "roms/snes/super_metroid.sfc"]);

        assert_eq!(found[0].system, SystemId::Gb);
        assert_eq!(found[0].title, "Tetris");
        assert_eq!(found[0].id, "gb-tetris");
        assert_eq!(found[1].system, SystemId::Snes);
        assert_eq!(found[1].title, "Super Metroid");
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        let roms = dir.path().join("roms");
        fs::create_dir_all(&roms).unwrap();
        assert!(discover_roms(dir.path(), &roms).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let dir = TempDir::new().unwrap();
        let roms = dir.path().join("roms");
        let err = discover_roms(dir.path(), &roms).unwrap_err();
        assert!(matches!(err, CatalogError::Discovery { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_roms_are_found() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let roms = public.join("roms");
        let store = dir.path().join("store");
        touch(&roms.join("Tetris.gb"));
        touch(&store.join("Metroid.gba"));
        touch(&store.join("gbc").join("Zelda DX.gbc"));
        std::os::unix::fs::symlink(store.join("Metroid.gba"), roms.join("Metroid.gba")).unwrap();
        std::os::unix::fs::symlink(store.join("gbc"), roms.join("gbc")).unwrap();

        let found = discover_roms(&public, &roms).unwrap();
        let paths: Vec<_> = found.iter().map(|rom| rom.rom_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["roms/Metroid.gba", "roms/Tetris.gb", "roms/gbc/Zelda DX.gbc"]
        );
        assert_eq!(found[0].system, SystemId::Gba);
        assert_eq!(found[0].title, "Metroid");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        let roms = dir.path().join("roms");
        touch(&roms.join("Tetris.gb"));
        std::os::unix::fs::symlink(dir.path().join("gone.nes"), roms.join("gone.nes")).unwrap();

        let found = discover_roms(dir.path(), &roms).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rom_path, "roms/Tetris.gb");
    }
}
