//! Supported cartridge systems and their ROM file extensions.
//!
//! `SYSTEM_EXTENSIONS` is the single source of truth for classification: a
//! file is a ROM for a system if and only if its extension appears here.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A cartridge platform identifier.
///
/// The lower-case string form (`as_str`) is what appears in the catalog
/// document and what the emulation engine expects as its core name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemId {
    Nes,
    Snes,
    Gba,
    Gb,
    Gbc,
    N64,
    Nds,
}

impl SystemId {
    /// Get the string identifier for this system.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemId::Nes => "nes",
            SystemId::Snes => "snes",
            SystemId::Gba => "gba",
            SystemId::Gb => "gb",
            SystemId::Gbc => "gbc",
            SystemId::N64 => "n64",
            SystemId::Nds => "nds",
        }
    }

    /// Get all supported systems.
    pub fn all() -> &'static [SystemId] {
        &[
            SystemId::Nes,
            SystemId::Snes,
            SystemId::Gba,
            SystemId::Gb,
            SystemId::Gbc,
            SystemId::N64,
            SystemId::Nds,
        ]
    }

    /// ROM file extensions (without dot) recognized for this system.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> + '_ {
        SYSTEM_EXTENSIONS
            .iter()
            .filter(move |(_, system)| system == self)
            .map(|(ext, _)| *ext)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown system identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown system '{0}' (expected one of nes, snes, gba, gb, gbc, n64, nds)")]
pub struct UnknownSystem(pub String);

impl FromStr for SystemId {
    type Err = UnknownSystem;

    /// Case-sensitive, matching the identifiers written to the catalog.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemId::all()
            .iter()
            .copied()
            .find(|system| system.as_str() == s)
            .ok_or_else(|| UnknownSystem(s.to_string()))
    }
}

/// Extension (lower-case, no dot) to system table.
///
/// Several extensions may map to the same system.
pub const SYSTEM_EXTENSIONS: &[(&str, SystemId)] = &[
    ("nes", SystemId::Nes),
    ("sfc", SystemId::Snes),
    ("smc", SystemId::Snes),
    ("gba", SystemId::Gba),
    ("gb", SystemId::Gb),
    ("gbc", SystemId::Gbc),
    ("n64", SystemId::N64),
    ("z64", SystemId::N64),
    ("v64", SystemId::N64),
    ("nds", SystemId::Nds),
];

/// Classify a file extension (with or without leading dot, any case).
pub fn system_from_extension(ext: &str) -> Option<SystemId> {
    let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
    SYSTEM_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, system)| *system)
}

/// Classify a path by its extension.
pub fn system_from_path(path: &Path) -> Option<SystemId> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(system_from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_table() {
        assert_eq!(system_from_extension("nes"), Some(SystemId::Nes));
        assert_eq!(system_from_extension("sfc"), Some(SystemId::Snes));
        assert_eq!(system_from_extension("smc"), Some(SystemId::Snes));
        assert_eq!(system_from_extension("gba"), Some(SystemId::Gba));
        assert_eq!(system_from_extension("gb"), Some(SystemId::Gb));
        assert_eq!(system_from_extension("gbc"), Some(SystemId::Gbc));
        assert_eq!(system_from_extension("z64"), Some(SystemId::N64));
        assert_eq!(system_from_extension("v64"), Some(SystemId::N64));
        assert_eq!(system_from_extension("n64"), Some(SystemId::N64));
        assert_eq!(system_from_extension("nds"), Some(SystemId::Nds));
    }

    #[test]
    fn test_extension_case_insensitive_and_dotted() {
        assert_eq!(system_from_extension("GBA"), Some(SystemId::Gba));
        assert_eq!(system_from_extension(".Sfc"), Some(SystemId::Snes));
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(system_from_extension("zip"), None);
        assert_eq!(system_from_extension(""), None);
        assert_eq!(system_from_path(Path::new("readme")), None);
        assert_eq!(system_from_path(Path::new("roms/notes.txt")), None);
    }

    #[test]
    fn test_system_from_path() {
        assert_eq!(
            system_from_path(Path::new("roms/sub/Metroid (USA).NES")),
            Some(SystemId::Nes)
        );
    }

    #[test]
    fn test_round_trip_identifiers() {
        for system in SystemId::all() {
            assert_eq!(system.as_str().parse::<SystemId>(), Ok(*system));
        }
        assert!("GBA".parse::<SystemId>().is_err());
        assert!("genesis".parse::<SystemId>().is_err());
    }

    #[test]
    fn test_every_system_has_an_extension() {
        for system in SystemId::all() {
            assert!(system.extensions().next().is_some(), "{system} has no extension");
        }
        let n64: Vec<_> = SystemId::N64.extensions().collect();
        assert_eq!(n64, vec!["n64", "z64", "v64"]);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SystemId::Snes).unwrap();
        assert_eq!(json, "\"snes\"");
        let parsed: SystemId = serde_json::from_str("\"n64\"").unwrap();
        assert_eq!(parsed, SystemId::N64);
    }
}
