//! Configuration management (`retroshelf.toml` at the project root)
//!
//! Every field has a default, so a missing file is equivalent to an empty one.
//! A file that exists but cannot be read or parsed is an error: silently
//! falling back would point the builder at the wrong directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use retroshelf_shared::SystemId;
use serde::{Deserialize, Serialize};

/// File name of the project configuration.
pub const CONFIG_FILE_NAME: &str = "retroshelf.toml";

/// Base URL for the engine's own runtime assets.
pub const DEFAULT_ENGINE_DATA_PATH: &str = "https://cdn.emulatorjs.org/latest/data/";

/// Wikipedia API endpoint used for cover lookup.
pub const DEFAULT_COVER_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Directory layout, relative to the project root
    #[serde(default)]
    pub paths: PathsConfig,
    /// Cover art lookup settings
    #[serde(default)]
    pub covers: CoversConfig,
    /// External emulation engine settings
    #[serde(default)]
    pub engine: EngineSection,
    /// Launcher session defaults
    #[serde(default)]
    pub session: SessionSection,
}

/// Directory layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Public directory, relative to the project root (default: "public")
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// ROM directory, relative to the public directory (default: "roms")
    #[serde(default = "default_roms_dir")]
    pub roms_dir: PathBuf,
    /// Cover directory, relative to the public directory (default: "covers")
    #[serde(default = "default_covers_dir")]
    pub covers_dir: PathBuf,
    /// Catalog document, relative to the public directory (default: "games.json")
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
    /// Background music directory, relative to the public directory (default: "music")
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
}

/// Cover art lookup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoversConfig {
    /// Image search API endpoint
    #[serde(default = "default_cover_endpoint")]
    pub endpoint: String,
    /// User-Agent sent with lookups
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Requested thumbnail size in pixels (default: 600)
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Delay after every successful download in milliseconds (default: 400)
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Per-request timeout in seconds (default: 15)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// External engine configuration.
///
/// The capability flags declare what the engine program understands on its
/// control channel. A disabled capability is reported as unsupported without
/// contacting the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    /// Engine player program (looked up in PATH if not absolute)
    #[serde(default = "default_engine_program")]
    pub program: PathBuf,
    /// Base path for the engine's own runtime assets
    #[serde(default = "default_engine_data_path")]
    pub data_path: String,
    #[serde(default = "default_true")]
    pub pause: bool,
    #[serde(default = "default_true")]
    pub volume: bool,
    #[serde(default = "default_true")]
    pub stop: bool,
    #[serde(default = "default_true")]
    pub quit: bool,
    #[serde(default = "default_true")]
    pub close_audio: bool,
}

/// Launcher session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSection {
    /// System selected at startup (default: gba)
    #[serde(default = "default_system")]
    pub default_system: SystemId,
    /// Initial volume level (default: 0.8, range: 0.0-1.0)
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}
fn default_roms_dir() -> PathBuf {
    PathBuf::from("roms")
}
fn default_covers_dir() -> PathBuf {
    PathBuf::from("covers")
}
fn default_catalog_file() -> PathBuf {
    PathBuf::from("games.json")
}
fn default_music_dir() -> PathBuf {
    PathBuf::from("music")
}

fn default_cover_endpoint() -> String {
    DEFAULT_COVER_ENDPOINT.to_string()
}
fn default_user_agent() -> String {
    "retroshelf-builder/1.0".to_string()
}
fn default_thumbnail_size() -> u32 {
    600
}
fn default_pacing_ms() -> u64 {
    400
}
fn default_timeout_secs() -> u64 {
    15
}

fn default_engine_program() -> PathBuf {
    PathBuf::from("retroshelf-player")
}
fn default_engine_data_path() -> String {
    DEFAULT_ENGINE_DATA_PATH.to_string()
}
fn default_true() -> bool {
    true
}

fn default_system() -> SystemId {
    SystemId::Gba
}
fn default_volume() -> f32 {
    0.8
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            roms_dir: default_roms_dir(),
            covers_dir: default_covers_dir(),
            catalog_file: default_catalog_file(),
            music_dir: default_music_dir(),
        }
    }
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cover_endpoint(),
            user_agent: default_user_agent(),
            thumbnail_size: default_thumbnail_size(),
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CoversConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            data_path: default_engine_data_path(),
            pause: true,
            volume: true,
            stop: true,
            quit: true,
            close_audio: true,
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            default_system: default_system(),
            default_volume: default_volume(),
        }
    }
}

/// Absolute directory layout for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub public: PathBuf,
    pub roms: PathBuf,
    pub covers: PathBuf,
    pub catalog: PathBuf,
    pub music: PathBuf,
}

impl PathsConfig {
    /// Resolve the layout against a project root.
    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        let public = root.join(&self.public_dir);
        ProjectPaths {
            root: root.to_path_buf(),
            roms: public.join(&self.roms_dir),
            covers: public.join(&self.covers_dir),
            catalog: public.join(&self.catalog_file),
            music: public.join(&self.music_dir),
            public,
        }
    }
}

/// Error loading the project configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads `retroshelf.toml` from the project root.
///
/// Returns defaults if the file does not exist.
pub fn load(root: &Path) -> Result<Config, ConfigError> {
    let path = root.join(CONFIG_FILE_NAME);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}
