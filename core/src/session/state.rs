//! Session state owned by the session manager.

use std::path::PathBuf;

use retroshelf_shared::SystemId;

use super::blob::BlobUrl;
use super::presentation::Presentation;

/// Lifecycle phase of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No engine instance
    Idle,
    /// Instance started, waiting for its `Ready` signal
    Launching,
    Ready,
    Paused,
}

impl Phase {
    /// Ready or Paused.
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Paused)
    }
}

/// Where the running ROM came from.
#[derive(Debug, PartialEq, Eq)]
pub enum RomSource {
    /// Locally picked file copied into a blob owned by the session
    Blob(BlobUrl),
    /// Catalog path resolved against the public base
    Remote(String),
}

impl RomSource {
    pub fn url(&self) -> &str {
        match self {
            RomSource::Blob(blob) => blob.as_str(),
            RomSource::Remote(url) => url,
        }
    }
}

/// Which user controls are currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// A local file is selected and can be started
    pub start: bool,
    /// Pause and resume
    pub transport: bool,
}

#[derive(Debug)]
pub struct SessionState {
    /// Selected system, independent of whether a session runs
    pub system: SystemId,
    /// Locally picked ROM file, if any
    pub local_file: Option<PathBuf>,
    pub rom_source: Option<RomSource>,
    pub phase: Phase,
    /// 0.0-1.0, kept across resets
    pub volume: f32,
    pub controls: Controls,
    pub presentation: Presentation,
}

impl SessionState {
    pub fn new(system: SystemId, volume: f32) -> Self {
        Self {
            system,
            local_file: None,
            rom_source: None,
            phase: Phase::Idle,
            volume: clamp_volume(volume),
            controls: Controls::default(),
            presentation: Presentation::for_system(system),
        }
    }
}

/// Clamp a volume into 0.0-1.0. NaN becomes 0.0.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) }
}
