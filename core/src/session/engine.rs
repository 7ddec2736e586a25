//! Engine capability contract
//!
//! The emulation engine is an opaque collaborator. The session manager talks
//! to it only through [`EngineHost::start`] and the returned
//! [`EngineInstance`]. Everything the engine needs for one session travels
//! in a single [`EngineConfig`] value; nothing survives between sessions.

use std::sync::mpsc::Sender;

use retroshelf_shared::SystemId;
use thiserror::Error;

/// Everything an engine needs to run one session.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// System the ROM belongs to (engine core name)
    pub system: SystemId,
    /// URL of the ROM image (a blob or a catalog path)
    pub rom_url: String,
    /// Display name of the game
    pub name: String,
    /// Initial volume (0.0-1.0)
    pub volume: f32,
    /// Base path for the engine's own runtime assets
    pub data_path: String,
    /// Begin emulation as soon as the ROM is loaded
    pub start_on_load: bool,
}

/// Identifies one engine instance. Signals carry the token of the instance
/// that produced them, so signals from a torn-down instance can be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Lifecycle notification from an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// The engine finished loading and can accept controls
    Ready,
    /// Emulation of the ROM has begun
    GameStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSignal {
    pub token: SessionToken,
    pub kind: SignalKind,
}

/// Channel on which instances report their signals.
pub type SignalSink = Sender<EngineSignal>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine does not support '{0}'")]
    Unsupported(&'static str),

    #[error("Failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine control channel failed: {0}")]
    Channel(#[from] std::io::Error),

    #[error("Engine refused request: {0}")]
    Rejected(String),
}

/// Launches engine instances.
pub trait EngineHost {
    /// Start a new, fully isolated instance for `config`.
    ///
    /// Signals produced by the instance must be tagged with `token` and sent
    /// on `sink`.
    fn start(
        &mut self,
        config: EngineConfig,
        token: SessionToken,
        sink: SignalSink,
    ) -> Result<Box<dyn EngineInstance>, EngineError>;
}

/// A running engine instance.
///
/// All controls are optional capabilities; the defaults report
/// [`EngineError::Unsupported`]. Only `detach` is mandatory.
pub trait EngineInstance {
    fn token(&self) -> SessionToken;

    /// Pause (`true`) or resume (`false`) emulation.
    fn pause(&mut self, _paused: bool) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("pause"))
    }

    fn set_volume(&mut self, _volume: f32) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("volume"))
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("stop"))
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("quit"))
    }

    fn close_audio(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("close-audio"))
    }

    /// Tear down the isolated context. The instance is gone afterwards.
    fn detach(self: Box<Self>);
}
