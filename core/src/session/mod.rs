//! Emulator session supervision
//!
//! - [`engine`] - Capability contract for the external emulation engine
//! - [`process`] - Engine host that isolates each instance in a child process
//! - [`blob`] - Temporary copies of locally picked ROMs
//! - [`presentation`] - Base dimensions and scale presets
//! - [`manager`] - The reset-then-launch state machine

pub mod blob;
pub mod engine;
pub mod manager;
pub mod presentation;
pub mod process;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use blob::{BlobError, BlobStore, BlobUrl, TempBlobStore};
pub use engine::{
    EngineConfig, EngineError, EngineHost, EngineInstance, EngineSignal, SessionToken, SignalKind,
    SignalSink,
};
pub use manager::{SessionError, SessionManager, SessionSettings, resolve_rom_url};
pub use presentation::{Presentation, ScalePreset};
pub use process::ProcessEngineHost;
pub use state::{Controls, Phase, RomSource, SessionState};
