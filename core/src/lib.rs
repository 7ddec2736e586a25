//! Retroshelf Core
//!
//! This crate holds the two pieces of Retroshelf with real invariants:
//!
//! - [`catalog`] - Offline pipeline turning a ROM directory into `games.json`
//!   with best-effort cover art
//! - [`session`] - Supervisor guaranteeing at most one emulation session,
//!   with a full reset before every launch
//!
//! The emulation engine itself is an external program driven through the
//! [`session::EngineHost`] capability contract.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod session;

pub use audio::list_audio_files;
pub use catalog::{BuildReport, CatalogBuilder, CatalogError};
pub use config::{Config, ConfigError, ProjectPaths};
pub use session::{EngineConfig, EngineHost, EngineInstance, Phase, SessionManager};
