//! Session manager
//!
//! Owns zero or one engine instance and turns user events into a strict
//! reset-then-launch protocol. The manager is single-threaded: engine
//! signals arrive on an mpsc channel and are applied by
//! [`SessionManager::process_signals`] (or [`SessionManager::handle_signal`]).
//!
//! Reset order is fixed: pause, stop, quit, close audio, detach the instance,
//! release the blob, disable transport controls. Every engine request made
//! during reset or transport handling is best-effort; failures are logged.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use reqwest::Url;
use retroshelf_shared::{CatalogEntry, SystemId, system_specs};
use thiserror::Error;

use super::blob::{BlobError, BlobStore};
use super::engine::{
    EngineConfig, EngineError, EngineHost, EngineInstance, EngineSignal, SessionToken, SignalKind,
};
use super::presentation::{Presentation, ScalePreset};
use super::state::{Controls, Phase, RomSource, SessionState, clamp_volume};

/// Error launching a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Fixed inputs for every launch.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Base URL catalog ROM paths are resolved against
    pub rom_base: String,
    /// Engine runtime asset path
    pub data_path: String,
    /// Initially selected system
    pub system: SystemId,
    /// Initial volume
    pub volume: f32,
}

pub struct SessionManager<H: EngineHost, B: BlobStore> {
    host: H,
    blobs: B,
    settings: SessionSettings,
    state: SessionState,
    instance: Option<Box<dyn EngineInstance>>,
    next_token: u64,
    signal_tx: Sender<EngineSignal>,
    signal_rx: Receiver<EngineSignal>,
}

impl<H: EngineHost, B: BlobStore> SessionManager<H, B> {
    pub fn new(host: H, blobs: B, settings: SessionSettings) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel();
        let state = SessionState::new(settings.system, settings.volume);
        Self {
            host,
            blobs,
            settings,
            state,
            instance: None,
            next_token: 0,
            signal_tx,
            signal_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn system(&self) -> SystemId {
        self.state.system
    }

    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    pub fn controls(&self) -> Controls {
        self.state.controls
    }

    pub fn presentation(&self) -> &Presentation {
        &self.state.presentation
    }

    /// Token of the live instance, if any.
    pub fn current_token(&self) -> Option<SessionToken> {
        self.instance.as_ref().map(|instance| instance.token())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Change the selected system.
    ///
    /// Tears down any session and forgets the picked local file, since it
    /// belonged to the previous system.
    pub fn select_system(&mut self, system: SystemId) {
        self.reset();
        self.state.system = system;
        self.clear_local_file();
        self.state.presentation = Presentation::for_system(system);
        tracing::info!("Selected system {} ({})", system, system_specs(system).name);
    }

    /// Select (or clear) a local ROM file. Start is enabled only with a file.
    pub fn pick_file(&mut self, file: Option<PathBuf>) {
        self.state.controls.start = file.is_some();
        self.state.local_file = file;
    }

    fn clear_local_file(&mut self) {
        self.pick_file(None);
    }

    /// Launch the picked local file.
    ///
    /// Without a picked file this does nothing.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let Some(file) = self.state.local_file.clone() else {
            tracing::debug!("Start requested without a ROM file");
            return Ok(());
        };

        self.reset();

        let blob = self.blobs.create(&file)?;
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.launch(RomSource::Blob(blob), name)
    }

    /// Launch a catalog entry, switching to its system if needed.
    pub fn launch_entry(&mut self, entry: &CatalogEntry) -> Result<(), SessionError> {
        self.reset();

        if entry.system != self.state.system {
            self.state.system = entry.system;
            self.clear_local_file();
            self.state.presentation = Presentation::for_system(entry.system);
        }

        let url = resolve_rom_url(&self.settings.rom_base, &entry.rom_path);
        self.launch(RomSource::Remote(url), entry.title.clone())
    }

    fn launch(&mut self, source: RomSource, name: String) -> Result<(), SessionError> {
        self.next_token += 1;
        let token = SessionToken::new(self.next_token);

        let config = EngineConfig {
            system: self.state.system,
            rom_url: source.url().to_string(),
            name,
            volume: self.state.volume,
            data_path: self.settings.data_path.clone(),
            start_on_load: true,
        };

        tracing::info!("Launching '{}' ({}) as session {}", config.name, config.system, token.value());

        match self.host.start(config, token, self.signal_tx.clone()) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.state.rom_source = Some(source);
                self.state.phase = Phase::Launching;
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to start engine: {}", err);
                if let RomSource::Blob(blob) = source {
                    self.blobs.revoke(blob);
                }
                Err(err.into())
            }
        }
    }

    /// Pause a ready session.
    pub fn pause(&mut self) {
        if self.state.phase != Phase::Ready || !self.state.controls.transport {
            return;
        }
        if self.forward("pause", |instance| instance.pause(true)) {
            self.state.phase = Phase::Paused;
        }
    }

    /// Resume a paused session.
    pub fn resume(&mut self) {
        if self.state.phase != Phase::Paused || !self.state.controls.transport {
            return;
        }
        if self.forward("resume", |instance| instance.pause(false)) {
            self.state.phase = Phase::Ready;
        }
    }

    /// Set the volume, clamped to 0.0-1.0.
    ///
    /// Forwarded live to a running session; otherwise kept for the next launch.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        self.state.volume = volume;
        if self.state.phase.is_running() {
            self.forward("volume", |instance| instance.set_volume(volume));
        }
    }

    pub fn set_scale(&mut self, preset: ScalePreset) {
        self.state.presentation.preset = preset;
    }

    /// Tear down the current session. Safe to call in any phase.
    pub fn reset(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            let token = instance.token();
            best_effort("pause", instance.pause(true));
            best_effort("stop", instance.stop());
            best_effort("quit", instance.quit());
            best_effort("close-audio", instance.close_audio());
            instance.detach();
            tracing::info!("Session {} torn down", token.value());
        }

        if let Some(RomSource::Blob(blob)) = self.state.rom_source.take() {
            self.blobs.revoke(blob);
        }

        self.state.controls.transport = false;
        self.state.phase = Phase::Idle;
        self.state.presentation = Presentation::for_system(self.state.system);
    }

    /// Apply one engine signal. Signals from stale instances are ignored.
    pub fn handle_signal(&mut self, signal: EngineSignal) {
        if self.current_token() != Some(signal.token) {
            tracing::debug!("Ignoring {:?} from stale session {}", signal.kind, signal.token.value());
            return;
        }

        match signal.kind {
            SignalKind::Ready => {
                tracing::info!("Engine ready");
                if self.state.phase == Phase::Launching {
                    self.state.phase = Phase::Ready;
                }
                self.state.controls.transport = true;
            }
            SignalKind::GameStarted => {
                tracing::info!("Game started");
                if self.state.phase == Phase::Launching {
                    self.state.phase = Phase::Ready;
                    self.state.controls.transport = true;
                }
            }
        }
        self.state.presentation = Presentation::for_system(self.state.system);
    }

    /// Apply every signal received so far. Returns how many were handled.
    pub fn process_signals(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.handle_signal(signal);
            handled += 1;
        }
        handled
    }

    /// Block until a signal arrives or `timeout` elapses, then apply it and
    /// anything else queued.
    pub fn wait_for_signal(&mut self, timeout: std::time::Duration) -> usize {
        match self.signal_rx.recv_timeout(timeout) {
            Ok(signal) => {
                self.handle_signal(signal);
                1 + self.process_signals()
            }
            Err(_) => 0,
        }
    }

    /// Forward a request to the live instance. Returns true on success.
    fn forward(
        &mut self,
        what: &str,
        request: impl FnOnce(&mut dyn EngineInstance) -> Result<(), EngineError>,
    ) -> bool {
        let Some(instance) = self.instance.as_deref_mut() else {
            return false;
        };
        match request(instance) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Engine {} request failed: {}", what, err);
                false
            }
        }
    }
}

impl<H: EngineHost, B: BlobStore> Drop for SessionManager<H, B> {
    fn drop(&mut self) {
        self.reset();
    }
}

fn best_effort(what: &str, result: Result<(), EngineError>) {
    match result {
        Ok(()) => {}
        Err(EngineError::Unsupported(_)) => tracing::debug!("Engine has no {} capability", what),
        Err(err) => tracing::warn!("Engine {} request failed: {}", what, err),
    }
}

/// Join a catalog ROM path onto the public base URL.
///
/// The path is a file path, not a URL: every segment is percent-encoded, so
/// `#`, `?` and `%` in file names stay part of the name.
pub fn resolve_rom_url(base: &str, rom_path: &str) -> String {
    let segments: Vec<_> = rom_path.split('/').filter(|segment| !segment.is_empty()).collect();

    if let Ok(mut url) = Url::parse(base) {
        let extended = match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(&segments);
                true
            }
            Err(()) => false,
        };
        if extended {
            return url.to_string();
        }
    }

    format!("{}/{}", base.trim_end_matches('/'), segments.join("/"))
}
