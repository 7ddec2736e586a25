//! Launcher application: routes prompt commands to the session manager.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use retroshelf_core::session::{BlobStore, EngineHost, Phase, SessionManager};
use retroshelf_shared::SystemId;

use crate::commands::{Command, HELP};
use crate::shelf::{EMPTY_LIBRARY_HINT, Shelf};

/// How long `wait` blocks for engine signals.
const SIGNAL_WAIT: Duration = Duration::from_secs(5);

/// Whether the prompt loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct App<H: EngineHost, B: BlobStore> {
    session: SessionManager<H, B>,
    shelf: Shelf,
}

impl<H: EngineHost, B: BlobStore> App<H, B> {
    pub fn new(session: SessionManager<H, B>, shelf: Shelf) -> Self {
        Self { session, shelf }
    }

    pub fn session(&self) -> &SessionManager<H, B> {
        &self.session
    }

    pub fn shelf(&self) -> &Shelf {
        &self.shelf
    }

    /// Apply any engine signals received since the last command.
    pub fn poll(&mut self) {
        self.session.process_signals();
    }

    /// Run one command, writing user-facing output to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        self.poll();

        match command {
            Command::System(system) => {
                self.session.select_system(system);
                writeln!(out, "system: {}", system)?;
            }
            Command::Pick(file) => {
                if let Some(path) = &file
                    && !path.is_file()
                {
                    writeln!(out, "not a file: {}", path.display())?;
                    return Ok(Flow::Continue);
                }
                self.session.pick_file(file);
            }
            Command::Start => {
                if !self.session.controls().start {
                    writeln!(out, "pick a ROM file first")?;
                    return Ok(Flow::Continue);
                }
                if let Err(err) = self.session.start() {
                    writeln!(out, "could not start: {}", err)?;
                }
            }
            Command::Launch(key) => match self.shelf.find(&key).cloned() {
                Some(entry) => {
                    if let Err(err) = self.session.launch_entry(&entry) {
                        writeln!(out, "could not launch {}: {}", entry.title, err)?;
                    }
                }
                None => writeln!(out, "no game '{}' in the library", key)?,
            },
            Command::Pause => self.session.pause(),
            Command::Resume => self.session.resume(),
            Command::Volume(volume) => self.session.set_volume(volume),
            Command::Scale(preset) => self.session.set_scale(preset),
            Command::List(system) => self.write_list(system, out)?,
            Command::Status => {}
            Command::Wait => {
                if self.session.phase() != Phase::Idle {
                    self.session.wait_for_signal(SIGNAL_WAIT);
                }
            }
            Command::Reset => self.session.reset(),
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => {
                self.session.reset();
                return Ok(Flow::Exit);
            }
        }

        self.write_status(out)?;
        Ok(Flow::Continue)
    }

    fn write_list(&self, system: Option<SystemId>, out: &mut impl Write) -> Result<()> {
        if self.shelf.is_empty() {
            writeln!(out, "{}", EMPTY_LIBRARY_HINT)?;
            return Ok(());
        }

        for (number, entry) in self.shelf.filter(system) {
            let cover = if entry.has_cover() { "" } else { "  (no cover)" };
            writeln!(
                out,
                "{:>3}. {:<5} {}  [{}]{}",
                number,
                entry.system,
                entry.title,
                entry.id,
                cover
            )?;
        }
        Ok(())
    }

    fn write_status(&self, out: &mut impl Write) -> Result<()> {
        let state = self.session.state();
        let presentation = self.session.presentation();
        let file = state
            .local_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "[{:?}] system={} file={} volume={:.2} display={}x{} {} controls: start={} transport={}",
            state.phase,
            state.system,
            file,
            state.volume,
            presentation.width,
            presentation.height,
            presentation.preset,
            on_off(state.controls.start),
            on_off(state.controls.transport),
        )?;
        Ok(())
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
