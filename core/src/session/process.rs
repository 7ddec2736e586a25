//! Engine host running each instance as a child process.
//!
//! The child gets its whole configuration on the command line and talks to
//! us over stdio: it prints `ready` / `started` lines on stdout and accepts
//! `pause`, `resume`, `volume <v>`, `stop`, `quit` and `close-audio` on stdin.
//! Killing the process drops everything the engine held, so no state leaks
//! from one session into the next.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use super::engine::{
    EngineConfig, EngineError, EngineHost, EngineInstance, EngineSignal, SessionToken, SignalKind,
    SignalSink,
};
use crate::config::EngineSection;

/// How long a closed engine gets to act on teardown requests before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Controls the engine program declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub pause: bool,
    pub volume: bool,
    pub stop: bool,
    pub quit: bool,
    pub close_audio: bool,
}

impl From<&EngineSection> for Capabilities {
    fn from(section: &EngineSection) -> Self {
        Self {
            pause: section.pause,
            volume: section.volume,
            stop: section.stop,
            quit: section.quit,
            close_audio: section.close_audio,
        }
    }
}

/// Find the engine program.
///
/// Paths with a directory component are used as given. A bare name is
/// looked up next to the current executable, then left to `PATH`.
pub fn find_engine_program(program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        return program.to_path_buf();
    }

    let exe_name = if cfg!(windows) && program.extension().is_none() {
        program.with_extension("exe")
    } else {
        program.to_path_buf()
    };

    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let local = dir.join(&exe_name);
        if local.exists() {
            return local;
        }
    }

    exe_name
}

/// Build the engine command line for one session.
pub fn build_engine_command(program: &Path, config: &EngineConfig) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg("--system").arg(config.system.as_str());
    cmd.arg("--rom").arg(&config.rom_url);
    cmd.arg("--name").arg(&config.name);
    cmd.arg("--volume").arg(config.volume.to_string());
    cmd.arg("--data-path").arg(&config.data_path);
    if config.start_on_load {
        cmd.arg("--start-on-load");
    }
    cmd
}

/// Map one stdout line to a signal.
pub fn parse_signal_line(line: &str) -> Option<SignalKind> {
    match line.trim() {
        "ready" => Some(SignalKind::Ready),
        "started" => Some(SignalKind::GameStarted),
        _ => None,
    }
}

pub struct ProcessEngineHost {
    program: PathBuf,
    capabilities: Capabilities,
}

impl ProcessEngineHost {
    pub fn new(section: &EngineSection) -> Self {
        Self {
            program: find_engine_program(&section.program),
            capabilities: Capabilities::from(section),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl EngineHost for ProcessEngineHost {
    fn start(
        &mut self,
        config: EngineConfig,
        token: SessionToken,
        sink: SignalSink,
    ) -> Result<Box<dyn EngineInstance>, EngineError> {
        let mut cmd = build_engine_command(&self.program, &config);
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::inherit());

        tracing::info!("Spawning engine: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let stdin = child.stdin.take();
        if let Some(stdout) = child.stdout.take() {
            spawn_signal_reader(stdout, token, sink);
        }

        Ok(Box::new(ProcessEngine {
            token,
            child: Some(child),
            stdin,
            capabilities: self.capabilities,
        }))
    }
}

/// Forward the child's stdout signals until it closes or the manager goes away.
fn spawn_signal_reader(stdout: ChildStdout, token: SessionToken, sink: SignalSink) {
    std::thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_signal_line(&line) {
                Some(kind) => {
                    if sink.send(EngineSignal { token, kind }).is_err() {
                        break;
                    }
                }
                None => tracing::debug!(target: "engine", "{}", line),
            }
        }
        tracing::debug!("Engine {} stdout closed", token.value());
    });
}

struct ProcessEngine {
    token: SessionToken,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    capabilities: Capabilities,
}

impl ProcessEngine {
    fn send(&mut self, enabled: bool, name: &'static str, line: &str) -> Result<(), EngineError> {
        if !enabled {
            return Err(EngineError::Unsupported(name));
        }
        let stdin = self.stdin.as_mut().ok_or(EngineError::Unsupported(name))?;
        writeln!(stdin, "{}", line)?;
        stdin.flush()?;
        Ok(())
    }
}

impl EngineInstance for ProcessEngine {
    fn token(&self) -> SessionToken {
        self.token
    }

    fn pause(&mut self, paused: bool) -> Result<(), EngineError> {
        let line = if paused { "pause" } else { "resume" };
        self.send(self.capabilities.pause, "pause", line)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.send(self.capabilities.volume, "volume", &format!("volume {}", volume))
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.send(self.capabilities.stop, "stop", "stop")
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        self.send(self.capabilities.quit, "quit", "quit")
    }

    fn close_audio(&mut self) -> Result<(), EngineError> {
        self.send(self.capabilities.close_audio, "close-audio", "close-audio")
    }

    fn detach(self: Box<Self>) {
        tracing::debug!("Detaching engine {}", self.token.value());
        drop(self);
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        // Control channel first, then the process
        self.stdin.take();

        let Some(mut child) = self.child.take() else {
            return;
        };
        let token = self.token;

        if let Some(status) = wait_for_exit(&mut child, SHUTDOWN_GRACE) {
            tracing::debug!("Engine {} exited with {}", token.value(), status);
            return;
        }

        tracing::debug!("Engine {} still running after {:?}, killing", token.value(), SHUTDOWN_GRACE);
        if let Err(err) = child.kill() {
            tracing::debug!("Engine already exited: {}", err);
        }
        std::thread::spawn(move || match child.wait() {
            Ok(status) => tracing::debug!("Engine {} exited with {}", token.value(), status),
            Err(err) => tracing::warn!("Failed to reap engine {}: {}", token.value(), err),
        });
    }
}

/// Poll the child until it exits or `grace` runs out.
fn wait_for_exit(child: &mut Child, grace: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => std::thread::sleep(SHUTDOWN_POLL),
            Ok(None) => return None,
            Err(err) => {
                tracing::debug!("Failed to poll engine: {}", err);
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retroshelf_shared::SystemId;
    use std::ffi::OsStr;

    fn config() -> EngineConfig {
        EngineConfig {
            system: SystemId::Snes,
            rom_url: "http://localhost/roms/Super Metroid.sfc".to_string(),
            name: "Super Metroid".to_string(),
            volume: 0.5,
            data_path: "https://cdn.emulatorjs.org/latest/data/".to_string(),
            start_on_load: true,
        }
    }

    #[test]
    fn test_command_line() {
        let cmd = build_engine_command(Path::new("retroshelf-player"), &config());
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                "--system",
                "snes",
                "--rom",
                "http://localhost/roms/Super Metroid.sfc",
                "--name",
                "Super Metroid",
                "--volume",
                "0.5",
                "--data-path",
                "https://cdn.emulatorjs.org/latest/data/",
                "--start-on-load",
            ]
        );
    }

    #[test]
    fn test_parse_signal_lines() {
        assert_eq!(parse_signal_line("ready"), Some(SignalKind::Ready));
        assert_eq!(parse_signal_line("started\r"), Some(SignalKind::GameStarted));
        assert_eq!(parse_signal_line("loading core snes9x"), None);
    }

    #[test]
    fn test_explicit_program_path_kept() {
        let program = Path::new("/opt/engine/player");
        assert_eq!(find_engine_program(program), program);
    }

    #[test]
    fn test_disabled_capability_is_unsupported() {
        let mut engine = ProcessEngine {
            token: SessionToken::new(1),
            child: None,
            stdin: None,
            capabilities: Capabilities {
                pause: false,
                volume: true,
                stop: true,
                quit: true,
                close_audio: true,
            },
        };
        assert!(matches!(engine.pause(true), Err(EngineError::Unsupported("pause"))));
        // No control channel at all
        assert!(matches!(engine.stop(), Err(EngineError::Unsupported("stop"))));
    }

    #[test]
    fn test_spawn_failure() {
        let section = EngineSection {
            program: PathBuf::from("/nonexistent/retroshelf-player"),
            ..EngineSection::default()
        };
        let mut host = ProcessEngineHost::new(&section);
        let (tx, _rx) = std::sync::mpsc::channel();
        let err = host.start(config(), SessionToken::new(1), tx).err().unwrap();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod child {
        use super::*;
        use crate::session::{Phase, SessionManager, SessionSettings, TempBlobStore};
        use retroshelf_shared::CatalogEntry;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Records its argv, reports ready, then logs every control line
        /// until stdin closes.
        const SCRIPT: &str = r#"#!/bin/sh
dir=$(dirname "$0")
printf '%s\n' "$*" > "$dir/args"
echo "loading core"
echo ready
while IFS= read -r line; do
    printf '%s\n' "$line" >> "$dir/control"
done
"#;

        fn scripted_engine(dir: &Path) -> ProcessEngineHost {
            let script = dir.join("engine.sh");
            fs::write(&script, SCRIPT).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            ProcessEngineHost::new(&EngineSection {
                program: script,
                ..EngineSection::default()
            })
        }

        fn launched(dir: &TempDir) -> SessionManager<ProcessEngineHost, TempBlobStore> {
            let settings = SessionSettings {
                rom_base: "http://h/".to_string(),
                data_path: "d/".to_string(),
                system: SystemId::Nes,
                volume: 0.3,
            };
            let mut manager =
                SessionManager::new(scripted_engine(dir.path()), TempBlobStore::in_dir(dir.path()), settings);
            let entry = CatalogEntry {
                id: "nes-x".to_string(),
                title: "X".to_string(),
                system: SystemId::Nes,
                rom_path: "roms/x.nes".to_string(),
                cover_path: String::new(),
            };
            manager.launch_entry(&entry).unwrap();
            manager
        }

        fn control_lines(dir: &TempDir) -> Vec<String> {
            fs::read_to_string(dir.path().join("control"))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[test]
        fn test_child_reports_ready_and_receives_controls() {
            let dir = TempDir::new().unwrap();
            let mut manager = launched(&dir);
            assert_eq!(manager.phase(), Phase::Launching);

            assert!(manager.wait_for_signal(Duration::from_secs(10)) >= 1);
            assert_eq!(manager.phase(), Phase::Ready);
            assert!(manager.controls().transport);

            let args = fs::read_to_string(dir.path().join("args")).unwrap();
            assert_eq!(
                args.trim_end(),
                "--system nes --rom http://h/roms/x.nes --name X --volume 0.3 --data-path d/ --start-on-load"
            );

            manager.set_volume(0.5);
            manager.pause();
            assert_eq!(manager.phase(), Phase::Paused);

            manager.reset();
            assert_eq!(manager.phase(), Phase::Idle);
            assert_eq!(manager.current_token(), None);
            assert_eq!(control_lines(&dir)[..2], ["volume 0.5", "pause"]);
        }

        #[test]
        fn test_reset_lets_child_see_teardown_requests() {
            let dir = TempDir::new().unwrap();
            let mut manager = launched(&dir);
            assert!(manager.wait_for_signal(Duration::from_secs(10)) >= 1);

            manager.reset();

            assert_eq!(control_lines(&dir), ["pause", "stop", "quit", "close-audio"]);
        }
    }
}
