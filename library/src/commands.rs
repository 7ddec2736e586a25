//! Line commands understood by the launcher prompt.

use std::path::PathBuf;

use retroshelf_core::session::ScalePreset;
use retroshelf_shared::SystemId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select a system (resets any session)
    System(SystemId),
    /// Pick a local ROM file, or clear the pick
    Pick(Option<PathBuf>),
    /// Launch the picked local file
    Start,
    /// Launch a catalog entry by id or list position
    Launch(String),
    Pause,
    Resume,
    Volume(f32),
    Scale(ScalePreset),
    /// List the library, optionally for one system
    List(Option<SystemId>),
    Status,
    /// Wait for engine signals
    Wait,
    Reset,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid volume '{0}' (expected a number from 0 to 1)")]
    Volume(String),
    #[error(transparent)]
    System(#[from] retroshelf_shared::UnknownSystem),
    #[error(transparent)]
    Scale(#[from] retroshelf_core::session::presentation::UnknownPreset),
}

pub const HELP: &str = "\
commands:
  system <nes|snes|gba|gb|gbc|n64|nds>   select a system
  pick [path]                            pick a local ROM (no path clears it)
  start                                  play the picked ROM
  list [system]                          show the library
  launch <id|number>                     play a library game
  pause | resume                         transport controls
  volume <0..1>                          set the volume
  scale <native|2x|3x|fit|stretch>       display scaling
  status                                 show the session state
  wait                                   wait for the engine to report in
  reset                                  stop the running game
  quit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    let command = match verb.to_ascii_lowercase().as_str() {
        "system" => Command::System(arg.ok_or(ParseError::MissingArgument("system"))?.parse()?),
        "pick" => Command::Pick(arg.map(PathBuf::from)),
        "start" => Command::Start,
        "launch" | "play" => Command::Launch(arg.ok_or(ParseError::MissingArgument("launch"))?.to_string()),
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "volume" => {
            let raw = arg.ok_or(ParseError::MissingArgument("volume"))?;
            let volume: f32 = raw.parse().map_err(|_| ParseError::Volume(raw.to_string()))?;
            if !volume.is_finite() {
                return Err(ParseError::Volume(raw.to_string()));
            }
            Command::Volume(volume)
        }
        "scale" => Command::Scale(arg.ok_or(ParseError::MissingArgument("scale"))?.parse()?),
        "list" | "ls" => Command::List(arg.map(str::parse).transpose()?),
        "status" => Command::Status,
        "wait" => Command::Wait,
        "reset" | "stop" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_line("  "), Ok(None));
        assert_eq!(parse_line("start"), Ok(Some(Command::Start)));
        assert_eq!(parse_line("SYSTEM snes"), Ok(Some(Command::System(SystemId::Snes))));
        assert_eq!(parse_line("volume 0.4"), Ok(Some(Command::Volume(0.4))));
        assert_eq!(parse_line("scale 2x"), Ok(Some(Command::Scale(ScalePreset::Pixel2x))));
        assert_eq!(parse_line("list"), Ok(Some(Command::List(None))));
        assert_eq!(parse_line("list nes"), Ok(Some(Command::List(Some(SystemId::Nes)))));
    }

    #[test]
    fn test_pick_keeps_spaces_in_path() {
        assert_eq!(
            parse_line("pick /roms/Metroid Fusion (USA).gba"),
            Ok(Some(Command::Pick(Some(PathBuf::from("/roms/Metroid Fusion (USA).gba")))))
        );
        assert_eq!(parse_line("pick"), Ok(Some(Command::Pick(None))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_line("launch"), Err(ParseError::MissingArgument("launch")));
        assert!(matches!(parse_line("system genesis"), Err(ParseError::System(_))));
        assert!(matches!(parse_line("volume loud"), Err(ParseError::Volume(_))));
        assert!(matches!(parse_line("volume NaN"), Err(ParseError::Volume(_))));
        assert!(matches!(parse_line("dance"), Err(ParseError::Unknown(_))));
    }
}
