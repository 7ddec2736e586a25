//! Retroshelf launcher
//!
//! Browses the catalog written by `shelf build` and plays ROMs through the
//! session manager. The engine always runs as a separate process, so a crash
//! or hang in the engine never takes the launcher down with it.

pub mod app;
pub mod commands;
pub mod shelf;

pub use app::{App, Flow};
pub use commands::{Command, parse_line};
pub use shelf::Shelf;
