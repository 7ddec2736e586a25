//! Shared types for the Retroshelf catalog builder and launcher.
//!
//! Everything in here is plain data: the fixed table of supported systems,
//! their display specifications, the catalog document format and a few
//! helpers for ids and paths that both sides need to agree on.

pub mod api;
pub mod catalog;
pub mod console;
pub mod fs;
pub mod ids;
pub mod system;

pub use api::ErrorResponse;
pub use catalog::{CatalogEntry, parse_catalog};
pub use console::{SystemSpecs, system_specs};
pub use fs::{MAX_CATALOG_BYTES, read_file_with_limit, to_posix_relative};
pub use ids::slugify;
pub use system::{SYSTEM_EXTENSIONS, SystemId, UnknownSystem, system_from_extension, system_from_path};
