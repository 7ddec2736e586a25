//! Build command - regenerate the game catalog
//!
//! Always a full rebuild. Covers already on disk are reused without any
//! network access, so rerunning is cheap.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use retroshelf_core::BuildReport;
use retroshelf_core::catalog::{CatalogBuilder, CoverSource, NoCovers, WikipediaCovers};
use retroshelf_core::config::{self, Config};

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Path to project directory (defaults to current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Skip cover lookup; entries without a cover on disk get none
    #[arg(long)]
    pub offline: bool,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let root = crate::project_root(args.project)?;
    let config = config::load(&root)?;

    let report = if args.offline {
        run(&config, &root, NoCovers)?
    } else {
        let covers = WikipediaCovers::new(&config.covers).context("Failed to set up cover lookup")?;
        run(&config, &root, covers)?
    };

    println!(
        "Covers: {} reused, {} downloaded, {} missing",
        report.covers_reused, report.covers_downloaded, report.covers_missing
    );
    if report.skipped_duplicates > 0 {
        println!("Skipped {} duplicate ROM(s)", report.skipped_duplicates);
    }
    Ok(())
}

fn run<S: CoverSource>(config: &Config, root: &Path, covers: S) -> Result<BuildReport> {
    let paths = config.paths.resolve(root);
    let builder = CatalogBuilder::new(paths, covers).with_pacing(config.covers.pacing());
    builder.build().context("Catalog build failed")
}
