//! CLI module for Shelfmark
//!
//! Every command works on the catalog stored under a root directory and
//! saves it again when it changed something.

pub mod error;
pub mod output;

pub mod edit;
pub mod guess;
pub mod init;
pub mod model;
pub mod query;
pub mod random;
pub mod status;
pub mod sync;

use anyhow::Context;
use shelfmark::{Catalog, ShelfConfig};
use std::path::Path;

use error::HelpfulError;

/// Read the tool configuration.
pub fn load_config() -> anyhow::Result<ShelfConfig> {
    ShelfConfig::load_default().context("Failed to read shelfmark config")
}

/// Load the catalog at `root`, turning the usual failures into helpful ones.
pub fn open_catalog(root: &Path, config: &ShelfConfig) -> anyhow::Result<Catalog> {
    if !root.exists() {
        return Err(HelpfulError::path_not_found(root).into());
    }
    Catalog::load(root, config.catalog_options())
        .map_err(|err| HelpfulError::from_shelf(err, root).into())
}

/// Save `catalog` and report where it went.
pub fn save_catalog(catalog: &Catalog) -> anyhow::Result<()> {
    let saved = catalog
        .save()
        .with_context(|| format!("Failed to save catalog in {}", catalog.root().display()))?;
    if saved {
        println!("Saved {}", catalog.snapshot_path().display());
    }
    Ok(())
}
