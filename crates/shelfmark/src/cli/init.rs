//! Init command - create a catalog under a root directory

use anyhow::Context;
use shelfmark::{Catalog, Schema};
use std::path::PathBuf;
use tracing::info;

use crate::cli::error::HelpfulError;
use crate::cli::{load_config, save_catalog};

#[derive(Debug)]
pub struct InitArgs {
    pub root: PathBuf,
    pub model: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    if !args.root.exists() {
        return Err(HelpfulError::path_not_found(&args.root).into());
    }
    let config = load_config()?;

    let model = match args.model.or(config.default_model.clone()) {
        Some(model) => model,
        None => {
            return Err(HelpfulError::new("No schema given")
                .with_context("A new catalog needs a model.json describing its fields")
                .with_suggestions([
                    "TRY: Pass one: shelfmark init ROOT --model model.json",
                    "TRY: Generate one: shelfmark model model.json --list Tags",
                    "TRY: Set default_model in ~/.shelfmark/config.toml",
                ])
                .into())
        }
    };
    if !model.exists() {
        return Err(HelpfulError::path_not_found(&model).into());
    }

    let schema = Schema::from_path(&model)
        .with_context(|| format!("Invalid schema {}", model.display()))?;
    info!(root = %args.root.display(), model = %model.display(), "Initializing catalog");

    let catalog = Catalog::create(&args.root, schema, config.catalog_options())
        .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
    println!(
        "Created catalog '{}' with {} records",
        catalog.schema().name(),
        catalog.len()
    );
    save_catalog(&catalog)
}
