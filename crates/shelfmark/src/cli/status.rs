//! Status command - summary of a catalog

use std::path::PathBuf;

use crate::cli::output::print_table;
use crate::cli::{load_config, open_catalog};

#[derive(Debug)]
pub struct StatusArgs {
    pub root: PathBuf,
    pub fields: bool,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let catalog = open_catalog(&args.root, &config)?;
    let schema = catalog.schema();

    println!("Catalog:  {}", schema.name());
    println!("Root:     {}", catalog.root().display());
    println!("Records:  {}", catalog.len());
    println!("Max ID:   {}", catalog.max_id());
    let state = if catalog.is_saved()? { "saved" } else { "unsaved changes" };
    println!("State:    {}", state);
    let missing = catalog.missing_files()?;
    if !missing.is_empty() {
        println!("Missing:  {} (run `shelfmark sync`)", missing.len());
    }

    if args.fields {
        let secondary = schema.secondary_fields();
        let mut rows = Vec::new();
        for field in schema.all_fields() {
            let def = schema.field(field)?;
            rows.push(vec![
                field.to_string(),
                def.kind.as_str().to_string(),
                def.value_type.to_string(),
                def.default.clone(),
                (if secondary.iter().any(|s| s == field) { "yes" } else { "" }).to_string(),
                def.plugin.clone().unwrap_or_default(),
            ]);
        }
        print_table(
            &["Field", "Kind", "Type", "Default", "Secondary", "Plugin"],
            rows,
        );
    }
    Ok(())
}
