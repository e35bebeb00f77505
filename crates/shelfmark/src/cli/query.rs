//! Query and sorted commands

use shelfmark::{Catalog, Record};
use std::path::PathBuf;

use crate::cli::error::HelpfulError;
use crate::cli::output::print_records;
use crate::cli::{load_config, open_catalog};

#[derive(Debug)]
pub struct QueryArgs {
    pub root: PathBuf,
    /// Fields to search; the secondary fields when empty
    pub fields: Vec<String>,
    pub values: Vec<String>,
    pub json: bool,
}

#[derive(Debug)]
pub struct SortedArgs {
    pub root: PathBuf,
    pub field: String,
    pub ascending: bool,
    pub limit: Option<usize>,
    pub json: bool,
}

/// `fields`, or the catalog's secondary fields when none were given.
pub fn fields_or_secondary(catalog: &Catalog, fields: Vec<String>) -> Vec<String> {
    if fields.is_empty() {
        catalog.schema().secondary_fields().to_vec()
    } else {
        fields
    }
}

fn emit(catalog: &Catalog, records: Vec<&Record>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_records(catalog.schema(), records.iter().copied());
        println!("{} records", records.len());
    }
    Ok(())
}

pub fn run(args: QueryArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let catalog = open_catalog(&args.root, &config)?;
    let fields = fields_or_secondary(&catalog, args.fields);
    if fields.is_empty() {
        return Err(HelpfulError::new("Nothing to search")
            .with_context("The schema has no secondary fields")
            .with_suggestion("TRY: Name the fields: shelfmark query ROOT --field Tags VALUE")
            .into());
    }

    let records = catalog
        .query(&fields, &args.values)
        .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
    emit(&catalog, records, args.json)
}

pub fn run_sorted(args: SortedArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let catalog = open_catalog(&args.root, &config)?;

    let ids = catalog
        .sorted_ids(&args.field, !args.ascending)
        .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
    let limit = args.limit.unwrap_or(ids.len());
    let mut records = Vec::with_capacity(limit.min(ids.len()));
    for id in ids.iter().take(limit) {
        records.push(catalog.get_by_id(id)?);
    }
    emit(&catalog, records, args.json)
}
