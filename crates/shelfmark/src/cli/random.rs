//! Random command - pick a record to watch, read or listen to next

use shelfmark::WeightingMethod;
use std::path::PathBuf;

use crate::cli::error::HelpfulError;
use crate::cli::query::fields_or_secondary;
use crate::cli::{load_config, open_catalog, save_catalog};

#[derive(Debug)]
pub struct RandomArgs {
    pub root: PathBuf,
    pub fields: Vec<String>,
    pub values: Vec<String>,
    pub uniform: bool,
    pub method: WeightingMethod,
    /// Record the pick as opened and save
    pub mark: bool,
}

pub fn run(args: RandomArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut catalog = open_catalog(&args.root, &config)?;
    let weighted = config.weighted_random && !args.uniform;

    let id = if args.values.is_empty() {
        if catalog.is_empty() {
            return Err(HelpfulError::new("The catalog has no records").into());
        }
        catalog.random_record(&catalog.ids(), weighted, args.method)?
    } else {
        let fields = fields_or_secondary(&catalog, args.fields);
        let candidates = catalog
            .query_ids(&fields, &args.values)
            .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
        if candidates.is_empty() {
            return Err(HelpfulError::new("No record matches the query")
                .with_suggestion("TRY: Check the values with: shelfmark query ROOT VALUES")
                .into());
        }
        catalog.random_record(&candidates, weighted, args.method)?
    };

    let record = catalog.get_by_id(&id)?;
    println!("{}\t{}", id, record.path());

    if args.mark {
        catalog.mark_opened(id.as_str())?;
        save_catalog(&catalog)?;
    }
    Ok(())
}
