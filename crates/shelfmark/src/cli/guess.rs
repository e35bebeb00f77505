//! Guess command - suggest secondary field values for a path

use std::path::PathBuf;

use crate::cli::output::print_table;
use crate::cli::{load_config, open_catalog};

#[derive(Debug)]
pub struct GuessArgs {
    pub root: PathBuf,
    pub path: String,
    pub fast: bool,
    pub json: bool,
}

pub fn run(args: GuessArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut catalog = open_catalog(&args.root, &config)?;
    let guesses = catalog.guess_fields(&args.path, config.guess_options(args.fast))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&guesses)?);
        return Ok(());
    }
    let rows = guesses
        .iter()
        .map(|(field, values)| {
            vec![
                field.clone(),
                values.iter().cloned().collect::<Vec<_>>().join(", "),
            ]
        })
        .collect();
    print_table(&["Field", "Guessed values"], rows);
    Ok(())
}
