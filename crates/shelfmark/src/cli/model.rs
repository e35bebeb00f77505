//! Model command - generate a schema file

use anyhow::Context;
use shelfmark::catalog::to_pretty_json;
use shelfmark::{MediaKind, SchemaTemplate};
use std::path::PathBuf;

use crate::cli::error::HelpfulError;

#[derive(Debug)]
pub struct ModelArgs {
    pub output: PathBuf,
    pub name: Option<String>,
    pub media: MediaKind,
    pub single: Vec<String>,
    pub list: Vec<String>,
    pub secondary: Vec<String>,
    /// `Field=type` overrides
    pub value_types: Vec<String>,
    pub dry_run: bool,
}

pub fn run(args: ModelArgs) -> anyhow::Result<()> {
    let name = args.name.clone().unwrap_or_else(|| {
        args.output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string())
    });

    let mut template = SchemaTemplate::new(name);
    template.media = args.media;
    template.single_fields = args.single;
    template.list_fields = args.list;
    template.secondary_fields = args.secondary;
    for spec in &args.value_types {
        let (field, value_type) = spec.split_once('=').ok_or_else(|| {
            HelpfulError::new(format!("Invalid value type override: {}", spec))
                .with_suggestion("TRY: Use FIELD=TYPE, e.g. --value-type Rating=int")
        })?;
        template
            .value_types
            .insert(field.to_string(), value_type.to_string());
    }

    // Parsing the result catches anything the template could not express.
    template.to_schema()?;
    let content = to_pretty_json(&template.to_document()?)?;

    if args.dry_run {
        println!("{}", content);
        return Ok(());
    }
    if args.output.exists() {
        return Err(HelpfulError::new(format!(
            "Refusing to overwrite {}",
            args.output.display()
        ))
        .with_suggestion("TRY: Pick another output path or remove the file")
        .into());
    }
    std::fs::write(&args.output, content)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote schema {}", args.output.display());
    Ok(())
}
