//! Set and tag commands - edit one record

use shelfmark::{FieldKind, ListEdit, SelectBy};
use std::path::PathBuf;

use crate::cli::error::HelpfulError;
use crate::cli::{load_config, open_catalog, save_catalog};

#[derive(Debug)]
pub struct SetArgs {
    pub root: PathBuf,
    pub id: String,
    pub field: String,
    pub value: String,
}

#[derive(Debug)]
pub struct TagArgs {
    pub root: PathBuf,
    pub id: String,
    pub field: String,
    pub value: String,
    pub remove: bool,
    pub replace: Option<String>,
}

pub fn run_set(args: SetArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut catalog = open_catalog(&args.root, &config)?;
    if catalog.schema().field_kind(&args.field).ok() == Some(FieldKind::List) {
        return Err(HelpfulError::new(format!("{} is a list field", args.field))
            .with_suggestion(format!(
                "TRY: shelfmark tag {} {} {} VALUE",
                args.root.display(),
                args.id,
                args.field
            ))
            .into());
    }

    catalog
        .modify_single(SelectBy::Id(args.id.clone()), &args.field, args.value.as_str())
        .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
    println!("{} {}: {}", args.id, args.field, args.value);
    save_catalog(&catalog)
}

pub fn run_tag(args: TagArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut catalog = open_catalog(&args.root, &config)?;

    let edit = match (args.remove, args.replace) {
        (true, Some(_)) => {
            return Err(HelpfulError::new("--remove and --replace cannot be combined").into())
        }
        (true, None) => ListEdit::Remove(args.value.clone()),
        (false, Some(old)) => ListEdit::Replace {
            old,
            new: args.value.clone(),
        },
        (false, None) => ListEdit::Append(args.value.clone()),
    };

    let selector = SelectBy::Id(args.id.clone());
    catalog
        .modify_list(selector.clone(), &args.field, edit)
        .map_err(|err| HelpfulError::from_shelf(err, &args.root))?;
    let count = catalog.count(selector, &args.field)?;
    println!("{} {} now holds {} values", args.id, args.field, count);
    save_catalog(&catalog)
}
