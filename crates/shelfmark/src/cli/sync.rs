//! Sync command - bring a catalog in line with the files on disk

use std::path::PathBuf;
use tracing::info;

use crate::cli::output::print_table;
use crate::cli::{load_config, open_catalog, save_catalog};

#[derive(Debug)]
pub struct SyncArgs {
    pub root: PathBuf,
    pub keep_ids: bool,
    pub reset_ids: bool,
    pub skip_new: bool,
}

pub fn run(args: SyncArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut catalog = open_catalog(&args.root, &config)?;

    let moved = catalog.check_changed_paths()?;
    let removed = catalog.missing_files()?;
    let changed_ids = catalog.check_missing_files(!args.keep_ids)?;
    let added = if args.skip_new {
        Vec::new()
    } else {
        catalog.find_new_files()?
    };
    if args.reset_ids {
        catalog.reset_ids()?;
    }
    info!(
        moved = moved.len(),
        removed = removed.len(),
        renumbered = changed_ids.len(),
        added = added.len(),
        "Sync finished"
    );

    if !moved.is_empty() {
        let rows = moved
            .iter()
            .map(|m| vec![m.id.clone(), m.old_path.clone(), m.new_path.clone()])
            .collect();
        print_table(&["ID", "Old path", "New path"], rows);
    }
    if !changed_ids.is_empty() {
        let rows = changed_ids
            .iter()
            .map(|c| vec![c.from.clone(), c.to.clone()])
            .collect();
        print_table(&["Old ID", "New ID"], rows);
    }
    if !added.is_empty() {
        let rows = added
            .iter()
            .map(|n| vec![n.id.clone(), n.path.clone()])
            .collect();
        print_table(&["ID", "Added"], rows);
    }
    for path in &removed {
        println!("Removed missing file: {}", path);
    }
    println!(
        "{} moved, {} removed, {} renumbered, {} added, {} records",
        moved.len(),
        removed.len(),
        changed_ids.len(),
        added.len(),
        catalog.len()
    );

    save_catalog(&catalog)
}
