//! Filesystem discovery of catalogued files.

use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::error::Result;
use super::model::Schema;

/// A file under the root whose extension is part of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the root, `/`-separated.
    pub relative: String,
    /// File name with the matched extension stripped.
    pub name: String,
    pub extension: String,
}

/// Convert a path to a string using forward slashes on every platform.
pub fn normalize_path_to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a file name into stem and extension if the extension is one of
/// the schema's.
pub fn match_extension<'a>(schema: &Schema, file_name: &'a str) -> Option<(&'a str, &'a str)> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !schema.has_extension(ext) {
        return None;
    }
    Some((stem, ext))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Walk `root` and return every matching file, in file-name order per
/// directory. Hidden entries (including the catalog directory) are skipped.
pub fn scan(root: &Path, schema: &Schema) -> Result<Vec<DiscoveredFile>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "Skipping file with non UTF-8 name");
            continue;
        };
        if !file_name.contains('.') {
            debug!(path = %entry.path().display(), "Skipping file without extension");
            continue;
        }
        let Some((stem, ext)) = match_extension(schema, file_name) else {
            continue;
        };
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(DiscoveredFile {
            relative: normalize_path_to_forward_slashes(relative),
            name: stem.to_string(),
            extension: ext.to_string(),
        });
    }

    Ok(files)
}
