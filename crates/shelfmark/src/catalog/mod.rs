//! Catalog core: schema, records, discovery, persistence and queries.
//!
//! A catalog lives in a `.shelfmark` directory under its root:
//! - `model.json` - the schema the catalog was created with
//! - `mainDB.json` - records keyed by their relative path
//! - `mainDB.<YY-MM-DD>.backup` - copy of the previous snapshot, one per day

pub mod cache;
pub mod db;
pub mod entry;
pub mod error;
pub mod guess;
pub mod history;
pub mod model;
pub mod plugin;
pub mod query;
pub mod random;
pub mod reconcile;
pub mod scanner;
pub mod timefmt;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use db::{Catalog, CatalogOptions, CATALOG_DIR, MODEL_FILE, SNAPSHOT_FILE};
pub use entry::{FieldValue, Record};
pub use error::{Result, ShelfError};
pub use history::{RecentIds, DEFAULT_HISTORY_LEN};
pub use model::{FieldDef, Schema};
pub use plugin::{MetadataPlugin, OsDataPlugin, PluginDescriptor};
pub use scanner::{normalize_path_to_forward_slashes, DiscoveredFile};
pub use timefmt::TimeFormat;
pub use types::{
    FieldKind, GuessOptions, IdChange, ListEdit, MovedFile, NewFile, OpenMode, SelectBy,
    ValueType, WeightingMethod,
};

use serde::Serialize;

/// Serialize as JSON with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
