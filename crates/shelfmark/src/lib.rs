//! Shelfmark - Core Library
//!
//! A personal catalog of file metadata: a JSON schema describes the fields,
//! every matching file under a root directory gets a record, and the
//! records can be queried, sorted, edited and picked at random.

pub mod catalog;
pub mod config;
pub mod template;

pub use catalog::{
    Catalog, CatalogOptions, FieldKind, FieldValue, GuessOptions, IdChange, ListEdit,
    MetadataPlugin, MovedFile, NewFile, OpenMode, OsDataPlugin, Record, Result, Schema,
    SelectBy, ShelfError, ValueType, WeightingMethod,
};
pub use config::ShelfConfig;
pub use template::{MediaKind, SchemaTemplate};
