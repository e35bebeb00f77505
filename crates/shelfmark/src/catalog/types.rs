//! Shared catalog types: selectors, edit methods, reconciliation reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ShelfError;

/// Field name of the record identifier.
pub const ID_FIELD: &str = "ID";
/// Field name of the path relative to the catalog root.
pub const PATH_FIELD: &str = "Path";
/// Field name of the file name without extension.
pub const NAME_FIELD: &str = "Name";
/// Field name of the creation timestamp.
pub const ADDED_FIELD: &str = "Added";
/// Field name of the open history.
pub const OPENED_FIELD: &str = "Opened";
/// Field name of the modification history.
pub const CHANGED_FIELD: &str = "Changed";

/// Which record a by-identifier operation addresses.
///
/// Plain strings and integers convert into `SelectBy::Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectBy {
    Id(String),
    Name(String),
    Path(String),
}

impl SelectBy {
    /// Name of the record field this selector matches against.
    pub fn field(&self) -> &'static str {
        match self {
            SelectBy::Id(_) => ID_FIELD,
            SelectBy::Name(_) => NAME_FIELD,
            SelectBy::Path(_) => PATH_FIELD,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SelectBy::Id(v) | SelectBy::Name(v) | SelectBy::Path(v) => v,
        }
    }
}

impl fmt::Display for SelectBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field(), self.value())
    }
}

impl From<&str> for SelectBy {
    fn from(id: &str) -> Self {
        SelectBy::Id(id.to_string())
    }
}

impl From<String> for SelectBy {
    fn from(id: String) -> Self {
        SelectBy::Id(id)
    }
}

impl From<&String> for SelectBy {
    fn from(id: &String) -> Self {
        SelectBy::Id(id.clone())
    }
}

impl From<u64> for SelectBy {
    fn from(id: u64) -> Self {
        SelectBy::Id(id.to_string())
    }
}

impl From<usize> for SelectBy {
    fn from(id: usize) -> Self {
        SelectBy::Id(id.to_string())
    }
}

impl From<u32> for SelectBy {
    fn from(id: u32) -> Self {
        SelectBy::Id(id.to_string())
    }
}

/// Edit applied to a list field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
    Append(String),
    Replace { old: String, new: String },
    Remove(String),
}

/// Weighting used by weighted random selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightingMethod {
    /// Prefer records that were opened rarely.
    #[default]
    TimesOpened,
}

impl FromStr for WeightingMethod {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "times_opened" | "TimesOpened" | "Opened" => Ok(WeightingMethod::TimesOpened),
            other => Err(ShelfError::NotImplemented(format!(
                "weighting method '{}'",
                other
            ))),
        }
    }
}

/// Whether a field holds one value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Single,
    List,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Single => "single",
            FieldKind::List => "list",
        }
    }
}

/// Declared value type of a field, used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Datetime,
    /// Any other token; ordered as text.
    Other(String),
}

impl ValueType {
    pub fn parse(token: &str) -> Self {
        match token {
            "str" => ValueType::Str,
            "int" => ValueType::Int,
            "float" => ValueType::Float,
            "datetime" => ValueType::Datetime,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Datetime => "datetime",
            ValueType::Other(token) => token,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file added by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFile {
    pub path: String,
    pub id: String,
}

/// A record whose path was updated after its file moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedFile {
    pub id: String,
    pub old_path: String,
    pub new_path: String,
}

/// An ID reassignment made while removing a missing record.
///
/// `from` is the ID that was given up and `to` is the freed slot it moved
/// into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdChange {
    pub from: String,
    pub to: String,
}

/// How `Catalog::open_or_create` obtained the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Loaded,
    Created,
}

/// Knobs of the path guesser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOptions {
    /// Skip the token phase and match whole path segments only.
    pub fast: bool,
    /// Also match values whose spaces are written as separators.
    pub whitespace_match: bool,
}

impl Default for GuessOptions {
    fn default() -> Self {
        Self {
            fast: false,
            whitespace_match: true,
        }
    }
}
