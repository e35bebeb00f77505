//! One catalogued file and its field values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::error::{Result, ShelfError};
use super::types::{FieldKind, ID_FIELD, NAME_FIELD, PATH_FIELD};

/// Value held by a field.
///
/// Serialized as `{"type": "Single"|"List", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Single(_) => FieldKind::Single,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    /// All values as a slice; a single value is a one-element slice.
    pub fn values(&self) -> &[String] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::List(values) => values,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }
}

/// Ordered collection of named fields for one file.
///
/// Equality ignores field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new<I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        let mut record = Self::default();
        for (name, value) in fields {
            record.add_field(name, value)?;
        }
        Ok(record)
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: FieldValue) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(ShelfError::DuplicateField(name));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    pub(crate) fn drop_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Result<&FieldValue> {
        self.fields
            .get(name)
            .ok_or_else(|| ShelfError::UnknownField(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut FieldValue> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| ShelfError::UnknownField(name.to_string()))
    }

    pub fn single(&self, name: &str) -> Result<&str> {
        match self.get(name)? {
            FieldValue::Single(value) => Ok(value),
            FieldValue::List(_) => Err(wrong_kind(name, FieldKind::Single)),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[String]> {
        match self.get(name)? {
            FieldValue::List(values) => Ok(values),
            FieldValue::Single(_) => Err(wrong_kind(name, FieldKind::List)),
        }
    }

    pub fn set_single(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        match self.get_mut(name)? {
            FieldValue::Single(current) => {
                *current = value.into();
                Ok(())
            }
            FieldValue::List(_) => Err(wrong_kind(name, FieldKind::Single)),
        }
    }

    /// Append `value` to a list field. Returns false if it was already present.
    pub fn add_value(&mut self, name: &str, value: impl Into<String>) -> Result<bool> {
        let values = self.list_mut(name)?;
        let value = value.into();
        if values.contains(&value) {
            return Ok(false);
        }
        values.push(value);
        Ok(true)
    }

    /// Remove `value` from a list field. The list may end up empty.
    pub fn remove_value(&mut self, name: &str, value: &str) -> Result<()> {
        let values = self.list_mut(name)?;
        let pos = values
            .iter()
            .position(|v| v == value)
            .ok_or_else(|| ShelfError::ValueNotPresent {
                field: name.to_string(),
                value: value.to_string(),
            })?;
        values.remove(pos);
        Ok(())
    }

    pub fn replace_value(&mut self, name: &str, old: &str, new: impl Into<String>) -> Result<()> {
        self.remove_value(name, old)?;
        self.add_value(name, new)?;
        Ok(())
    }

    pub(crate) fn list_mut(&mut self, name: &str) -> Result<&mut Vec<String>> {
        match self.get_mut(name)? {
            FieldValue::List(values) => Ok(values),
            FieldValue::Single(_) => Err(wrong_kind(name, FieldKind::List)),
        }
    }

    /// Union of the values of `names`. With `split`, values are broken into
    /// whitespace-separated tokens.
    pub fn values_of<S: AsRef<str>>(&self, names: &[S], split: bool) -> Result<BTreeSet<String>> {
        let mut out = BTreeSet::new();
        for name in names {
            for value in self.get(name.as_ref())?.values() {
                if split {
                    out.extend(value.split_whitespace().map(str::to_string));
                } else {
                    out.insert(value.clone());
                }
            }
        }
        Ok(out)
    }

    pub fn id(&self) -> &str {
        self.single(ID_FIELD).unwrap_or_default()
    }

    /// Numeric value of the ID, if it parses.
    pub fn id_number(&self) -> Option<i64> {
        self.id().parse().ok()
    }

    pub fn path(&self) -> &str {
        self.single(PATH_FIELD).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.single(NAME_FIELD).unwrap_or_default()
    }
}

fn wrong_kind(field: &str, expected: FieldKind) -> ShelfError {
    ShelfError::WrongFieldKind {
        field: field.to_string(),
        expected: expected.as_str(),
    }
}
