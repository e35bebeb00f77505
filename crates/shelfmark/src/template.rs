//! Generating schema documents for new catalogs.

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::types::{
    ADDED_FIELD, CHANGED_FIELD, ID_FIELD, NAME_FIELD, OPENED_FIELD, PATH_FIELD,
};
use crate::catalog::{Result, Schema, ShelfError};

const SEPARATORS: [&str; 4] = [".", "-", "_", "+"];

/// Kind of media a catalog indexes; selects the file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
    Text,
}

impl MediaKind {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => &[
                "mp4", "wmv", "avi", "mov", "mpg", "mp7", "flv", "mkv", "f4v", "mpeg",
            ],
            MediaKind::Audio => &["mp3", "wav"],
            MediaKind::Text => &["txt"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Text => "text",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "text" => Ok(MediaKind::Text),
            other => Err(ShelfError::InvalidArgument(format!(
                "unknown media kind '{}' (expected video, audio or text)",
                other
            ))),
        }
    }
}

/// Description of a schema to generate.
///
/// The mandatory fields are always added in front of the user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTemplate {
    pub name: String,
    pub media: MediaKind,
    pub single_fields: Vec<String>,
    pub list_fields: Vec<String>,
    pub secondary_fields: Vec<String>,
    /// Value type overrides by field name (default `str`).
    pub value_types: HashMap<String, String>,
}

impl SchemaTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media: MediaKind::default(),
            single_fields: Vec::new(),
            list_fields: Vec::new(),
            secondary_fields: Vec::new(),
            value_types: HashMap::new(),
        }
    }

    /// Build the schema document.
    pub fn to_document(&self) -> Result<Value> {
        let singles: Vec<&str> = [ID_FIELD, PATH_FIELD, ADDED_FIELD, NAME_FIELD]
            .into_iter()
            .chain(self.single_fields.iter().map(String::as_str))
            .collect();
        let lists: Vec<&str> = [OPENED_FIELD, CHANGED_FIELD]
            .into_iter()
            .chain(self.list_fields.iter().map(String::as_str))
            .collect();

        for field in &self.secondary_fields {
            if !singles.contains(&field.as_str()) && !lists.contains(&field.as_str()) {
                return Err(ShelfError::Config(format!(
                    "secondary field '{}' is not a field of the schema",
                    field
                )));
            }
        }

        let mut doc = Map::new();
        doc.insert(
            "General".to_string(),
            json!({
                "Name": self.name,
                "Description": format!("Description of {}", self.name),
                "Types": self.media.extensions(),
                "Separators": SEPARATORS,
                "SecondaryDBs": self.secondary_fields,
            }),
        );

        for field in &singles {
            let item_type = match *field {
                ID_FIELD => "int",
                ADDED_FIELD => "datetime",
                _ => "str",
            };
            doc.insert(
                field.to_string(),
                json!({
                    "Type": "Item",
                    "default": format!("empty{}", field),
                    "hide": "",
                    "plugin": "",
                    "itemType": self.value_type(field, item_type),
                }),
            );
        }
        for field in &lists {
            let item_type = match *field {
                OPENED_FIELD | CHANGED_FIELD => "datetime",
                _ => "str",
            };
            doc.insert(
                field.to_string(),
                json!({
                    "Type": "ListItem",
                    "default": [format!("empty{}", field)],
                    "hide": "",
                    "plugin": "",
                    "itemType": self.value_type(field, item_type),
                }),
            );
        }

        Ok(Value::Object(doc))
    }

    /// Build and parse the schema.
    pub fn to_schema(&self) -> Result<Schema> {
        Schema::parse(self.to_document()?)
    }

    fn value_type<'a>(&'a self, field: &str, fallback: &'a str) -> &'a str {
        self.value_types
            .get(field)
            .map(String::as_str)
            .unwrap_or(fallback)
    }
}
