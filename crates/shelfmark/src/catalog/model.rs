//! Schema ("model") of a catalog.
//!
//! A schema is a JSON document with a `General` block and one block per
//! field:
//!
//! ```json
//! {
//!     "General": {"Name": "...", "Description": "...", "Types": ["mp4"],
//!                 "Separators": [".", "-"], "SecondaryDBs": ["Tags"]},
//!     "Tags": {"Type": "ListItem", "default": ["emptyTags"],
//!              "itemType": "str", "plugin": "", "hide": ""}
//! }
//! ```

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

use super::error::{Result, ShelfError};
use super::plugin::PluginDescriptor;
use super::types::{
    FieldKind, ValueType, ADDED_FIELD, CHANGED_FIELD, ID_FIELD, NAME_FIELD, OPENED_FIELD,
    PATH_FIELD,
};

const GENERAL_BLOCK: &str = "General";

/// Fields every schema must declare, with their required kind.
pub const MANDATORY_FIELDS: [(&str, FieldKind); 6] = [
    (ID_FIELD, FieldKind::Single),
    (PATH_FIELD, FieldKind::Single),
    (NAME_FIELD, FieldKind::Single),
    (ADDED_FIELD, FieldKind::Single),
    (OPENED_FIELD, FieldKind::List),
    (CHANGED_FIELD, FieldKind::List),
];

/// Definition of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub kind: FieldKind,
    /// Scalar default; list fields start out as `[default]`.
    pub default: String,
    pub value_type: ValueType,
    pub plugin: Option<String>,
    pub hidden: bool,
}

/// Parsed, immutable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    description: String,
    extensions: Vec<String>,
    separators: Vec<String>,
    secondary_fields: Vec<String>,
    fields: IndexMap<String, FieldDef>,
    plugin_map: IndexMap<String, String>,
    document: Value,
}

impl Schema {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .map_err(|e| match e {
                ShelfError::Config(msg) => {
                    ShelfError::Config(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;
        Self::parse(document)
    }

    /// Parse and validate a schema document.
    pub fn parse(document: Value) -> Result<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| ShelfError::Config("schema must be a JSON object".into()))?;
        let general = root
            .get(GENERAL_BLOCK)
            .and_then(Value::as_object)
            .ok_or_else(|| ShelfError::Config("missing General block".into()))?;

        let name = string_entry(general, "Name")?;
        let description = general
            .get("Description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let mut extensions = Vec::new();
        for ext in string_list(general, "Types")? {
            let ext = ext.trim_start_matches('.').to_string();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        let separators = string_list(general, "Separators")?;
        let secondary_fields = string_list(general, "SecondaryDBs")?;

        let mut fields = IndexMap::new();
        for (field, block) in root {
            if field == GENERAL_BLOCK {
                continue;
            }
            fields.insert(field.clone(), parse_field(field, block)?);
        }

        for (field, kind) in MANDATORY_FIELDS {
            match fields.get(field) {
                None => {
                    return Err(ShelfError::Config(format!(
                        "mandatory field '{}' is missing",
                        field
                    )))
                }
                Some(def) if def.kind != kind => {
                    return Err(ShelfError::Config(format!(
                        "mandatory field '{}' must be a {} field",
                        field,
                        kind.as_str()
                    )))
                }
                Some(_) => {}
            }
        }

        for field in &secondary_fields {
            if !fields.contains_key(field) {
                return Err(ShelfError::Config(format!(
                    "secondary field '{}' is not declared",
                    field
                )));
            }
        }

        let mut plugin_map = IndexMap::new();
        for (field, def) in &fields {
            if let Some(plugin) = &def.plugin {
                if plugin_map.insert(plugin.clone(), field.clone()).is_some() {
                    return Err(ShelfError::Config(format!(
                        "plugin '{}' is mapped to more than one field",
                        plugin
                    )));
                }
            }
        }

        Ok(Self {
            name,
            description,
            extensions,
            separators,
            secondary_fields,
            fields,
            plugin_map,
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    pub fn secondary_fields(&self) -> &[String] {
        &self.secondary_fields
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> Result<&FieldDef> {
        self.fields
            .get(field)
            .ok_or_else(|| ShelfError::UnknownField(field.to_string()))
    }

    pub fn field_kind(&self, field: &str) -> Result<FieldKind> {
        Ok(self.field(field)?.kind)
    }

    /// Scalar default of a field (list defaults unwrapped).
    pub fn default_value(&self, field: &str) -> Result<&str> {
        Ok(&self.field(field)?.default)
    }

    pub fn value_type(&self, field: &str) -> Result<&ValueType> {
        Ok(&self.field(field)?.value_type)
    }

    /// Every field in declaration order.
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn single_fields(&self) -> impl Iterator<Item = &str> {
        self.fields_of(FieldKind::Single)
    }

    pub fn list_fields(&self) -> impl Iterator<Item = &str> {
        self.fields_of(FieldKind::List)
    }

    fn fields_of(&self, kind: FieldKind) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |(_, def)| def.kind == kind)
            .map(|(name, _)| name.as_str())
    }

    pub fn plugin_descriptors(&self) -> Vec<&str> {
        self.plugin_map.keys().map(String::as_str).collect()
    }

    pub fn field_for_plugin(&self, descriptor: &str) -> Option<&str> {
        self.plugin_map.get(descriptor).map(String::as_str)
    }

    /// The document this schema was parsed from.
    pub fn document(&self) -> &Value {
        &self.document
    }
}

fn parse_field(field: &str, block: &Value) -> Result<FieldDef> {
    let block = block
        .as_object()
        .ok_or_else(|| ShelfError::Config(format!("field '{}' must be an object", field)))?;

    let kind = match block.get("Type").and_then(Value::as_str) {
        Some("Item") => FieldKind::Single,
        Some("ListItem") => FieldKind::List,
        other => {
            return Err(ShelfError::Config(format!(
                "field '{}' has invalid Type {:?} (expected Item or ListItem)",
                field, other
            )))
        }
    };

    let default = match block.get("default") {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Array(values)) => values
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ShelfError::Config(format!("field '{}' has an empty or non-string default", field))
            })?
            .to_string(),
        _ => {
            return Err(ShelfError::Config(format!(
                "field '{}' needs a string or list default",
                field
            )))
        }
    };

    let value_type = ValueType::parse(block.get("itemType").and_then(Value::as_str).unwrap_or("str"));

    let plugin = match block.get("plugin").and_then(Value::as_str) {
        None | Some("") => None,
        Some(descriptor) => {
            PluginDescriptor::parse(descriptor)
                .map_err(|e| ShelfError::Config(format!("field '{}': {}", field, e)))?;
            Some(descriptor.to_string())
        }
    };

    let hidden = match block.get("hide") {
        Some(Value::Bool(hide)) => *hide,
        Some(Value::String(hide)) => !hide.is_empty(),
        _ => false,
    };

    Ok(FieldDef {
        kind,
        default,
        value_type,
        plugin,
        hidden,
    })
}

fn string_entry(block: &Map<String, Value>, key: &str) -> Result<String> {
    block
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ShelfError::Config(format!("General.{} must be a string", key)))
}

fn string_list(block: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    let values = block
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ShelfError::Config(format!("General.{} must be a list", key)))?;
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let value = value
            .as_str()
            .ok_or_else(|| ShelfError::Config(format!("General.{} must hold strings", key)))?;
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    Ok(out)
}
