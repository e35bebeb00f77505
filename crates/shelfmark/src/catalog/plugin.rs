//! Metadata plugins that fill fields of newly discovered files.
//!
//! A field opts in with a `"module:value"` descriptor in the schema. The
//! catalog calls the configured [`MetadataPlugin`] once per new file with
//! every descriptor of the schema and writes each answer to its field.

use std::collections::HashMap;
use std::path::Path;

use super::error::{Result, ShelfError};

/// Parsed `module:value` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginDescriptor {
    pub module: String,
    pub value: String,
}

impl PluginDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let (module, value) = descriptor.split_once(':').ok_or_else(|| {
            ShelfError::Plugin(format!(
                "'{}' is not a valid plugin, expected 'module:value'",
                descriptor
            ))
        })?;
        let valid = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(module) || !valid(value) {
            return Err(ShelfError::Plugin(format!(
                "'{}' is not a valid plugin, expected 'module:value'",
                descriptor
            )));
        }
        Ok(Self {
            module: module.to_string(),
            value: value.to_string(),
        })
    }
}

/// Source of plugin field values.
pub trait MetadataPlugin: Send + Sync {
    /// Values for `descriptors` of the file at `full_path`, keyed by descriptor.
    fn plugin_values(&self, full_path: &Path, descriptors: &[&str])
        -> Result<HashMap<String, String>>;
}

/// Answers `osData:*` descriptors from filesystem metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDataPlugin;

const OS_DATA_MODULE: &str = "osData";
const BYTES_PER_GB: f64 = 1e9;

impl MetadataPlugin for OsDataPlugin {
    fn plugin_values(
        &self,
        full_path: &Path,
        descriptors: &[&str],
    ) -> Result<HashMap<String, String>> {
        let parsed = descriptors
            .iter()
            .map(|d| PluginDescriptor::parse(d).map(|p| (*d, p)))
            .collect::<Result<Vec<_>>>()?;
        if parsed.is_empty() {
            return Ok(HashMap::new());
        }

        let metadata = std::fs::metadata(full_path)?;
        let mut values = HashMap::with_capacity(parsed.len());
        for (raw, descriptor) in parsed {
            if descriptor.module != OS_DATA_MODULE {
                return Err(ShelfError::Plugin(format!(
                    "module '{}' is not available",
                    descriptor.module
                )));
            }
            let value = match descriptor.value.as_str() {
                "size" => format!("{:.2}", metadata.len() as f64 / BYTES_PER_GB),
                other => {
                    return Err(ShelfError::Plugin(format!(
                        "osData has no value '{}'",
                        other
                    )))
                }
            };
            values.insert(raw.to_string(), value);
        }
        Ok(values)
    }
}
