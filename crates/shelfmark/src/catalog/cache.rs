//! Per-field cache of every value present in the catalog.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    stale: bool,
    values: BTreeSet<String>,
}

/// Field name -> (stale flag, set of all values of that field).
#[derive(Debug, Clone, Default)]
pub struct ValueCache {
    entries: HashMap<String, CacheEntry>,
}

impl ValueCache {
    /// Cache with every field marked stale.
    pub fn new<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = fields
            .into_iter()
            .map(|field| {
                (
                    field.to_string(),
                    CacheEntry {
                        stale: true,
                        values: BTreeSet::new(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn invalidate(&mut self, field: &str) {
        if let Some(entry) = self.entries.get_mut(field) {
            entry.stale = true;
        }
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    pub fn is_fresh(&self, field: &str) -> bool {
        self.entries.get(field).map(|e| !e.stale).unwrap_or(false)
    }

    /// Cached values of `field`, if fresh.
    pub fn get(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .get(field)
            .filter(|entry| !entry.stale)
            .map(|entry| &entry.values)
    }

    pub fn store(&mut self, field: &str, values: BTreeSet<String>) {
        self.entries.insert(
            field.to_string(),
            CacheEntry {
                stale: false,
                values,
            },
        );
    }
}
