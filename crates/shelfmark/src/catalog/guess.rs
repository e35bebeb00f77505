//! Guessing secondary field values from a file path.
//!
//! Matching runs in two phases over the lower-cased path:
//! 1. whole path segments equal to a known value
//! 2. tokens of the remaining segments (split on every separator) that
//!    contain a known word; words of multi-word values credit the full value

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use super::db::Catalog;
use super::error::Result;
use super::types::GuessOptions;

/// Known values of one field, prepared for matching.
struct FieldValues {
    /// Lower-cased value -> original value.
    originals: HashMap<String, String>,
    /// Segment spellings that match a value exactly -> lower-cased value.
    exact: HashMap<String, String>,
    /// Word -> lower-cased values containing it.
    words: HashMap<String, Vec<String>>,
}

impl FieldValues {
    fn new(values: &BTreeSet<String>, separators: &[String], whitespace_match: bool) -> Self {
        let mut originals = HashMap::new();
        let mut exact = HashMap::new();
        let mut words: HashMap<String, Vec<String>> = HashMap::new();

        for value in values {
            let lower = value.to_lowercase();
            originals.entry(lower.clone()).or_insert_with(|| value.clone());
            exact.insert(lower.clone(), lower.clone());

            if lower.contains(' ') {
                if whitespace_match {
                    for sep in separators {
                        exact
                            .entry(lower.replace(' ', sep))
                            .or_insert_with(|| lower.clone());
                    }
                }
                for word in lower.split(' ').filter(|w| !w.is_empty()) {
                    let owners = words.entry(word.to_string()).or_default();
                    if !owners.contains(&lower) {
                        owners.push(lower.clone());
                    }
                }
            } else {
                let owners = words.entry(lower.clone()).or_default();
                if !owners.contains(&lower) {
                    owners.push(lower.clone());
                }
            }
        }

        Self {
            originals,
            exact,
            words,
        }
    }
}

/// Split `text` on every separator, keeping the non-empty pieces.
pub fn split_on_separators(text: &str, separators: &[String]) -> BTreeSet<String> {
    let mut pieces = vec![text.to_string()];
    for sep in separators.iter().filter(|s| !s.is_empty()) {
        pieces = pieces
            .iter()
            .flat_map(|piece| piece.split(sep.as_str()))
            .map(str::to_string)
            .collect();
    }
    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

impl Catalog {
    /// Tokens of `text` after splitting on the schema's separators.
    pub fn split_tokens(&self, text: &str) -> BTreeSet<String> {
        split_on_separators(text, self.schema.separators())
    }

    /// Guess values of the secondary fields from a relative path.
    ///
    /// Returns an entry for every secondary field, possibly empty.
    pub fn guess_fields(
        &mut self,
        path: &str,
        options: GuessOptions,
    ) -> Result<IndexMap<String, BTreeSet<String>>> {
        let secondary = self.schema.secondary_fields().to_vec();
        let separators = self.schema.separators().to_vec();

        let mut known = Vec::with_capacity(secondary.len());
        for field in &secondary {
            let values = self.all_values(field)?;
            known.push(FieldValues::new(values, &separators, options.whitespace_match));
        }

        let mut trimmed = path;
        for ext in self.schema.extensions() {
            if let Some(stripped) = trimmed.strip_suffix(&format!(".{}", ext)) {
                trimmed = stripped;
                break;
            }
        }
        let lowered = trimmed.to_lowercase();
        let segments: Vec<&str> = lowered.split('/').filter(|s| !s.is_empty()).collect();

        let mut found: Vec<Vec<String>> = vec![Vec::new(); secondary.len()];
        let mut consumed = HashSet::new();
        for segment in &segments {
            for (idx, values) in known.iter().enumerate() {
                if let Some(value) = values.exact.get(*segment) {
                    found[idx].push(value.clone());
                    consumed.insert(*segment);
                }
            }
        }

        if !options.fast {
            let remaining = segments.iter().filter(|s| !consumed.contains(*s));
            for segment in remaining {
                for token in split_on_separators(segment, &separators) {
                    for (idx, values) in known.iter().enumerate() {
                        for (word, owners) in &values.words {
                            if word.chars().count() <= 1 || !token.contains(word.as_str()) {
                                continue;
                            }
                            debug!(
                                field = %secondary[idx],
                                word = %word,
                                token = %token,
                                "Partial match"
                            );
                            found[idx].extend(owners.iter().cloned());
                        }
                    }
                }
            }
        }

        let mut guesses = IndexMap::with_capacity(secondary.len());
        for (idx, field) in secondary.into_iter().enumerate() {
            let originals = &known[idx].originals;
            let values: BTreeSet<String> = found[idx]
                .iter()
                .map(|lower| originals.get(lower).cloned().unwrap_or_else(|| lower.clone()))
                .collect();
            guesses.insert(field, values);
        }
        Ok(guesses)
    }
}
