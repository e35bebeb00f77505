//! Query evaluation and sorting.

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use tracing::debug;

use super::db::Catalog;
use super::entry::{FieldValue, Record};
use super::error::{Result, ShelfError};
use super::timefmt::{is_timestamp, parse_timestamp, sort_timestamps};
use super::types::{FieldKind, ValueType};

const VETO_PREFIX: char = '!';

/// Query values split into required hits and vetoes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    pub hits: Vec<String>,
    pub vetoes: Vec<String>,
}

impl QueryTerms {
    pub fn parse<V: AsRef<str>>(values: &[V]) -> Self {
        let mut terms = Self::default();
        for value in values {
            let value = value.as_ref();
            match value.strip_prefix(VETO_PREFIX) {
                Some(veto) => terms.vetoes.push(veto.to_string()),
                None => terms.hits.push(value.to_string()),
            }
        }
        terms
    }

    /// Whether a record with `values` passes.
    ///
    /// Every hit must be present; with vetoes, none of them may be.
    pub fn accepts(&self, values: &std::collections::BTreeSet<String>) -> bool {
        let hit = self.hits.iter().filter(|v| values.contains(*v)).count();
        let veto = self.vetoes.iter().any(|v| values.contains(v));
        if self.vetoes.is_empty() {
            hit == self.hits.len()
        } else if self.hits.is_empty() {
            !veto
        } else {
            !veto && hit == self.hits.len()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Time(NaiveDateTime),
    Text(String),
}

/// Unparseable values (placeholders) order before everything else.
fn compare_keys(a: &Option<SortKey>, b: &Option<SortKey>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(SortKey::Number(x)), Some(SortKey::Number(y))) => x.total_cmp(y),
        (Some(SortKey::Time(x)), Some(SortKey::Time(y))) => x.cmp(y),
        (Some(SortKey::Text(x)), Some(SortKey::Text(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn sort_key(value: &FieldValue, value_type: &ValueType) -> Result<Option<SortKey>> {
    let key = match (value, value_type) {
        (FieldValue::List(values), _) => {
            // Placeholders like "emptyOpened" are not timestamps.
            let stamps: Vec<String> = values.iter().filter(|v| is_timestamp(v)).cloned().collect();
            match sort_timestamps(&stamps)?.first() {
                Some(newest) => Some(SortKey::Time(parse_timestamp(newest)?)),
                None => None,
            }
        }
        (FieldValue::Single(v), ValueType::Datetime) => parse_timestamp(v).ok().map(SortKey::Time),
        (FieldValue::Single(v), t) if t.is_numeric() => {
            v.trim().parse::<f64>().ok().map(SortKey::Number)
        }
        (FieldValue::Single(v), _) => Some(SortKey::Text(v.clone())),
    };
    Ok(key)
}

impl Catalog {
    /// Records matching `values` over the union of `fields`.
    ///
    /// Values starting with `!` are vetoes. Record values are compared by
    /// whitespace-separated token.
    pub fn query<F, V>(&self, fields: &[F], values: &[V]) -> Result<Vec<&Record>>
    where
        F: AsRef<str>,
        V: AsRef<str>,
    {
        for field in fields {
            self.schema.field(field.as_ref())?;
        }
        let terms = QueryTerms::parse(values);
        debug!(hits = ?terms.hits, vetoes = ?terms.vetoes, "Processing query");

        let mut result = Vec::new();
        for record in &self.records {
            if terms.accepts(&record.values_of(fields, true)?) {
                result.push(record);
            }
        }
        Ok(result)
    }

    /// Like [`Catalog::query`], returning IDs.
    pub fn query_ids<F, V>(&self, fields: &[F], values: &[V]) -> Result<Vec<String>>
    where
        F: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(self
            .query(fields, values)?
            .into_iter()
            .map(|r| r.id().to_string())
            .collect())
    }

    /// IDs ordered by `field`; newest/largest first when `reverse`.
    ///
    /// Ties are ordered by ID in the same direction. List fields can only
    /// be sorted when they hold datetimes, by their newest entry.
    pub fn sorted_ids(&self, field: &str, reverse: bool) -> Result<Vec<String>> {
        let def = self.schema.field(field)?;
        if def.kind == FieldKind::List && def.value_type != ValueType::Datetime {
            return Err(ShelfError::NotImplemented(format!(
                "sorting list field '{}' of type {}",
                field, def.value_type
            )));
        }

        let mut keyed = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let key = sort_key(record.get(field)?, &def.value_type)?;
            keyed.push((key, record.id_number(), record.id().to_string()));
        }
        keyed.sort_by(|a, b| compare_keys(&a.0, &b.0).then_with(|| a.1.cmp(&b.1)));
        if reverse {
            keyed.reverse();
        }
        Ok(keyed.into_iter().map(|(_, _, id)| id).collect())
    }
}
