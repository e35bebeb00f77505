//! Random record selection.

use rand::distributions::WeightedIndex;
use rand::prelude::*;

use super::db::Catalog;
use super::error::{Result, ShelfError};
use super::types::{WeightingMethod, OPENED_FIELD};

/// Weight given to records that were never opened.
const NEVER_OPENED_WEIGHT: f64 = 5.0;

impl Catalog {
    /// Pick a random ID out of `candidates`.
    ///
    /// Recently executed IDs are skipped unless that leaves nothing to pick
    /// from.
    pub fn random_record<S: AsRef<str>>(
        &self,
        candidates: &[S],
        weighted: bool,
        method: WeightingMethod,
    ) -> Result<String> {
        self.random_record_with(&mut thread_rng(), candidates, weighted, method)
    }

    /// [`Catalog::random_record`] drawing from `rng`.
    pub fn random_record_with<R, S>(
        &self,
        rng: &mut R,
        candidates: &[S],
        weighted: bool,
        method: WeightingMethod,
    ) -> Result<String>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        if candidates.is_empty() {
            return Err(ShelfError::InvalidArgument(
                "no candidates to choose from".into(),
            ));
        }
        for id in candidates {
            self.get_by_id(id.as_ref())?;
        }

        let fresh: Vec<&str> = candidates
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| !self.recent.contains(id))
            .collect();
        let pool: Vec<&str> = if fresh.is_empty() {
            candidates.iter().map(|id| id.as_ref()).collect()
        } else {
            fresh
        };

        if !weighted {
            return pool
                .choose(rng)
                .map(|id| id.to_string())
                .ok_or_else(|| ShelfError::InvalidArgument("no candidates to choose from".into()));
        }

        let weights = self.weights(&pool, method)?;
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| ShelfError::InvalidArgument(format!("invalid weights: {}", e)))?;
        Ok(pool[dist.sample(rng)].to_string())
    }

    fn weights(&self, pool: &[&str], method: WeightingMethod) -> Result<Vec<f64>> {
        match method {
            WeightingMethod::TimesOpened => {
                let default = self.schema.default_value(OPENED_FIELD)?;
                pool.iter()
                    .map(|id| -> Result<f64> {
                        let opened = self
                            .get_by_id(id)?
                            .list(OPENED_FIELD)?
                            .iter()
                            .filter(|v| v.as_str() != default)
                            .count();
                        Ok(if opened == 0 {
                            NEVER_OPENED_WEIGHT
                        } else {
                            1.0 / (2.0 * opened as f64 + 1.0)
                        })
                    })
                    .collect()
            }
        }
    }

    /// Random ID out of the whole catalog.
    pub fn random_from_all(&self, weighted: bool) -> Result<String> {
        let ids = self.ids();
        self.random_record(&ids, weighted, WeightingMethod::default())
    }
}
