//! In-memory comment dataset loaded from a CSV file, with date-window sampling.

use crate::csv_io::read_records;
use crate::filters::{date_position, qualifies, DatePosition};
use crate::query::{SampleCriteria, SelectBy, DEFAULT_SEED};
use crate::record::Record;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Records held in date-ascending order. Rows sharing a date keep their file order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    data: Vec<Record>,
}

impl Dataset {
    /// Load a CSV produced by the fetcher and sort it by date.
    pub fn load(path: &Path) -> Result<Self> {
        let ds = Self::from_records(read_records(path)?);
        tracing::info!("Loaded {} dataset with {} comments.", path.display(), ds.len());
        Ok(ds)
    }

    pub fn from_records(mut data: Vec<Record>) -> Self {
        // stable: same-day rows stay in insertion order
        data.sort_by_key(|r| r.date);
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn records(&self) -> &[Record] {
        &self.data
    }

    /// Sample with the fixed default seed, so repeated runs over the same
    /// file and criteria return the same rows.
    pub fn sample(&self, criteria: &SampleCriteria) -> Vec<&Record> {
        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        self.sample_with_rng(criteria, &mut rng)
    }

    /// Rows inside `[start_date, end_date]` that pass the word-count and term
    /// filters, in date order. Relies on `data` being sorted: the scan stops at
    /// the first row past `end_date`.
    pub fn qualifying(&self, criteria: &SampleCriteria) -> Vec<&Record> {
        let q = criteria.clone().normalize();
        let mut out = Vec::new();
        for rec in &self.data {
            match date_position(rec.date, q.start_date, q.end_date) {
                DatePosition::Before => continue,
                DatePosition::After => break,
                DatePosition::Within => {}
            }
            if qualifies(rec, &q) {
                out.push(rec);
            }
        }
        out
    }

    /// Select up to `max_count` qualifying rows, drawing randomness from `rng`.
    ///
    /// - `Random`: uniform without replacement; if no more than `max_count`
    ///   rows qualify, all of them are returned in date order.
    /// - `Score`: score descending, ties in date order, truncated to `max_count`.
    pub fn sample_with_rng<R: Rng + ?Sized>(&self, criteria: &SampleCriteria, rng: &mut R) -> Vec<&Record> {
        let mut matching = self.qualifying(criteria);
        let n = criteria.max_count;
        match criteria.select_by {
            SelectBy::Random => {
                if matching.len() <= n {
                    matching
                } else {
                    matching.choose_multiple(rng, n).copied().collect()
                }
            }
            SelectBy::Score => {
                matching.sort_by(|a, b| b.score.cmp(&a.score));
                matching.truncate(n);
                matching
            }
        }
    }
}
