//! Sample criteria (what to select from a loaded dataset) and normalization helpers.

use crate::date::parse_iso_date;
use crate::error::RcError;
use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use time::Date;

/// Seed used by `Dataset::sample` when the caller does not inject an RNG.
pub const DEFAULT_SEED: u64 = 0;

/// How the capped subset is chosen from the qualifying rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectBy {
    /// Uniform sample without replacement.
    #[default]
    Random,
    /// Highest score first, ties kept in date order.
    Score,
}

impl FromStr for SelectBy {
    type Err = RcError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SelectBy::Random),
            "score" => Ok(SelectBy::Score),
            _ => Err(RcError::invalid(format!(
                "select_by has to be \"random\" or \"score\" but not {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for SelectBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectBy::Random => f.write_str("random"),
            SelectBy::Score => f.write_str("score"),
        }
    }
}

/// Selection criteria for `Dataset::sample`. Both date bounds are inclusive.
/// Term lists are matched case-insensitively against whole tokens.
#[derive(Clone, Debug)]
pub struct SampleCriteria {
    pub start_date: Date,
    pub end_date: Date,
    pub max_count: usize,
    pub min_words: usize,
    pub select_by: SelectBy,
    pub must_include: Vec<String>,
    pub must_exclude: Vec<String>,
}

impl Default for SampleCriteria {
    fn default() -> Self {
        Self {
            start_date: Date::MIN,
            end_date: Date::MAX,
            max_count: usize::MAX,
            min_words: 10,
            select_by: SelectBy::Random,
            must_include: Vec::new(),
            must_exclude: Vec::new(),
        }
    }
}

impl SampleCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: Date, end: Date) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
    /// String form of `with_date_range`; both must be "YYYY-MM-DD".
    pub fn with_iso_range(self, start: &str, end: &str) -> Result<Self> {
        let (s, e) = (parse_iso_date(start)?, parse_iso_date(end)?);
        Ok(self.with_date_range(s, e))
    }
    pub fn with_max_count(mut self, n: usize) -> Self {
        self.max_count = n;
        self
    }
    pub fn with_min_words(mut self, n: usize) -> Self {
        self.min_words = n;
        self
    }
    pub fn with_select_by(mut self, by: SelectBy) -> Self {
        self.select_by = by;
        self
    }
    pub fn must_include<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.must_include = terms.into_iter().map(|t| normalize_term(t.as_ref())).collect();
        self
    }
    pub fn must_exclude<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.must_exclude = terms.into_iter().map(|t| normalize_term(t.as_ref())).collect();
        self
    }

    /// Lowercase + trim the term lists, then sort + dedup.
    /// Safe to call on criteria built by hand through the public fields.
    pub fn normalize(mut self) -> Self {
        for list in [&mut self.must_include, &mut self.must_exclude] {
            for t in list.iter_mut() {
                *t = normalize_term(t);
            }
            list.retain(|t| !t.is_empty());
            list.sort();
            list.dedup();
        }
        self
    }

    pub fn has_term_filters(&self) -> bool {
        !self.must_include.is_empty() || !self.must_exclude.is_empty()
    }
}

#[inline]
pub fn normalize_term(s: &str) -> String {
    s.trim().to_lowercase()
}
