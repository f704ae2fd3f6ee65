//! Row-level predicates used by the sampler: tokenization, term checks, date bounds.

use crate::query::SampleCriteria;
use crate::record::Record;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use time::Date;

/// Tokens of two or more word characters; single letters never match a term.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static regex"))
}

/// Lowercased word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_re().find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Where a row sits relative to an inclusive date window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatePosition {
    Before,
    Within,
    After,
}

pub fn date_position(d: Date, start: Date, end: Date) -> DatePosition {
    if d < start {
        DatePosition::Before
    } else if d > end {
        DatePosition::After
    } else {
        DatePosition::Within
    }
}

/// Every include term present as a token, and no exclude term present.
/// `must_include` / `must_exclude` are expected normalized (lowercase).
pub fn matches_terms(text: &str, must_include: &[String], must_exclude: &[String]) -> bool {
    if must_include.is_empty() && must_exclude.is_empty() {
        return true;
    }
    let tokens: HashSet<String> = tokenize(text).into_iter().collect();
    if !must_include.iter().all(|t| tokens.contains(t)) {
        return false;
    }
    !must_exclude.iter().any(|t| tokens.contains(t))
}

/// Word-count and term predicates (the date window is handled by the scan).
pub fn qualifies(rec: &Record, q: &SampleCriteria) -> bool {
    if rec.word_count() < q.min_words {
        return false;
    }
    if q.has_term_filters() && !matches_terms(&rec.text, &q.must_include, &q.must_exclude) {
        return false;
    }
    true
}
