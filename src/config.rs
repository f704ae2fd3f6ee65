use crate::date::{parse_iso_date, LocalZone, PLATFORM_FLOOR};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::{Date, UtcOffset};

pub const DEFAULT_BASE_URL: &str = "https://api.pushshift.io/reddit/search/";
pub const DEFAULT_DATA_DIR: &str = "reddit_data";
pub const ENV_DATA_DIR: &str = "RCOMMENTS_DATA_DIR";
pub const ENV_BASE_URL: &str = "RCOMMENTS_BASE_URL";

/// User-facing fetch options with defaults and builder chaining.
/// Nothing is validated here; `Fetcher::new` does that.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub search_term: Option<String>,
    pub subreddit: Option<String>,     // "r/" prefix stripped on validation
    pub results_per_day: i64,          // `size` per request, must be >= 0
    pub start: Date,                   // inclusive
    pub end: Date,                     // inclusive
    pub min_score: i64,                // 0 = no score clause
    pub sort_by: Option<String>,       // `sort_type`; None drops sorting params
    pub base_url: String,
    pub request_interval: Duration,    // sleep after every request
    pub zone: LocalZone,               // day boundaries and comment dates
    pub data_dir: PathBuf,
    pub filename: Option<String>,      // None: derived from the query
    pub progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        let data_dir = std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            search_term: None,
            subreddit: None,
            results_per_day: 1000,
            start: PLATFORM_FLOOR,
            // far future: clamped to yesterday at construction
            end: time::macros::date!(2030 - 01 - 01),
            min_score: 0,
            sort_by: Some("score".to_string()),
            base_url,
            request_interval: Duration::from_secs(1),
            zone: LocalZone::System,
            data_dir: PathBuf::from(data_dir),
            filename: None,
            progress: false,
        }
    }
}

impl FetchOptions {
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }
    pub fn with_subreddit(mut self, sub: impl Into<String>) -> Self {
        self.subreddit = Some(sub.into());
        self
    }
    pub fn with_results_per_day(mut self, n: i64) -> Self {
        self.results_per_day = n;
        self
    }
    pub fn with_date_range(mut self, start: Date, end: Date) -> Self {
        self.start = start;
        self.end = end;
        self
    }
    /// String form of `with_date_range`; both must be "YYYY-MM-DD".
    pub fn with_iso_range(self, start: &str, end: &str) -> Result<Self> {
        let (s, e) = (parse_iso_date(start)?, parse_iso_date(end)?);
        Ok(self.with_date_range(s, e))
    }
    pub fn with_min_score(mut self, n: i64) -> Self {
        self.min_score = n;
        self
    }
    pub fn with_sort_by(mut self, key: Option<String>) -> Self {
        self.sort_by = key;
        self
    }
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
    pub fn with_request_interval(mut self, d: Duration) -> Self {
        self.request_interval = d;
        self
    }
    pub fn with_zone(mut self, zone: LocalZone) -> Self {
        self.zone = zone;
        self
    }
    /// Shorthand for `with_zone(LocalZone::Fixed(off))`.
    pub fn with_utc_offset(self, off: UtcOffset) -> Self {
        self.with_zone(LocalZone::Fixed(off))
    }
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}
