//! Day-by-day comment acquisition against a pushshift-style search endpoint.
//!
//! `FetchQuery` is the validated, immutable form of `FetchOptions` and knows how
//! to build request URLs. `Fetcher` drives one request per calendar day through a
//! `Transport`, buffers every normalized record, and writes them out at the end.

use crate::config::FetchOptions;
use crate::csv_io::write_records;
use crate::date::{format_iso_date, iter_days, LocalZone, PLATFORM_FLOOR};
use crate::error::RcError;
use crate::paths::default_filename;
use crate::progress::maybe_progress;
use crate::record::{Record, SearchResponse};
use crate::transport::{HttpTransport, Transport};
use crate::util::{non_blank, normalize_subreddit};
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use time::Date;
use tracing::{debug, info, warn};

/// A corrective change made to the requested date range. Not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchNotice {
    /// Start date preceded the earliest day the API serves.
    StartClamped { requested: Date, clamped_to: Date },
    /// End date was later than yesterday.
    EndClamped { requested: Date, clamped_to: Date },
}

impl fmt::Display for FetchNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchNotice::StartClamped { requested, clamped_to } => write!(
                f,
                "start date {} is before {}; setting start date to {}",
                format_iso_date(*requested),
                format_iso_date(PLATFORM_FLOOR),
                format_iso_date(*clamped_to)
            ),
            FetchNotice::EndClamped { requested, clamped_to } => write!(
                f,
                "end date {} is not in the past; setting end date to {}",
                format_iso_date(*requested),
                format_iso_date(*clamped_to)
            ),
        }
    }
}

/// Validated query parameters. Built once, then used to produce one URL per day.
#[derive(Clone, Debug)]
pub struct FetchQuery {
    search_term: Option<String>,
    subreddit: Option<String>,
    results_per_day: u64,
    min_score: i64,
    sort_by: Option<String>,
    start: Date,
    end: Date,
    zone: LocalZone,
    base_url: String,
    notices: Vec<FetchNotice>,
}

impl FetchQuery {
    /// Validate `opts` against today's date in the configured zone.
    pub fn from_options(opts: &FetchOptions) -> Result<Self> {
        Self::from_options_at(opts, opts.zone.today()?)
    }

    /// Same as `from_options`, with an explicit "today".
    pub fn from_options_at(opts: &FetchOptions, today: Date) -> Result<Self> {
        if opts.results_per_day < 0 || opts.min_score < 0 {
            return Err(RcError::invalid(format!(
                "results_per_day and min_score have to be non-negative integers (got {} and {})",
                opts.results_per_day, opts.min_score
            ))
            .into());
        }

        let mut notices = Vec::new();

        let mut start = opts.start;
        if start < PLATFORM_FLOOR {
            notices.push(FetchNotice::StartClamped { requested: start, clamped_to: PLATFORM_FLOOR });
            start = PLATFORM_FLOOR;
        }

        let yesterday = today.previous_day().unwrap_or(today);
        let mut end = opts.end;
        if end > yesterday {
            notices.push(FetchNotice::EndClamped { requested: end, clamped_to: yesterday });
            end = yesterday;
        }

        for n in &notices {
            warn!("{}", n);
        }
        if start > end {
            warn!(
                "start date {} is after end date {}; nothing will be fetched",
                format_iso_date(start),
                format_iso_date(end)
            );
        }

        Ok(Self {
            search_term: non_blank(opts.search_term.clone()),
            subreddit: non_blank(opts.subreddit.clone()).map(|s| normalize_subreddit(&s)).filter(|s| !s.is_empty()),
            results_per_day: opts.results_per_day as u64,
            min_score: opts.min_score,
            sort_by: non_blank(opts.sort_by.clone()),
            start,
            end,
            zone: opts.zone,
            base_url: opts.base_url.clone(),
            notices,
        })
    }

    pub fn start(&self) -> Date { self.start }
    pub fn end(&self) -> Date { self.end }
    pub fn zone(&self) -> LocalZone { self.zone }
    pub fn notices(&self) -> &[FetchNotice] { &self.notices }
    pub fn search_term(&self) -> Option<&str> { self.search_term.as_deref() }
    pub fn subreddit(&self) -> Option<&str> { self.subreddit.as_deref() }
    pub fn min_score(&self) -> i64 { self.min_score }

    /// Days covered by the (clamped) range, inclusive.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        iter_days(self.start, self.end)
    }

    pub fn day_count(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            ((self.end - self.start).whole_days() + 1) as u64
        }
    }

    /// Filename used when the caller does not pick one.
    pub fn default_filename(&self) -> String {
        default_filename(self.search_term(), self.subreddit(), self.min_score, self.start, self.end)
    }

    /// URL for the day window `[day, day + 1)`. Both bounds are local midnights,
    /// so DST days span 23 or 25 hours.
    pub fn url_for_day(&self, day: Date) -> Result<String> {
        let after = self.zone.midnight_epoch(day)?;
        let before = self.zone.midnight_epoch(next_day(day)?)?;
        Ok(self.url_for_window(after, before))
    }

    /// One URL covering the whole range, first day's midnight to the midnight after the last day.
    pub fn url_for_range(&self) -> Result<String> {
        let after = self.zone.midnight_epoch(self.start)?;
        let before = self.zone.midnight_epoch(next_day(self.end)?)?;
        Ok(self.url_for_window(after, before))
    }

    /// `after` / `before` are epoch seconds. The score clause is appended raw
    /// (`score=>N`), the API rejects it percent-encoded.
    pub fn url_for_window(&self, after: i64, before: i64) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = &self.search_term {
            ser.append_pair("q", q);
        }
        if let Some(s) = &self.subreddit {
            ser.append_pair("subreddit", s);
        }
        ser.append_pair("size", &self.results_per_day.to_string());
        ser.append_pair("after", &after.to_string());
        ser.append_pair("before", &before.to_string());
        if let Some(sort) = &self.sort_by {
            ser.append_pair("sort_type", sort);
            ser.append_pair("sort", "desc");
        }

        let mut url = format!("{}?{}", self.base_url, ser.finish());
        if self.min_score > 0 {
            url.push_str(&format!("&score=>{}", self.min_score));
        }
        url
    }
}

fn next_day(day: Date) -> Result<Date> {
    day.next_day()
        .with_context(|| format!("no day after {}", format_iso_date(day)))
}

/// Summary of a completed `execute_and_store` run.
#[derive(Clone, Debug)]
pub struct FetchReport {
    pub path: PathBuf,
    pub records: u64,
    pub days: u64,
    pub notices: Vec<FetchNotice>,
}

pub struct Fetcher<T: Transport = HttpTransport> {
    query: FetchQuery,
    transport: T,
    request_interval: Duration,
    data_dir: PathBuf,
    filename: String,
    progress: bool,
}

impl Fetcher<HttpTransport> {
    /// Validate options and set up the HTTP client.
    /// Validation runs before the client exists.
    pub fn new(opts: FetchOptions) -> Result<Self> {
        let query = FetchQuery::from_options(&opts)?;
        let transport = HttpTransport::new()?;
        Ok(Self::assemble(query, transport, &opts))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(opts: FetchOptions, transport: T) -> Result<Self> {
        let query = FetchQuery::from_options(&opts)?;
        Ok(Self::assemble(query, transport, &opts))
    }

    fn assemble(query: FetchQuery, transport: T, opts: &FetchOptions) -> Self {
        let filename = non_blank(opts.filename.clone()).unwrap_or_else(|| query.default_filename());
        Self {
            query,
            transport,
            request_interval: opts.request_interval,
            data_dir: opts.data_dir.clone(),
            filename,
            progress: opts.progress,
        }
    }

    pub fn query(&self) -> &FetchQuery { &self.query }
    pub fn notices(&self) -> &[FetchNotice] { self.query.notices() }
    pub fn filename(&self) -> &str { &self.filename }

    /// Where `execute_and_store` writes when no override is given.
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.filename)
    }

    /// Download and normalize every comment of one day window.
    pub fn fetch_day(&self, day: Date) -> Result<Vec<Record>> {
        let url = self.query.url_for_day(day)?;
        debug!(%url, "requesting");
        let body = self.transport.get(&url)?;
        let resp: SearchResponse = serde_json::from_str(&body)
            .with_context(|| format!("parsing search response for {}", format_iso_date(day)))?;
        let zone = self.query.zone();
        resp.data.into_iter().map(|raw| raw.into_record(zone)).collect()
    }

    /// Walk the range one day at a time, sleeping `request_interval` after each
    /// request. Any failure aborts the walk; nothing is returned partially.
    pub fn run(&self) -> Result<Vec<Record>> {
        let pb = maybe_progress(self.progress, self.query.day_count(), "downloading");
        let mut documents = Vec::new();

        for day in self.query.days() {
            info!("downloading comments from {}", format_iso_date(day));
            let docs = self.fetch_day(day)?;
            info!("{} comments on {}", docs.len(), format_iso_date(day));
            documents.extend(docs);

            if let Some(pb) = &pb { pb.inc(1); }
            if !self.request_interval.is_zero() {
                std::thread::sleep(self.request_interval);
            }
        }

        if let Some(pb) = pb { pb.finish_with_message("done"); }
        Ok(documents)
    }

    /// Run the query and store the result as CSV under the data directory.
    /// `output_filename` overrides the configured/derived name.
    pub fn execute_and_store(&self, output_filename: Option<&str>) -> Result<FetchReport> {
        let records = self.run()?;

        let path = match output_filename.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => self.data_dir.join(name),
            None => self.output_path(),
        };
        let written = write_records(&path, &records)?;
        info!("Found {} comments matching your search query; stored in {}", written, path.display());

        Ok(FetchReport {
            path,
            records: written,
            days: self.query.day_count(),
            notices: self.query.notices().to_vec(),
        })
    }
}
