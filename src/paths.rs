//! Output naming: the default CSV filename derived from a fetch query.

use crate::date::format_iso_date;
use time::Date;

/// `_`-joined: search term, `r<subreddit>`, `minscore_<n>` (when > 0), `<start>to<end>`; plus `.csv`.
///
/// ```text
/// corona_rCoronavirus_minscore_2_2020-01-28to2020-01-30.csv
/// ```
pub fn default_filename(
    search_term: Option<&str>,
    subreddit: Option<&str>,
    min_score: i64,
    start: Date,
    end: Date,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if let Some(t) = search_term {
        parts.push(t.to_string());
    }
    if let Some(s) = subreddit {
        parts.push(format!("r{}", s));
    }
    if min_score > 0 {
        parts.push(format!("minscore_{}", min_score));
    }
    parts.push(format!("{}to{}", format_iso_date(start), format_iso_date(end)));
    format!("{}.csv", parts.join("_"))
}
