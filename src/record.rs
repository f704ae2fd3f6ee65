//! The flat comment record shared by the fetcher output and the sampler input,
//! plus the raw search-API item it is normalized from.

use crate::date::{iso_date_serde, LocalZone};
use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use time::Date;

/// Permalinks in the API are site-relative.
pub const PERMALINK_BASE: &str = "https://www.reddit.com";

/// Stored in `url` when the item carried no permalink.
pub const URL_NOT_AVAILABLE: &str = "n/a";

/// CSV column order. Field order of `Record` must match.
pub const CSV_HEADER: [&str; 6] = ["date", "author", "subreddit", "score", "url", "text"];

/// One normalized comment. Field order is the on-disk column order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "iso_date_serde")]
    pub date: Date,
    pub author: String,
    pub subreddit: String,
    pub score: i64,
    pub url: String,
    pub text: String,
}

impl Record {
    /// Whitespace-separated word count of `text`.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Search response envelope: `{ "data": [ ... ] }`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<RawComment>,
}

/// One item of the search response, as sent by the API.
#[derive(Debug, Deserialize)]
pub struct RawComment {
    #[serde(deserialize_with = "epoch_seconds")]
    pub created_utc: i64,
    pub author: String,
    pub subreddit: String,
    pub score: i64,
    #[serde(default)]
    pub permalink: Option<String>,
    pub body: String,
}

impl RawComment {
    /// Flatten into a `Record`: local calendar date, absolute permalink, unescaped body.
    pub fn into_record(self, zone: LocalZone) -> Result<Record> {
        let url = match self.permalink.as_deref() {
            Some(p) if !p.is_empty() => format!("{}{}", PERMALINK_BASE, p),
            _ => URL_NOT_AVAILABLE.to_string(),
        };
        let date = zone
            .date_of_epoch(self.created_utc)
            .with_context(|| format!("created_utc of comment by {}", self.author))?;
        Ok(Record {
            date,
            author: self.author,
            subreddit: self.subreddit,
            score: self.score,
            url,
            text: html_escape::decode_html_entities(&self.body).into_owned(),
        })
    }
}

/// `created_utc` shows up as either an integer or a float depending on the backend.
fn epoch_seconds<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    n.as_i64()
        .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| de::Error::custom(format!("created_utc out of range: {}", n)))
}
