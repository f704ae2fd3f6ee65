use crate::error::RcError;
use anyhow::{bail, Context, Result};
use chrono::{Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use time::macros::{date, format_description};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Earliest day the search API can serve.
pub const PLATFORM_FLOOR: Date = date!(2020 - 01 - 01);

/// Parse a strict "YYYY-MM-DD" string.
pub fn parse_iso_date(s: &str) -> Result<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("expected YYYY-MM-DD, got {:?}", s))
}

pub fn format_iso_date(d: Date) -> String {
    d.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day()))
}

/// Inclusive iteration from `start` to `end` (if `start` <= `end`), else empty.
pub fn iter_days(start: Date, end: Date) -> impl Iterator<Item = Date> {
    let mut curr = if start <= end { Some(start) } else { None };
    std::iter::from_fn(move || {
        let ret = curr?;
        curr = ret.next_day().filter(|n| *n <= end);
        Some(ret)
    })
}

/// Time zone used for day windows and for dating comments. The UTC offset is
/// resolved per instant, so DST transitions inside a range are honored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocalZone {
    /// The host's zone rules (`chrono::Local`).
    #[default]
    System,
    /// A named IANA zone, e.g. `America/New_York`.
    Named(Tz),
    /// A constant offset with no DST.
    Fixed(UtcOffset),
}

impl LocalZone {
    /// Epoch seconds of the first instant of `day` in this zone.
    pub fn midnight_epoch(&self, day: Date) -> Result<i64> {
        match self {
            LocalZone::Fixed(off) => Ok(PrimitiveDateTime::new(day, Time::MIDNIGHT)
                .assume_offset(*off)
                .unix_timestamp()),
            LocalZone::System => first_instant(&chrono::Local, to_naive(day)?),
            LocalZone::Named(tz) => first_instant(tz, to_naive(day)?),
        }
    }

    /// Calendar date, in this zone, of a UTC epoch timestamp.
    pub fn date_of_epoch(&self, ts: i64) -> Result<Date> {
        if let LocalZone::Fixed(off) = self {
            let dt = OffsetDateTime::from_unix_timestamp(ts)
                .with_context(|| format!("timestamp {} out of range", ts))?;
            return Ok(dt.to_offset(*off).date());
        }
        let utc = Utc
            .timestamp_opt(ts, 0)
            .single()
            .with_context(|| format!("timestamp {} out of range", ts))?;
        let local = match self {
            LocalZone::Named(tz) => utc.with_timezone(tz).date_naive(),
            _ => utc.with_timezone(&chrono::Local).date_naive(),
        };
        from_naive(local)
    }

    /// Current calendar date in this zone.
    pub fn today(&self) -> Result<Date> {
        match self {
            LocalZone::Fixed(off) => Ok(OffsetDateTime::now_utc().to_offset(*off).date()),
            LocalZone::Named(tz) => from_naive(Utc::now().with_timezone(tz).date_naive()),
            LocalZone::System => from_naive(chrono::Local::now().date_naive()),
        }
    }
}

impl FromStr for LocalZone {
    type Err = RcError;
    /// "local", an IANA name, or "UTC".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "local" => Ok(LocalZone::System),
            name => name
                .parse::<Tz>()
                .map(LocalZone::Named)
                .map_err(|e| RcError::invalid(format!("unknown time zone {:?}: {}", name, e))),
        }
    }
}

/// Midnight can fall in a DST gap (e.g. zones that switch at 00:00); the day then
/// starts at the first local time that exists. Ambiguous midnights take the earlier instant.
fn first_instant<Z: TimeZone>(tz: &Z, day: NaiveDate) -> Result<i64> {
    let mut t = NaiveDateTime::new(day, NaiveTime::MIN);
    for _ in 0..16 {
        match tz.from_local_datetime(&t) {
            LocalResult::Single(dt) => return Ok(dt.timestamp()),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest.timestamp()),
            LocalResult::None => t += chrono::Duration::minutes(15),
        }
    }
    bail!("no valid local time at the start of {}", day)
}

fn to_naive(d: Date) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(d.year(), d.month() as u32, d.day() as u32)
        .with_context(|| format!("date {} out of range", format_iso_date(d)))
}

fn from_naive(d: NaiveDate) -> Result<Date> {
    let month = Month::try_from(d.month() as u8)?;
    Ok(Date::from_calendar_date(d.year(), month, d.day() as u8)?)
}

/// Serde adapter storing a `Date` as "YYYY-MM-DD".
pub mod iso_date_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(d: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_iso_date(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_iso_date(&raw).map_err(|e| de::Error::custom(format!("{:#}", e)))
    }
}
