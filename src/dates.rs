//! Free-form publication date parsing.
//!
//! Sources hand out dates in whatever shape the cataloguer typed: a bare year,
//! a year and month, a full ISO date, occasionally an RFC 2822 stamp or an
//! English "15 June 2021". Everything is resolved to epoch milliseconds in
//! UTC; dates without an explicit offset are taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:-(\d{1,2})(?:-(\d{1,2}))?)?$").unwrap());

static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[T ](\d{2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?\s*(Z|z|[+-]\d{2}:?\d{2})?$",
    )
    .unwrap()
});

/// Day-first, month-first and slash layouts tried after the ISO forms.
const NAMED_FORMATS: &[&str] = &["%d %B %Y", "%B %d, %Y", "%B %d %Y", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a free-form date into epoch milliseconds.
///
/// Returns `None` when the text matches none of the accepted layouts or names
/// a day that does not exist.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_iso_date(s)
        .or_else(|| parse_iso_datetime(s))
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc)))
        .or_else(|| parse_named(s))
        .map(|dt| dt.timestamp_millis())
}

/// Render epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn to_iso(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_DATE_RE.captures(s)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2).map_or(Some(1), |m| m.as_str().parse().ok())?;
    let day: u32 = caps.get(3).map_or(Some(1), |m| m.as_str().parse().ok())?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_DATETIME_RE.captures(s)?;
    let num = |i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    let date = NaiveDate::from_ymd_opt(caps.get(1)?.as_str().parse().ok()?, num(2)?, num(3)?)?;
    let nanos = match caps.get(7) {
        Some(frac) => format!("{:0<9}", frac.as_str()).parse().ok()?,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(num(4)?, num(5)?, num(6).unwrap_or(0), nanos)?;
    let naive = NaiveDateTime::new(date, time);

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") | Some("z") => FixedOffset::east_opt(0)?,
        Some(tz) => parse_offset(tz)?,
    };
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let digits: String = tz[1..].chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_named(s: &str) -> Option<DateTime<Utc>> {
    let date = NAMED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        // "June 2021" names a month; pin it to the first.
        .or_else(|| NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y").ok())?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
