//! Excel fractional date/time conversion
//!
//! Excel stores instants as a double whose integer part counts days since
//! the 1899-12-30 UTC epoch and whose decimal part is the fraction of the
//! day. The epoch preserves Excel's historical off-by-one: 1.0 maps to
//! 1899-12-31 and 61.0 to 1900-03-01, with the fictional 1900-02-29
//! swallowed in between.

use crate::error::{Error, Result};
use chrono::format::{parse as parse_items, Parsed, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

const ROUND_EPSILON: f64 = 1e-9;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Convert an Excel fractional datetime to the corresponding UTC instant,
/// truncated to whole seconds.
pub fn from_excel(n: f64) -> DateTime<Utc> {
    let days = n.trunc();
    let date = epoch() + Duration::days(days as i64);

    let fraction = n - days + ROUND_EPSILON;
    let (hour, minute, second, _) = from_excel_time_of_day(fraction);
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, second).unwrap())
}

/// Decompose a fraction of a day into (hour, minute, second, nanosecond),
/// with the nanosecond rounded to the nearest microsecond.
fn from_excel_time_of_day(fraction: f64) -> (u32, u32, u32, u32) {
    // Half a microsecond guards against fractions landing just below a
    // whole second.
    let nanos_of_day = (NANOS_PER_DAY as f64 * fraction + NANOS_PER_MICRO as f64 / 2.0) as i64;
    let nanosecond = ((nanos_of_day % NANOS_PER_SEC) / NANOS_PER_MICRO) * NANOS_PER_MICRO;
    let second = (nanos_of_day / NANOS_PER_SEC) % 60;
    let minute = (nanos_of_day / NANOS_PER_MINUTE) % 60;
    let hour = (nanos_of_day / NANOS_PER_HOUR) % 24;
    (hour as u32, minute as u32, second as u32, nanosecond as u32)
}

/// Convert an instant to its Excel fractional datetime, rounded to 15
/// decimal places.
pub fn to_excel<Tz: TimeZone>(tm: DateTime<Tz>) -> f64 {
    let tm = tm.with_timezone(&Utc);

    let day_fraction = to_excel_date(tm.date_naive());
    let time_fraction =
        to_excel_time_of_day(tm.hour(), tm.minute(), tm.second(), tm.nanosecond());

    round_to(day_fraction + time_fraction, 15)
}

fn to_excel_date(date: NaiveDate) -> f64 {
    (date - epoch()).num_days() as f64
}

fn to_excel_time_of_day(hour: u32, minute: u32, second: u32, nanosecond: u32) -> f64 {
    let nanos = hour as i64 * NANOS_PER_HOUR
        + minute as i64 * NANOS_PER_MINUTE
        + second as i64 * NANOS_PER_SEC
        + nanosecond as i64;
    round_to(nanos as f64 / NANOS_PER_DAY as f64, 15)
}

fn round_to(val: f64, precision: i32) -> f64 {
    let ratio = 10_f64.powi(precision);
    (val * ratio).round() / ratio
}

/// Parse a string as a time, trying each supported layout in order
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    for layout in SUPPORTED_TIME_LAYOUTS {
        if let Some(tm) = layout.parse(s) {
            return Ok(tm);
        }
    }

    Err(Error::InvalidTime(s.to_string()))
}

enum Layout {
    Rfc3339,
    DateAndTime(&'static str),
    DateOnly(&'static str),
    ClockOnly(&'static str),
    MonthYear(&'static str),
}

/// Layouts accepted by [`parse_time`], in the order they are tried.
///
/// The two-digit-year form is tried before the four-digit one: chrono's %Y
/// also accepts short years, so the order decides how "12/31/24" reads.
const SUPPORTED_TIME_LAYOUTS: &[Layout] = &[
    Layout::Rfc3339,
    Layout::DateOnly("%Y-%m-%d"),
    Layout::DateAndTime("%Y-%m-%d %H:%M:%S"),
    Layout::DateAndTime("%a %b %e %H:%M:%S UTC %Y"),
    Layout::ClockOnly("%I:%M%p"),
    Layout::DateOnly("%Y/%m/%d"),
    Layout::DateOnly("%m/%d/%y"),
    Layout::DateOnly("%m/%d/%Y"),
    Layout::MonthYear("%m/%y"),
];

impl Layout {
    fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        let naive = match self {
            Layout::Rfc3339 => {
                return DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|tm| tm.with_timezone(&Utc));
            }
            Layout::DateAndTime(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok()?,
            Layout::DateOnly(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()?
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            Layout::ClockOnly(fmt) => {
                let time = NaiveTime::parse_from_str(s, fmt).ok()?;
                NaiveDateTime::new(NaiveDate::from_ymd_opt(0, 1, 1).unwrap(), time)
            }
            Layout::MonthYear(fmt) => {
                let mut parsed = Parsed::new();
                parse_items(&mut parsed, s, StrftimeItems::new(fmt)).ok()?;
                parsed.set_day(1).ok()?;
                parsed.to_naive_date().ok()?.and_hms_opt(0, 0, 0).unwrap()
            }
        };

        Some(Utc.from_utc_datetime(&naive))
    }
}
