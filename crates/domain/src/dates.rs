//! Values derived from ISO dates: pet age, vaccination due dates

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};

const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid ISO date: {0:?}")]
    Invalid(String),

    #[error("date out of range: {0}")]
    OutOfRange(String),
}

/// Parse an ISO 8601 date or date-time.
///
/// A bare calendar date resolves to local midnight; a date-time with an offset
/// is converted to local time.
pub fn parse_iso(input: &str) -> Result<NaiveDateTime, DateError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| DateError::Invalid(input.to_string()))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Whole years and leftover whole months
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Age {
    pub years: u32,
    pub months: u32,
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} yrs, {} mos", self.years, self.months)
    }
}

/// Age of a pet born on `dob`, as of the system clock.
pub fn calculate_age(dob: &str) -> Age {
    calculate_age_at(dob, SystemClock.now())
}

/// Age of a pet born on `dob`, as of `now`.
///
/// Unparseable input and birth dates after `now` both yield a zero age.
pub fn calculate_age_at(dob: &str, now: NaiveDateTime) -> Age {
    let born = match parse_iso(dob) {
        Ok(born) => born,
        Err(_) => return Age::default(),
    };
    if born > now {
        return Age::default();
    }
    let months = whole_months_between(born, now);
    Age {
        years: months / 12,
        months: months % 12,
    }
}

/// Calendar months from `earlier` to `later`; a month only counts once its
/// day and time of day have been reached. Requires `earlier <= later`.
fn whole_months_between(earlier: NaiveDateTime, later: NaiveDateTime) -> u32 {
    let mut months =
        (later.year() - earlier.year()) * 12 + later.month() as i32 - earlier.month() as i32;
    if (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months.max(0) as u32
}

/// The administered date advanced by exactly one calendar year.
///
/// A 29 February administration falls due on 28 February.
pub fn compute_due_date(administered: &str) -> Result<String, DateError> {
    let date = parse_iso(administered)?.date();
    date.checked_add_months(Months::new(12))
        .map(format_iso)
        .ok_or_else(|| DateError::OutOfRange(administered.to_string()))
}

pub fn is_date_in_future(date: &str) -> bool {
    is_date_in_future_at(date, SystemClock.now())
}

/// True iff `date` parses and lies strictly after `now`.
pub fn is_date_in_future_at(date: &str, now: NaiveDateTime) -> bool {
    parse_iso(date).map_or(false, |parsed| parsed > now)
}

/// Whole days from `now` until `date`, truncated toward zero.
pub fn days_until_at(date: &str, now: NaiveDateTime) -> Option<i64> {
    parse_iso(date).ok().map(|parsed| (parsed - now).num_days())
}
