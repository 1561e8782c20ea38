//! UTC calendar ranges.
//!
//! Ranges are half-open (`start <= t < end`) and expressed both as
//! [`DateTime<Utc>`] bounds and in the storage encoding so the database
//! layer can bind them directly.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::timestamp::to_storage;

/// Highest year whose successor still fits the four-digit storage encoding.
const MAX_QUERY_YEAR: i32 = 9998;

/// Errors that can occur when building a calendar range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The requested year cannot be represented in storage.
    #[error("year {0} is outside 0..=9998")]
    YearOutOfRange(i32),

    /// The date has no successor day.
    #[error("date {0} has no following day")]
    DateOverflow(NaiveDate),
}

/// Half-open UTC range covering one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    year: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl YearRange {
    /// Build the range `[year-01-01T00:00:00Z, (year+1)-01-01T00:00:00Z)`.
    pub fn new(year: i32) -> Result<Self, CalendarError> {
        if !(0..=MAX_QUERY_YEAR).contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        let next = year
            .checked_add(1)
            .ok_or(CalendarError::YearOutOfRange(year))?;
        let start = new_year(year).ok_or(CalendarError::YearOutOfRange(year))?;
        let end = new_year(next).ok_or(CalendarError::YearOutOfRange(year))?;
        Ok(Self { year, start, end })
    }

    /// The range for the current UTC year.
    pub fn current() -> Result<Self, CalendarError> {
        Self::new(Utc::now().year())
    }

    /// The calendar year this range covers.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Inclusive lower bound.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Lower and upper bounds in the storage encoding.
    pub fn storage_bounds(&self) -> (String, String) {
        (to_storage(self.start), to_storage(self.end))
    }

    /// Whether `ts` falls inside the range.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

fn new_year(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Half-open UTC range covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayRange {
    /// Build the range `[date T00:00:00Z, date+1 T00:00:00Z)`.
    pub fn new(date: NaiveDate) -> Result<Self, CalendarError> {
        let next = date.succ_opt().ok_or(CalendarError::DateOverflow(date))?;
        let start = midnight(date).ok_or(CalendarError::DateOverflow(date))?;
        let end = midnight(next).ok_or(CalendarError::DateOverflow(date))?;
        Ok(Self { date, start, end })
    }

    /// The day covered.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Lower and upper bounds in the storage encoding.
    pub fn storage_bounds(&self) -> (String, String) {
        (to_storage(self.start), to_storage(self.end))
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Today's date under the UTC day boundary.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
