//! Business calendar
//!
//! The canteen runs on a fixed UTC+05:30 day boundary. "Today" for the
//! wallet's daily collection and the first day of a forecast are both
//! computed here so that server locale never leaks into either.

use crate::ModelError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};

/// Default offset: UTC+05:30
pub const IST_OFFSET_MINUTES: i32 = 330;

/// Fixed-offset calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Create calendar with an offset in minutes east of UTC
    pub fn new(offset_minutes: i32) -> Result<Self, ModelError> {
        let offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or(ModelError::InvalidOffset(offset_minutes))?;
        Ok(Self { offset })
    }

    /// UTC+05:30 calendar
    pub fn ist() -> Self {
        let offset = FixedOffset::east_opt(IST_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    /// Offset in minutes east of UTC
    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Local wall-clock time
    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Local calendar date of an instant
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date_naive()
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::ist()
    }
}

/// Weekday index, Monday = 0 .. Sunday = 6
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

/// Weekday of a date as its index
pub fn date_weekday_index(date: NaiveDate) -> u8 {
    weekday_index(date.weekday())
}
