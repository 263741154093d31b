//! Calculation period with inclusive calendar bounds.
//!
//! A period covers every instant from `start 00:00:00` through the last instant
//! of `end`. Monthly periods are the common case.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodWire")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct PeriodWire {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodWire> for Period {
    type Error = CoreError;
    fn try_from(w: PeriodWire) -> Result<Self, Self::Error> {
        Period::new(w.start, w.end)
    }
}

impl Period {
    /// Build `[start, end]`; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidPeriod(format!("{start} is after {end}")));
        }
        Ok(Period { start, end })
    }

    /// The whole calendar month `year-month`.
    pub fn month(year: i32, month: u32) -> Result<Self, CoreError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::InvalidPeriod(format!("{year}-{month:02}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| CoreError::InvalidPeriod(format!("{year}-{month:02}")))?;
        let end = next
            .pred_opt()
            .ok_or_else(|| CoreError::InvalidPeriod(format!("{year}-{month:02}")))?;
        Ok(Period { start, end })
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[inline]
    pub fn contains_date(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    /// Inclusive on both ends: any time on the last day is inside.
    #[inline]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.contains_date(ts.date())
    }

    /// Number of calendar days, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
