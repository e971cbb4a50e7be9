//! Day resolution.
//!
//! Maps an enrollment date and a query date to the 1-based day of the
//! program cycle. Day 1 is the enrollment date itself; after `cycle_length`
//! elapsed days the program restarts at day 1 indefinitely.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Stateless resolver for a fixed cycle length and day boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayResolver {
    cycle_length: u32,
    utc_offset: FixedOffset,
}

impl DayResolver {
    /// Resolver whose calendar days start at UTC midnight
    pub fn new(cycle_length: u32) -> Result<Self> {
        Self::with_offset(cycle_length, Utc.fix())
    }

    /// Resolver whose calendar days start at midnight in `utc_offset`
    pub fn with_offset(cycle_length: u32, utc_offset: FixedOffset) -> Result<Self> {
        if cycle_length == 0 {
            return Err(Error::Configuration(
                "Cycle length must be at least 1 day".into(),
            ));
        }
        Ok(Self {
            cycle_length,
            utc_offset,
        })
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Whole calendar days from enrollment to query, failing if negative
    pub fn elapsed_days(&self, enrolled: NaiveDate, query: NaiveDate) -> Result<i64> {
        let elapsed = (query - enrolled).num_days();
        if elapsed < 0 {
            return Err(Error::InvalidDateRange { enrolled, query });
        }
        Ok(elapsed)
    }

    /// Day in cycle for two calendar dates, in `[1, cycle_length]`
    pub fn resolve(&self, enrolled: NaiveDate, query: NaiveDate) -> Result<u32> {
        let elapsed = self.elapsed_days(enrolled, query)?;
        let day = (elapsed % self.cycle_length as i64) as u32 + 1;
        tracing::debug!(
            "Resolved {} -> {}: {} elapsed days, day {}",
            enrolled,
            query,
            elapsed,
            day
        );
        Ok(day)
    }

    /// Day in cycle for two timestamps.
    ///
    /// Both are normalized to calendar dates in the resolver's offset before
    /// counting, so time of day never affects the result.
    pub fn resolve_at(&self, enrolled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<u32> {
        self.resolve(self.calendar_date(enrolled_at), self.calendar_date(now))
    }

    /// Calendar date of a timestamp at this resolver's day boundary
    pub fn calendar_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset).date_naive()
    }

    /// Number of full cycles completed before the query date.
    ///
    /// Zero during the first pass; a wrapped day 1 reports one or more.
    pub fn cycles_completed(&self, enrolled: NaiveDate, query: NaiveDate) -> Result<u32> {
        let elapsed = self.elapsed_days(enrolled, query)?;
        Ok((elapsed / self.cycle_length as i64) as u32)
    }
}
