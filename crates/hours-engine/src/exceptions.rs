//! Date-specific overrides of the weekly hours (holidays, special openings).
//!
//! Entries are sparse and keyed by ISO calendar date. An entry of `None` marks
//! the date Closed; `Some(window)` opens it for exactly that window. Whenever a
//! date has an entry, it takes precedence over every recurring rule.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::window::TimeWindow;

/// Sparse date → window-or-Closed overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionCalendar {
    dates: BTreeMap<NaiveDate, Option<TimeWindow>>,
}

impl ExceptionCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The override for `date`: `None` if there is no entry,
    /// `Some(None)` if the date is explicitly closed.
    pub fn get(&self, date: NaiveDate) -> Option<Option<TimeWindow>> {
        self.dates.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains_key(&date)
    }

    pub fn set_closed(&mut self, date: NaiveDate) {
        self.dates.insert(date, None);
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidWindow`] if `window` does not have `start < end`.
    pub fn set_window(&mut self, date: NaiveDate, window: TimeWindow) -> Result<()> {
        if !window.is_valid() {
            return Err(ScheduleError::InvalidWindow(format!(
                "exception on {date}: {window} must start before it ends"
            )));
        }
        self.dates.insert(date, Some(window));
        Ok(())
    }

    /// Insert an entry keyed by an ISO `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDate`] for an unparseable date, or
    /// [`ScheduleError::InvalidWindow`] for an inverted window.
    pub fn insert_iso(&mut self, date: &str, window: Option<TimeWindow>) -> Result<()> {
        let date = parse_iso_date(date)?;
        match window {
            Some(window) => self.set_window(date, window),
            None => {
                self.set_closed(date);
                Ok(())
            }
        }
    }

    /// Remove the override for `date`, returning it if there was one.
    pub fn remove(&mut self, date: NaiveDate) -> Option<Option<TimeWindow>> {
        self.dates.remove(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<TimeWindow>)> + '_ {
        self.dates.iter().map(|(date, window)| (*date, *window))
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| ScheduleError::InvalidDate(format!("'{}': {}", s.trim(), e)))
}
