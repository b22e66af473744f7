//! Times of day and half-open opening windows.
//!
//! A [`TimeOfDay`] is a wall-clock minute in `00:00..=24:00`. `24:00` exists
//! so a window can run to the end of the day (an employee working the 23:00
//! block derives `23:00-24:00`). A [`TimeWindow`] is the half-open interval
//! `[start, end)`.
//!
//! Both serialize the way stored documents hold them: times as `"HH:MM"`
//! strings and windows as `{ "start": "09:00", "end": "17:00" }`.
//! Deserialization deliberately does *not* enforce `start < end`: persisted
//! data is taken as-is and checked by the resolver, which degrades invalid
//! windows to Closed instead of failing.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScheduleError};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Opening time used when a day is opened without any other hours to apply.
pub const DEFAULT_OPEN: TimeOfDay = TimeOfDay(9 * 60);
/// Closing time paired with [`DEFAULT_OPEN`].
pub const DEFAULT_CLOSE: TimeOfDay = TimeOfDay(17 * 60);

/// A wall-clock time of day with minute precision, `00:00` through `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// `00:00`.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    /// `24:00`, only meaningful as the end of a window.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from hour and minute. `24:00` is accepted; anything past it is not.
    pub fn hm(hour: u32, minute: u32) -> Result<Self> {
        if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(ScheduleError::InvalidTime(format!(
                "'{hour:02}:{minute:02}' is not a time of day"
            )));
        }
        Ok(TimeOfDay((hour * 60 + minute) as u16))
    }

    /// The start of an hourly block, `hour:00`. Hour 24 yields `24:00`.
    pub fn from_hour(hour: u8) -> Result<Self> {
        Self::hm(u32::from(hour), 0)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }
}

/// Truncates to the minute.
impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        TimeOfDay((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parses `"HH:MM"` (or `"HH:MM:SS"`, seconds dropped), plus the literal `"24:00"`.
impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s == "24:00" {
            return Ok(TimeOfDay::END_OF_DAY);
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(TimeOfDay::from)
            .map_err(|e| ScheduleError::InvalidTime(format!("'{s}': {e}")))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Which end of a window an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowField {
    Start,
    End,
}

/// A half-open opening window `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeWindow {
    /// `09:00-17:00`, the window a newly opened day starts with.
    pub const DEFAULT: TimeWindow = TimeWindow {
        start: DEFAULT_OPEN,
        end: DEFAULT_CLOSE,
    };

    /// Build a window, rejecting `start >= end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        let window = TimeWindow { start, end };
        if !window.is_valid() {
            return Err(ScheduleError::InvalidWindow(format!(
                "start {start} is not before end {end}"
            )));
        }
        Ok(window)
    }

    /// Build a window from two `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    /// Build a window on whole hours, e.g. `from_hours(9, 17)` is `09:00-17:00`.
    pub fn from_hours(start: u8, end: u8) -> Result<Self> {
        Self::new(TimeOfDay::from_hour(start)?, TimeOfDay::from_hour(end)?)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Whether `start < end`. Only windows read from storage can fail this.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open containment: the start minute is inside, the end minute is not.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.start <= t && t < self.end
    }

    /// The overlap of two windows, or `None` when they do not overlap.
    /// Windows that merely touch (`09:00-12:00` and `12:00-17:00`) do not overlap.
    pub fn intersect(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeWindow { start, end })
    }

    /// The same window with one end replaced, validated.
    pub fn with_field(&self, field: WindowField, value: TimeOfDay) -> Result<TimeWindow> {
        match field {
            WindowField::Start => TimeWindow::new(value, self.end),
            WindowField::End => TimeWindow::new(self.start, value),
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.0.saturating_sub(self.start.0))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
