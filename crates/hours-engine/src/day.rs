//! Weekday keys used by every weekly schedule record.
//!
//! Stored documents key their weekly maps by lowercase weekday name
//! (`"monday"` .. `"sunday"`). [`DayKey`] is the typed form of those keys and
//! splits into the [`Weekday`](DayKey::is_weekday) subset (Mon-Fri), which
//! follows the shop's general hours, and the weekend (Sat, Sun), which never
//! does.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// One of the seven weekday identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayKey {
    /// All seven days, Monday first.
    pub const ALL: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    /// Monday through Friday.
    pub const WEEKDAYS: [DayKey; 5] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
    ];

    /// Whether this day belongs to the Mon-Fri subset.
    pub fn is_weekday(self) -> bool {
        !matches!(self, DayKey::Saturday | DayKey::Sunday)
    }

    /// The day a calendar date falls on.
    pub fn of_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// The lowercase key used in stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
            DayKey::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayKey {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayKey::Monday,
            Weekday::Tue => DayKey::Tuesday,
            Weekday::Wed => DayKey::Wednesday,
            Weekday::Thu => DayKey::Thursday,
            Weekday::Fri => DayKey::Friday,
            Weekday::Sat => DayKey::Saturday,
            Weekday::Sun => DayKey::Sunday,
        }
    }
}

impl From<DayKey> for Weekday {
    fn from(day: DayKey) -> Self {
        match day {
            DayKey::Monday => Weekday::Mon,
            DayKey::Tuesday => Weekday::Tue,
            DayKey::Wednesday => Weekday::Wed,
            DayKey::Thursday => Weekday::Thu,
            DayKey::Friday => Weekday::Fri,
            DayKey::Saturday => Weekday::Sat,
            DayKey::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; accepts full and abbreviated names.
impl FromStr for DayKey {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(DayKey::Monday),
            "tuesday" | "tue" | "tues" => Ok(DayKey::Tuesday),
            "wednesday" | "wed" => Ok(DayKey::Wednesday),
            "thursday" | "thu" | "thurs" => Ok(DayKey::Thursday),
            "friday" | "fri" => Ok(DayKey::Friday),
            "saturday" | "sat" => Ok(DayKey::Saturday),
            "sunday" | "sun" => Ok(DayKey::Sunday),
            _ => Err(ScheduleError::UnknownDayKey(format!("'{}'", s.trim()))),
        }
    }
}
