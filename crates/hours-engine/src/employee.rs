//! Per-employee recurring weekly work patterns.
//!
//! An [`EmployeeWeeklySchedule`] maps each day to a set of hour-of-day blocks
//! (0-23). Hour `h` means "works `h:00` to `(h+1):00`". Storage does not
//! require the set to be contiguous; presets and ranges always produce
//! contiguous sets, while [`EmployeeWeeklySchedule::toggle_hour`] can leave
//! gaps.
//!
//! # Representative window
//!
//! Consumers that need one window per day use
//! [`EmployeeWeeklySchedule::representative_window`], which collapses the set
//! to `[min, max + 1)`. The collapse is lossy: `{9, 10, 11, 15, 16}` becomes
//! `09:00-17:00` and the 12:00-15:00 gap disappears. This is kept so existing
//! stored schedules resolve the same way. [`EmployeeWeeklySchedule::working_blocks`]
//! gives the exact contiguous blocks when the gap matters.
//!
//! # Stored data
//!
//! Deserialization never fails on a bad hour. Entries that are not a whole
//! number in 0-23 (`300`, `-1`, `10.0`, `"9"`) are kept aside per day and
//! surface through [`EmployeeWeeklySchedule::malformed_hours`]; the resolver
//! reports them as diagnostics. Editing a day discards its malformed entries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::day::DayKey;
use crate::error::{Result, ScheduleError};
use crate::window::{TimeOfDay, TimeWindow};

/// Highest valid hour-of-day block.
pub const MAX_HOUR: u8 = 23;

static NO_HOURS: BTreeSet<u8> = BTreeSet::new();

/// Named shift presets, each a contiguous half-open hour range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourPreset {
    /// 09:00-17:00
    FullDay,
    /// 09:00-13:00
    Morning,
    /// 13:00-17:00
    Afternoon,
    /// 17:00-21:00
    Evening,
}

impl HourPreset {
    pub const ALL: [HourPreset; 4] = [
        HourPreset::FullDay,
        HourPreset::Morning,
        HourPreset::Afternoon,
        HourPreset::Evening,
    ];

    /// The hour blocks `[start, end)` this preset covers.
    pub fn hours(self) -> Range<u8> {
        match self {
            HourPreset::FullDay => 9..17,
            HourPreset::Morning => 9..13,
            HourPreset::Afternoon => 13..17,
            HourPreset::Evening => 17..21,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HourPreset::FullDay => "full_day",
            HourPreset::Morning => "morning",
            HourPreset::Afternoon => "afternoon",
            HourPreset::Evening => "evening",
        }
    }
}

impl fmt::Display for HourPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HourPreset {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "fullday" => Ok(HourPreset::FullDay),
            "morning" => Ok(HourPreset::Morning),
            "afternoon" => Ok(HourPreset::Afternoon),
            "evening" => Ok(HourPreset::Evening),
            _ => Err(ScheduleError::MalformedScheduleData(format!(
                "unknown preset '{}'",
                s.trim()
            ))),
        }
    }
}

/// An employee's weekly hour-set per day. An empty or missing set means not working.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeWeeklySchedule {
    /// Valid hours only (0-23).
    days: BTreeMap<DayKey, BTreeSet<u8>>,
    /// Stored entries that could not be read as an hour, as found.
    malformed: BTreeMap<DayKey, Vec<Value>>,
}

impl Serialize for EmployeeWeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.days.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EmployeeWeeklySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let stored = BTreeMap::<DayKey, Value>::deserialize(deserializer)?;
        let mut schedule = EmployeeWeeklySchedule::new();
        for (day, entry) in stored {
            let entries = match entry {
                Value::Null => Vec::new(),
                Value::Array(items) => items,
                other => vec![other],
            };
            let hours = schedule.days.entry(day).or_default();
            for entry in entries {
                match stored_hour(&entry) {
                    Some(hour) => {
                        hours.insert(hour);
                    }
                    None => schedule.malformed.entry(day).or_default().push(entry),
                }
            }
        }
        Ok(schedule)
    }
}

impl EmployeeWeeklySchedule {
    /// An empty schedule: not working on any day.
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw hour-set for `day`, as stored.
    pub fn hours(&self, day: DayKey) -> &BTreeSet<u8> {
        self.days.get(&day).unwrap_or(&NO_HOURS)
    }

    pub fn is_working(&self, day: DayKey) -> bool {
        !self.hours(day).is_empty()
    }

    /// Total hour blocks across the week.
    pub fn total_hours(&self) -> usize {
        self.days.values().map(BTreeSet::len).sum()
    }

    /// Stored entries for `day` that are not an hour in 0-23. Only data read
    /// from storage can have them.
    pub fn malformed_hours(&self, day: DayKey) -> &[Value] {
        self.malformed
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ── Editing ─────────────────────────────────────────────────────────

    /// Replace `day`'s hours with a preset's contiguous range.
    pub fn apply_preset(&mut self, day: DayKey, preset: HourPreset) {
        self.replace_day(day, preset.hours().collect());
        debug!(day = %day, preset = %preset, "preset applied");
    }

    /// Replace `day`'s hours with every block from `start` through `end`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MalformedScheduleData`] if either hour is above 23,
    /// or [`ScheduleError::InvalidWindow`] if `start > end`.
    pub fn set_day_range(&mut self, day: DayKey, start: u8, end: u8) -> Result<()> {
        check_hour(start)?;
        check_hour(end)?;
        if start > end {
            return Err(ScheduleError::InvalidWindow(format!(
                "hour range {start}..={end} on {day} is inverted"
            )));
        }
        self.replace_day(day, (start..=end).collect());
        debug!(day = %day, start, end, "hour range set");
        Ok(())
    }

    /// Replace `day`'s hours with an arbitrary set of blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MalformedScheduleData`] if any hour is above 23.
    pub fn set_hours(&mut self, day: DayKey, hours: impl IntoIterator<Item = u8>) -> Result<()> {
        let hours = hours
            .into_iter()
            .map(|h| check_hour(h).map(|_| h))
            .collect::<Result<BTreeSet<u8>>>()?;
        self.replace_day(day, hours);
        Ok(())
    }

    /// Add or remove a single hour block, returning whether it is now worked.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MalformedScheduleData`] if `hour` is above 23.
    pub fn toggle_hour(&mut self, day: DayKey, hour: u8) -> Result<bool> {
        check_hour(hour)?;
        let set = self.days.entry(day).or_default();
        let working = if set.remove(&hour) {
            false
        } else {
            set.insert(hour);
            true
        };
        debug!(day = %day, hour, working, "hour toggled");
        Ok(working)
    }

    pub fn clear_day(&mut self, day: DayKey) {
        self.days.remove(&day);
        self.malformed.remove(&day);
    }

    pub fn clear_all(&mut self) {
        self.days.clear();
        self.malformed.clear();
    }

    /// Overwrite every day with an independent copy of `source`'s hours.
    pub fn copy_day_to_all(&mut self, source: DayKey) {
        let hours = self.hours(source).clone();
        for day in DayKey::ALL {
            self.replace_day(day, hours.clone());
        }
        debug!(source = %source, hours = hours.len(), "day copied to whole week");
    }

    // ── Derivation ──────────────────────────────────────────────────────

    /// The single window `[min, max + 1)` covering every hour on `day`,
    /// or `None` if the employee does not work that day.
    ///
    /// Gaps inside the set are not represented (see the module docs).
    pub fn representative_window(&self, day: DayKey) -> Option<TimeWindow> {
        let mut hours = self.hours(day).iter().copied();
        let min = hours.next()?;
        let max = hours.next_back().unwrap_or(min);
        hour_block_window(min, max)
    }

    /// The exact contiguous working blocks on `day`, in order.
    pub fn working_blocks(&self, day: DayKey) -> Vec<TimeWindow> {
        let mut blocks = Vec::new();
        let mut run: Option<(u8, u8)> = None;
        for hour in self.hours(day).iter().copied() {
            run = match run {
                Some((start, last)) if hour == last + 1 => Some((start, hour)),
                Some((start, last)) => {
                    blocks.extend(hour_block_window(start, last));
                    Some((hour, hour))
                }
                None => Some((hour, hour)),
            };
        }
        if let Some((start, last)) = run {
            blocks.extend(hour_block_window(start, last));
        }
        blocks
    }

    /// Whether the representative window hides a gap on `day`.
    pub fn has_gaps(&self, day: DayKey) -> bool {
        self.working_blocks(day).len() > 1
    }

    fn replace_day(&mut self, day: DayKey, hours: BTreeSet<u8>) {
        self.days.insert(day, hours);
        self.malformed.remove(&day);
    }
}

/// A stored entry as an hour block, if it is a whole number in 0-23.
fn stored_hour(entry: &Value) -> Option<u8> {
    entry
        .as_u64()
        .and_then(|h| u8::try_from(h).ok())
        .filter(|h| *h <= MAX_HOUR)
}

fn check_hour(hour: u8) -> Result<()> {
    if hour > MAX_HOUR {
        return Err(ScheduleError::MalformedScheduleData(format!(
            "hour {hour} is outside 0-{MAX_HOUR}"
        )));
    }
    Ok(())
}

/// `first:00` to `(last + 1):00`; both hours are already within 0-23.
fn hour_block_window(first: u8, last: u8) -> Option<TimeWindow> {
    let start = TimeOfDay::from_hour(first).ok()?;
    let end = TimeOfDay::from_hour(last + 1).ok()?;
    TimeWindow::new(start, end).ok()
}
