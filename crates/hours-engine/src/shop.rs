//! The shop's weekly opening hours and the general weekday hours shortcut.
//!
//! A [`ShopAvailability`] holds one [`DayEntry`] per configured day plus the
//! shop-wide [`GeneralHours`]. Every weekday (Mon-Fri) carries an
//! [`HoursMode`]:
//!
//! - [`HoursMode::FollowingGeneral`]: the day's window tracks the general
//!   hours while they are active.
//! - [`HoursMode::Customized`]: the day has been edited directly and no longer
//!   receives general-hours propagation until [`ShopAvailability::reset_day_to_general`].
//!
//! Weekend days never enter this state machine.
//!
//! Opening and closing a day is independent of its mode. Propagation of the
//! general window only ever touches weekdays that are open and not customized.
//! A weekday the owner closed stays closed.
//!
//! All editor operations validate before mutating: on error the record is
//! left exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::day::DayKey;
use crate::error::{Result, ScheduleError};
use crate::window::{TimeOfDay, TimeWindow, WindowField};

/// Whether a weekday follows the general hours or has been customized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursMode {
    #[default]
    FollowingGeneral,
    Customized,
}

/// One day of the weekly record. `window: None` means Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub window: Option<TimeWindow>,
    #[serde(default)]
    pub mode: HoursMode,
}

impl DayEntry {
    pub fn open(window: TimeWindow) -> Self {
        DayEntry {
            window: Some(window),
            mode: HoursMode::FollowingGeneral,
        }
    }

    pub fn closed() -> Self {
        DayEntry {
            window: None,
            mode: HoursMode::FollowingGeneral,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn is_customized(&self) -> bool {
        self.mode == HoursMode::Customized
    }
}

/// The shop-wide weekday window and whether it is currently propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralHours {
    pub window: TimeWindow,
    pub active: bool,
}

impl Default for GeneralHours {
    fn default() -> Self {
        GeneralHours {
            window: TimeWindow::DEFAULT,
            active: true,
        }
    }
}

/// A shop's weekly opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopAvailability {
    #[serde(default)]
    general: GeneralHours,
    #[serde(default)]
    days: BTreeMap<DayKey, DayEntry>,
}

impl Default for ShopAvailability {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopAvailability {
    /// The record a new shop starts with: active general hours of 09:00-17:00
    /// applied to Monday through Friday, and no weekend entries (Closed).
    pub fn new() -> Self {
        let general = GeneralHours::default();
        let days = DayKey::WEEKDAYS
            .into_iter()
            .map(|day| (day, DayEntry::open(general.window)))
            .collect();
        ShopAvailability { general, days }
    }

    pub fn general(&self) -> &GeneralHours {
        &self.general
    }

    /// The stored entry for `day`, if any. A missing entry means Closed.
    pub fn day(&self, day: DayKey) -> Option<&DayEntry> {
        self.days.get(&day)
    }

    /// All stored entries, Monday first.
    pub fn days(&self) -> impl Iterator<Item = (DayKey, &DayEntry)> {
        self.days.iter().map(|(day, entry)| (*day, entry))
    }

    /// Weekdays that have detached from the general hours.
    pub fn customized_days(&self) -> Vec<DayKey> {
        DayKey::WEEKDAYS
            .into_iter()
            .filter(|day| self.is_customized(*day))
            .collect()
    }

    pub fn is_customized(&self, day: DayKey) -> bool {
        day.is_weekday() && self.days.get(&day).is_some_and(DayEntry::is_customized)
    }

    // ── General hours ───────────────────────────────────────────────────

    /// Replace the general weekday window.
    ///
    /// While general hours are active, the new window is written to every open
    /// weekday that is not customized. While inactive, only the general window
    /// itself changes and every day keeps its current hours.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidWindow`] if `window` does not have
    /// `start < end`.
    pub fn set_general_hours(&mut self, window: TimeWindow) -> Result<()> {
        if !window.is_valid() {
            return Err(ScheduleError::InvalidWindow(format!(
                "general hours {window} must start before they end"
            )));
        }
        self.general.window = window;
        if self.general.active {
            self.propagate_general();
        }
        debug!(window = %window, active = self.general.active, "general hours updated");
        Ok(())
    }

    /// Turn general hours propagation on or off.
    ///
    /// Turning it on applies the current general window to every open,
    /// non-customized weekday. Turning it off changes no day: the windows in
    /// effect stay frozen and later [`set_general_hours`](Self::set_general_hours)
    /// calls stop propagating.
    pub fn set_general_hours_active(&mut self, active: bool) {
        let was_active = self.general.active;
        self.general.active = active;
        if active && !was_active {
            self.propagate_general();
        }
        debug!(active, "general hours toggled");
    }

    /// Flip the general hours toggle, returning the new state.
    pub fn toggle_general_hours_active(&mut self) -> bool {
        let active = !self.general.active;
        self.set_general_hours_active(active);
        active
    }

    fn propagate_general(&mut self) {
        let window = self.general.window;
        for day in DayKey::WEEKDAYS {
            if let Some(entry) = self.days.get_mut(&day) {
                if entry.is_open() && !entry.is_customized() {
                    entry.window = Some(window);
                }
            }
        }
    }

    // ── Per-day editing ─────────────────────────────────────────────────

    /// Open a closed day or close an open one, returning whether it is now open.
    ///
    /// A reopened weekday that follows the general hours gets the general
    /// window when general hours are active. Every other reopened day starts
    /// at 09:00-17:00.
    pub fn toggle_day_open(&mut self, day: DayKey) -> bool {
        let general = self.general;
        let entry = self.days.entry(day).or_insert_with(DayEntry::closed);
        if entry.is_open() {
            entry.window = None;
        } else {
            let follows_general = day.is_weekday() && !entry.is_customized() && general.active;
            entry.window = Some(if follows_general {
                general.window
            } else {
                TimeWindow::DEFAULT
            });
        }
        let open = entry.is_open();
        debug!(day = %day, open, "day open state toggled");
        open
    }

    /// Set the start or end of `day`'s window, returning the new window.
    ///
    /// A closed day is opened first, starting from 09:00-17:00. On a weekday
    /// this marks the day [`HoursMode::Customized`], detaching it from general
    /// hours propagation.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidWindow`] if the edit would leave
    /// `start >= end`. The day is not changed.
    pub fn set_day_hours(
        &mut self,
        day: DayKey,
        field: WindowField,
        value: TimeOfDay,
    ) -> Result<TimeWindow> {
        let current = self
            .days
            .get(&day)
            .and_then(|entry| entry.window)
            .unwrap_or(TimeWindow::DEFAULT);
        let window = current.with_field(field, value)?;

        let entry = self.days.entry(day).or_insert_with(DayEntry::closed);
        entry.window = Some(window);
        if day.is_weekday() {
            entry.mode = HoursMode::Customized;
        }
        debug!(day = %day, window = %window, "day hours set");
        Ok(window)
    }

    /// Re-attach a weekday to the general hours and apply the general window now.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotWeekday`] for Saturday and Sunday.
    pub fn reset_day_to_general(&mut self, day: DayKey) -> Result<()> {
        if !day.is_weekday() {
            return Err(ScheduleError::NotWeekday(day));
        }
        let window = self.general.window;
        self.days.insert(day, DayEntry::open(window));
        debug!(day = %day, window = %window, "day reset to general hours");
        Ok(())
    }
}
