//! Authoritative per-date availability for a shop and, optionally, one employee.
//!
//! [`AvailabilityResolver`] composes the injected records into a single
//! [`ResolvedAvailability`]. It is a pure function of its inputs: no I/O, no
//! cache, no interior state, so repeated calls with unchanged records give
//! identical answers.
//!
//! # Resolution order
//!
//! For the shop, the first matching rule wins:
//!
//! 1. An [`ExceptionCalendar`] entry for the exact date ([`Provenance::Exception`]).
//! 2. A customized weekday's stored window ([`Provenance::Customized`]).
//! 3. The general hours, for an open weekday that follows them while general
//!    hours are active ([`Provenance::General`]).
//! 4. The day's stored entry, open or closed ([`Provenance::Explicit`]).
//! 5. Closed ([`Provenance::DefaultClosed`]).
//!
//! With an employee, the shop window is intersected with the employee's
//! representative window for that weekday. A date exception replaces only the
//! shop side; the employee intersection still applies afterwards.
//!
//! # Degraded data
//!
//! Resolution never fails. A stored window with `start >= end`, an employee
//! hour that is not a whole number in 0-23, or an unknown employee id resolves
//! as Closed (or is skipped) and is reported as a [`Diagnostic`] and a `warn!`
//! event. A shop that is already closed keeps its own provenance.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::day::DayKey;
use crate::employee::EmployeeWeeklySchedule;
use crate::exceptions::ExceptionCalendar;
use crate::shop::ShopAvailability;
use crate::window::{TimeOfDay, TimeWindow};

// ── Output types ────────────────────────────────────────────────────────────

/// Which rule produced a resolution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Exception,
    Customized,
    General,
    Explicit,
    DefaultClosed,
}

/// The resolver's answer for one date: an open window or Closed, plus the rule behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedAvailability {
    pub window: Option<TimeWindow>,
    pub provenance: Provenance,
}

impl ResolvedAvailability {
    pub fn open(window: TimeWindow, provenance: Provenance) -> Self {
        ResolvedAvailability {
            window: Some(window),
            provenance,
        }
    }

    pub fn closed(provenance: Provenance) -> Self {
        ResolvedAvailability {
            window: None,
            provenance,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }
}

/// One entry of [`AvailabilityResolver::resolve_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayResolution {
    pub date: NaiveDate,
    pub day: DayKey,
    #[serde(flatten)]
    pub availability: ResolvedAvailability,
}

/// Where an invalid stored window was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    Exception,
    ShopDay,
    GeneralHours,
}

impl fmt::Display for WindowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WindowSource::Exception => "date exception",
            WindowSource::ShopDay => "shop day entry",
            WindowSource::GeneralHours => "general hours",
        })
    }
}

/// A non-fatal problem with stored data met during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A stored window with `start >= end`, treated as Closed.
    InvalidStoredWindow {
        date: NaiveDate,
        source: WindowSource,
        window: TimeWindow,
    },
    /// A stored employee hour that is not a whole number in 0-23, ignored.
    MalformedHour {
        date: NaiveDate,
        employee: String,
        day: DayKey,
        value: Value,
    },
    /// No schedule is known for the requested employee; treated as not working.
    UnknownEmployee { date: NaiveDate, employee: String },
}

impl Diagnostic {
    pub fn date(&self) -> NaiveDate {
        match self {
            Diagnostic::InvalidStoredWindow { date, .. }
            | Diagnostic::MalformedHour { date, .. }
            | Diagnostic::UnknownEmployee { date, .. } => *date,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidStoredWindow {
                date,
                source,
                window,
            } => write!(f, "{source} for {date} has inverted window {window}; treated as closed"),
            Diagnostic::MalformedHour {
                employee,
                day,
                value,
                ..
            } => write!(f, "employee '{employee}' has hour {value} on {day}; ignored"),
            Diagnostic::UnknownEmployee { date, employee } => {
                write!(f, "no schedule for employee '{employee}' on {date}; treated as not working")
            }
        }
    }
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Options for [`AvailabilityResolver`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// The shop's timezone, used to place an instant on a local date and time.
    pub timezone: Tz,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            timezone: chrono_tz::UTC,
        }
    }
}

// ── Employee lookup ─────────────────────────────────────────────────────────

/// Source of employee schedules by id.
pub trait EmployeeDirectory {
    fn schedule(&self, employee_id: &str) -> Option<&EmployeeWeeklySchedule>;
}

impl<S: BuildHasher> EmployeeDirectory for HashMap<String, EmployeeWeeklySchedule, S> {
    fn schedule(&self, employee_id: &str) -> Option<&EmployeeWeeklySchedule> {
        self.get(employee_id)
    }
}

impl EmployeeDirectory for BTreeMap<String, EmployeeWeeklySchedule> {
    fn schedule(&self, employee_id: &str) -> Option<&EmployeeWeeklySchedule> {
        self.get(employee_id)
    }
}

// ── Resolver ────────────────────────────────────────────────────────────────

/// Read-only view over the injected schedule records.
#[derive(Clone)]
pub struct AvailabilityResolver<'a> {
    shop: &'a ShopAvailability,
    exceptions: Option<&'a ExceptionCalendar>,
    employees: Option<&'a dyn EmployeeDirectory>,
    options: ResolveOptions,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(shop: &'a ShopAvailability) -> Self {
        AvailabilityResolver {
            shop,
            exceptions: None,
            employees: None,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_exceptions(mut self, exceptions: &'a ExceptionCalendar) -> Self {
        self.exceptions = Some(exceptions);
        self
    }

    pub fn with_employees(mut self, employees: &'a dyn EmployeeDirectory) -> Self {
        self.employees = Some(employees);
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve `date` for the shop, or for one employee when `employee` is given.
    ///
    /// Problems with stored data are logged with `warn!` and resolve as Closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use hours_engine::{AvailabilityResolver, Provenance, ShopAvailability};
    ///
    /// let shop = ShopAvailability::new();
    /// let resolver = AvailabilityResolver::new(&shop);
    /// // 2026-03-16 is a Monday, 2026-03-14 a Saturday
    /// let monday = resolver.resolve(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(), None);
    /// assert_eq!(monday.window.unwrap().to_string(), "09:00-17:00");
    /// assert_eq!(monday.provenance, Provenance::General);
    ///
    /// let saturday = resolver.resolve(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), None);
    /// assert!(!saturday.is_open());
    /// ```
    pub fn resolve(&self, date: NaiveDate, employee: Option<&str>) -> ResolvedAvailability {
        self.resolve_with_diagnostics(date, employee).0
    }

    /// Like [`resolve`](Self::resolve), also returning every diagnostic raised.
    pub fn resolve_with_diagnostics(
        &self,
        date: NaiveDate,
        employee: Option<&str>,
    ) -> (ResolvedAvailability, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let shop = self.resolve_shop(date, &mut diagnostics);
        let resolved = match employee {
            Some(id) => self.apply_employee(shop, id, date, &mut diagnostics),
            None => shop,
        };
        for diagnostic in &diagnostics {
            warn!(
                date = %diagnostic.date(),
                employee = employee.unwrap_or(""),
                "schedule data degraded during resolution: {diagnostic}"
            );
        }
        (resolved, diagnostics)
    }

    /// Whether the shop is open at all on `date`.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.resolve(date, None).is_open()
    }

    /// Resolve `days` consecutive dates starting at `from`.
    pub fn resolve_range(
        &self,
        from: NaiveDate,
        days: usize,
        employee: Option<&str>,
    ) -> Vec<DayResolution> {
        from.iter_days()
            .take(days)
            .map(|date| DayResolution {
                date,
                day: DayKey::of_date(date),
                availability: self.resolve(date, employee),
            })
            .collect()
    }

    /// Whether `instant` falls inside the resolved window of its shop-local date.
    pub fn is_open_at(&self, instant: DateTime<Utc>, employee: Option<&str>) -> bool {
        let local = instant.with_timezone(&self.options.timezone);
        let time = TimeOfDay::from(local.time());
        self.resolve(local.date_naive(), employee)
            .window
            .is_some_and(|window| window.contains(time))
    }

    fn resolve_shop(
        &self,
        date: NaiveDate,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ResolvedAvailability {
        if let Some(exception) = self.exceptions.and_then(|cal| cal.get(date)) {
            let window = checked(exception, WindowSource::Exception, date, diagnostics);
            return resolved(window, Provenance::Exception);
        }

        let day = DayKey::of_date(date);
        let entry = self.shop.day(day);
        let general = self.shop.general();

        if let Some(entry) = entry.filter(|e| day.is_weekday() && e.is_customized()) {
            let window = checked(entry.window, WindowSource::ShopDay, date, diagnostics);
            return resolved(window, Provenance::Customized);
        }

        if general.active && day.is_weekday() && entry.is_some_and(|e| e.is_open()) {
            let window = checked(
                Some(general.window),
                WindowSource::GeneralHours,
                date,
                diagnostics,
            );
            return resolved(window, Provenance::General);
        }

        match entry {
            Some(entry) => {
                let window = checked(entry.window, WindowSource::ShopDay, date, diagnostics);
                resolved(window, Provenance::Explicit)
            }
            None => ResolvedAvailability::closed(Provenance::DefaultClosed),
        }
    }

    fn apply_employee(
        &self,
        shop: ResolvedAvailability,
        employee: &str,
        date: NaiveDate,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ResolvedAvailability {
        let Some(schedule) = self.employees.and_then(|dir| dir.schedule(employee)) else {
            diagnostics.push(Diagnostic::UnknownEmployee {
                date,
                employee: employee.to_string(),
            });
            return if shop.is_open() {
                ResolvedAvailability::closed(Provenance::DefaultClosed)
            } else {
                shop
            };
        };

        let day = DayKey::of_date(date);
        for value in schedule.malformed_hours(day) {
            diagnostics.push(Diagnostic::MalformedHour {
                date,
                employee: employee.to_string(),
                day,
                value: value.clone(),
            });
        }

        let Some(shop_window) = shop.window else {
            return shop;
        };
        if schedule.has_gaps(day) {
            debug!(
                %date,
                employee,
                day = %day,
                "employee hours have a gap, using covering window"
            );
        }

        schedule
            .representative_window(day)
            .and_then(|staff| shop_window.intersect(&staff))
            .map(|window| ResolvedAvailability::open(window, shop.provenance))
            .unwrap_or(ResolvedAvailability::closed(Provenance::DefaultClosed))
    }
}

/// Pass a stored window through, dropping it with a diagnostic if it is inverted.
fn checked(
    window: Option<TimeWindow>,
    source: WindowSource,
    date: NaiveDate,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<TimeWindow> {
    match window {
        Some(w) if !w.is_valid() => {
            diagnostics.push(Diagnostic::InvalidStoredWindow {
                date,
                source,
                window: w,
            });
            None
        }
        other => other,
    }
}

fn resolved(window: Option<TimeWindow>, provenance: Provenance) -> ResolvedAvailability {
    ResolvedAvailability { window, provenance }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::HourPreset;
    use crate::window::WindowField;
    use chrono::TimeZone;

    fn w(start: u8, end: u8) -> TimeWindow {
        TimeWindow::from_hours(start, end).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    // Week of 2026-03-16: Monday 16th through Sunday 22nd.
    const MONDAY: &str = "2026-03-16";
    const TUESDAY: &str = "2026-03-17";
    const WEDNESDAY: &str = "2026-03-18";
    const SATURDAY: &str = "2026-03-21";

    fn employees(
        id: &str,
        schedule: EmployeeWeeklySchedule,
    ) -> HashMap<String, EmployeeWeeklySchedule> {
        HashMap::from([(id.to_string(), schedule)])
    }

    // ── Shop-level order ────────────────────────────────────────────────

    #[test]
    fn test_scenario_a_customized_monday() {
        let mut shop = ShopAvailability::new();
        shop.set_day_hours(DayKey::Monday, WindowField::Start, t("10:00"))
            .unwrap();
        shop.set_day_hours(DayKey::Monday, WindowField::End, t("18:00"))
            .unwrap();
        let resolver = AvailabilityResolver::new(&shop);

        let monday = resolver.resolve(d(MONDAY), None);
        assert_eq!(monday, ResolvedAvailability::open(w(10, 18), Provenance::Customized));

        let tuesday = resolver.resolve(d(TUESDAY), None);
        assert_eq!(tuesday, ResolvedAvailability::open(w(9, 17), Provenance::General));
    }

    #[test]
    fn test_scenario_b_exception_closes_thursday() {
        let shop = ShopAvailability::new();
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_closed(d("2025-12-25"));
        let resolver = AvailabilityResolver::new(&shop).with_exceptions(&exceptions);

        let christmas = resolver.resolve(d("2025-12-25"), None);
        assert_eq!(christmas, ResolvedAvailability::closed(Provenance::Exception));
        assert!(!resolver.is_open_on(d("2025-12-25")));
        // The Thursday before is unaffected.
        assert!(resolver.is_open_on(d("2025-12-18")));
    }

    #[test]
    fn test_exception_window_beats_customized_day() {
        let mut shop = ShopAvailability::new();
        shop.set_day_hours(DayKey::Monday, WindowField::End, t("20:00"))
            .unwrap();
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_window(d(MONDAY), w(10, 12)).unwrap();
        let resolver = AvailabilityResolver::new(&shop).with_exceptions(&exceptions);
        assert_eq!(
            resolver.resolve(d(MONDAY), None),
            ResolvedAvailability::open(w(10, 12), Provenance::Exception)
        );
    }

    #[test]
    fn test_exception_opens_weekend() {
        let shop = ShopAvailability::new();
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_window(d(SATURDAY), w(10, 14)).unwrap();
        let resolver = AvailabilityResolver::new(&shop).with_exceptions(&exceptions);
        assert_eq!(
            resolver.resolve(d(SATURDAY), None),
            ResolvedAvailability::open(w(10, 14), Provenance::Exception)
        );
    }

    #[test]
    fn test_scenario_d_saturday_default_closed() {
        let shop = ShopAvailability::new();
        let resolver = AvailabilityResolver::new(&shop);
        assert_eq!(
            resolver.resolve(d(SATURDAY), None),
            ResolvedAvailability::closed(Provenance::DefaultClosed)
        );
    }

    #[test]
    fn test_explicit_weekend_entry() {
        let mut shop = ShopAvailability::new();
        shop.set_day_hours(DayKey::Saturday, WindowField::End, t("13:00"))
            .unwrap();
        let resolver = AvailabilityResolver::new(&shop);
        assert_eq!(
            resolver.resolve(d(SATURDAY), None),
            ResolvedAvailability::open(w(9, 13), Provenance::Explicit)
        );
    }

    #[test]
    fn test_general_inactive_uses_frozen_explicit_windows() {
        let mut shop = ShopAvailability::new();
        shop.set_general_hours_active(false);
        shop.set_general_hours(w(6, 8)).unwrap();
        let resolver = AvailabilityResolver::new(&shop);
        assert_eq!(
            resolver.resolve(d(TUESDAY), None),
            ResolvedAvailability::open(w(9, 17), Provenance::Explicit)
        );
    }

    #[test]
    fn test_closed_following_weekday_is_explicitly_closed() {
        let mut shop = ShopAvailability::new();
        shop.toggle_day_open(DayKey::Wednesday);
        let resolver = AvailabilityResolver::new(&shop);
        assert_eq!(
            resolver.resolve(d(WEDNESDAY), None),
            ResolvedAvailability::closed(Provenance::Explicit)
        );
    }

    #[test]
    fn test_general_window_wins_over_stale_stored_window() {
        // A following weekday whose stored window lags behind the general hours
        // still resolves to the general window.
        let shop: ShopAvailability = serde_json::from_value(serde_json::json!({
            "general": { "window": { "start": "08:00", "end": "12:00" }, "active": true },
            "days": { "tuesday": { "window": { "start": "09:00", "end": "17:00" } } }
        }))
        .unwrap();
        let resolver = AvailabilityResolver::new(&shop);
        assert_eq!(
            resolver.resolve(d(TUESDAY), None),
            ResolvedAvailability::open(w(8, 12), Provenance::General)
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let shop = ShopAvailability::new();
        let resolver = AvailabilityResolver::new(&shop);
        let first = resolver.resolve(d(MONDAY), None);
        let second = resolver.resolve(d(MONDAY), None);
        assert_eq!(first, second);
    }

    // ── Degraded data ───────────────────────────────────────────────────

    #[test]
    fn test_inverted_stored_window_degrades_to_closed() {
        let shop: ShopAvailability = serde_json::from_value(serde_json::json!({
            "general": { "window": { "start": "09:00", "end": "17:00" }, "active": true },
            "days": {
                "monday": { "window": { "start": "18:00", "end": "10:00" }, "mode": "customized" }
            }
        }))
        .unwrap();
        let resolver = AvailabilityResolver::new(&shop);
        let (result, diagnostics) = resolver.resolve_with_diagnostics(d(MONDAY), None);
        assert_eq!(result, ResolvedAvailability::closed(Provenance::Customized));
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::InvalidStoredWindow {
                source: WindowSource::ShopDay,
                ..
            }
        ));
        assert!(diagnostics[0].to_string().contains("18:00-10:00"));
    }

    #[test]
    fn test_inverted_general_window_degrades_to_closed() {
        let shop: ShopAvailability = serde_json::from_value(serde_json::json!({
            "general": { "window": { "start": "17:00", "end": "09:00" }, "active": true },
            "days": { "monday": { "window": { "start": "09:00", "end": "17:00" } } }
        }))
        .unwrap();
        let (result, diagnostics) =
            AvailabilityResolver::new(&shop).resolve_with_diagnostics(d(MONDAY), None);
        assert_eq!(result, ResolvedAvailability::closed(Provenance::General));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_inverted_exception_degrades_to_closed() {
        let shop = ShopAvailability::new();
        let exceptions: ExceptionCalendar = serde_json::from_value(serde_json::json!({
            "2026-03-16": { "start": "12:00", "end": "12:00" }
        }))
        .unwrap();
        let (result, diagnostics) = AvailabilityResolver::new(&shop)
            .with_exceptions(&exceptions)
            .resolve_with_diagnostics(d(MONDAY), None);
        assert_eq!(result, ResolvedAvailability::closed(Provenance::Exception));
        assert_eq!(diagnostics[0].date(), d(MONDAY));
    }

    #[test]
    fn test_clean_data_has_no_diagnostics() {
        let shop = ShopAvailability::new();
        let (_, diagnostics) =
            AvailabilityResolver::new(&shop).resolve_with_diagnostics(d(MONDAY), None);
        assert!(diagnostics.is_empty());
    }

    // ── Employee intersection ───────────────────────────────────────────

    #[test]
    fn test_scenario_e_intersection() {
        let shop = ShopAvailability::new();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.set_day_range(DayKey::Tuesday, 13, 20).unwrap();
        let staff = employees("ana", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);

        assert_eq!(
            resolver.resolve(d(TUESDAY), Some("ana")),
            ResolvedAvailability::open(w(13, 17), Provenance::General)
        );
    }

    #[test]
    fn test_scenario_c_gap_is_collapsed_in_resolution() {
        let mut shop = ShopAvailability::new();
        shop.set_day_hours(DayKey::Wednesday, WindowField::End, t("20:00"))
            .unwrap();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.set_hours(DayKey::Wednesday, [9, 10, 11, 15, 16]).unwrap();
        let staff = employees("ben", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);

        assert_eq!(
            resolver.resolve(d(WEDNESDAY), Some("ben")),
            ResolvedAvailability::open(w(9, 17), Provenance::Customized)
        );
    }

    #[test]
    fn test_employee_not_working_is_default_closed() {
        let shop = ShopAvailability::new();
        let staff = employees("cam", EmployeeWeeklySchedule::new());
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        assert_eq!(
            resolver.resolve(d(MONDAY), Some("cam")),
            ResolvedAvailability::closed(Provenance::DefaultClosed)
        );
    }

    #[test]
    fn test_shop_closed_provenance_is_inherited() {
        let shop = ShopAvailability::new();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.apply_preset(DayKey::Saturday, HourPreset::FullDay);
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_closed(d(MONDAY));
        schedule.apply_preset(DayKey::Monday, HourPreset::FullDay);
        let staff = employees("dee", schedule);
        let resolver = AvailabilityResolver::new(&shop)
            .with_exceptions(&exceptions)
            .with_employees(&staff);

        assert_eq!(
            resolver.resolve(d(SATURDAY), Some("dee")),
            ResolvedAvailability::closed(Provenance::DefaultClosed)
        );
        assert_eq!(
            resolver.resolve(d(MONDAY), Some("dee")),
            ResolvedAvailability::closed(Provenance::Exception)
        );
    }

    #[test]
    fn test_disjoint_windows_are_default_closed() {
        let shop = ShopAvailability::new();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.apply_preset(DayKey::Monday, HourPreset::Evening);
        let staff = employees("eli", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        assert_eq!(
            resolver.resolve(d(MONDAY), Some("eli")),
            ResolvedAvailability::closed(Provenance::DefaultClosed)
        );
    }

    #[test]
    fn test_exception_still_intersects_with_employee() {
        let shop = ShopAvailability::new();
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_window(d(SATURDAY), w(10, 16)).unwrap();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.apply_preset(DayKey::Saturday, HourPreset::Afternoon);
        let staff = employees("fay", schedule);
        let resolver = AvailabilityResolver::new(&shop)
            .with_exceptions(&exceptions)
            .with_employees(&staff);
        assert_eq!(
            resolver.resolve(d(SATURDAY), Some("fay")),
            ResolvedAvailability::open(w(13, 16), Provenance::Exception)
        );
    }

    #[test]
    fn test_unknown_employee_reports_diagnostic() {
        let shop = ShopAvailability::new();
        let staff: BTreeMap<String, EmployeeWeeklySchedule> = BTreeMap::new();
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        let (result, diagnostics) = resolver.resolve_with_diagnostics(d(MONDAY), Some("ghost"));
        assert_eq!(result, ResolvedAvailability::closed(Provenance::DefaultClosed));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnknownEmployee {
                date: d(MONDAY),
                employee: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_employee_hour_is_skipped_with_diagnostic() {
        let shop = ShopAvailability::new();
        let schedule: EmployeeWeeklySchedule =
            serde_json::from_value(serde_json::json!({ "monday": [10, 11, 99] })).unwrap();
        let staff = employees("hal", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        let (result, diagnostics) = resolver.resolve_with_diagnostics(d(MONDAY), Some("hal"));
        assert_eq!(result, ResolvedAvailability::open(w(10, 12), Provenance::General));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MalformedHour {
                date: d(MONDAY),
                employee: "hal".to_string(),
                day: DayKey::Monday,
                value: serde_json::json!(99),
            }]
        );
        assert_eq!(
            diagnostics[0].to_string(),
            "employee 'hal' has hour 99 on monday; ignored"
        );
    }

    #[test]
    fn test_malformed_hours_reported_when_shop_is_closed() {
        let shop = ShopAvailability::new();
        let schedule: EmployeeWeeklySchedule =
            serde_json::from_value(serde_json::json!({ "saturday": [10, 10.5, -1] })).unwrap();
        let staff = employees("ivy", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        let (result, diagnostics) = resolver.resolve_with_diagnostics(d(SATURDAY), Some("ivy"));
        assert_eq!(result, ResolvedAvailability::closed(Provenance::DefaultClosed));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|diag| matches!(diag, Diagnostic::MalformedHour { .. })));
    }

    #[test]
    fn test_unknown_employee_on_closed_date_keeps_shop_provenance() {
        let shop = ShopAvailability::new();
        let mut exceptions = ExceptionCalendar::new();
        exceptions.set_closed(d(MONDAY));
        let staff: BTreeMap<String, EmployeeWeeklySchedule> = BTreeMap::new();
        let resolver = AvailabilityResolver::new(&shop)
            .with_exceptions(&exceptions)
            .with_employees(&staff);
        let (result, diagnostics) = resolver.resolve_with_diagnostics(d(MONDAY), Some("ghost"));
        assert_eq!(result, ResolvedAvailability::closed(Provenance::Exception));
        assert!(matches!(diagnostics[..], [Diagnostic::UnknownEmployee { .. }]));
    }

    // ── Range and instant queries ───────────────────────────────────────

    #[test]
    fn test_resolve_range_covers_week() {
        let shop = ShopAvailability::new();
        let week = AvailabilityResolver::new(&shop).resolve_range(d(MONDAY), 7, None);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, DayKey::Monday);
        assert_eq!(week[6].date, d("2026-03-22"));
        let open: Vec<bool> = week.iter().map(|r| r.availability.is_open()).collect();
        assert_eq!(open, vec![true, true, true, true, true, false, false]);
    }

    #[test]
    fn test_is_open_at_uses_shop_timezone() {
        let shop = ShopAvailability::new();
        let resolver = AvailabilityResolver::new(&shop).with_options(ResolveOptions {
            timezone: chrono_tz::America::New_York,
        });
        // 2026-03-16 is EDT (UTC-4): 13:30 UTC = 09:30 local, Monday.
        let instant = Utc.with_ymd_and_hms(2026, 3, 16, 13, 30, 0).unwrap();
        assert!(resolver.is_open_at(instant, None));
        // 21:00 UTC = 17:00 local, the closing minute is excluded.
        let instant = Utc.with_ymd_and_hms(2026, 3, 16, 21, 0, 0).unwrap();
        assert!(!resolver.is_open_at(instant, None));
        // 02:00 UTC Tuesday = 22:00 Monday local.
        let instant = Utc.with_ymd_and_hms(2026, 3, 17, 2, 0, 0).unwrap();
        assert!(!resolver.is_open_at(instant, None));
    }

    #[test]
    fn test_is_open_at_for_employee() {
        let shop = ShopAvailability::new();
        let mut schedule = EmployeeWeeklySchedule::new();
        schedule.apply_preset(DayKey::Monday, HourPreset::Afternoon);
        let staff = employees("ivy", schedule);
        let resolver = AvailabilityResolver::new(&shop).with_employees(&staff);
        let morning = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2026, 3, 16, 14, 0, 0).unwrap();
        assert!(!resolver.is_open_at(morning, Some("ivy")));
        assert!(resolver.is_open_at(afternoon, Some("ivy")));
        assert!(resolver.is_open_at(morning, None));
    }

    #[test]
    fn test_provenance_serializes_snake_case() {
        let json = serde_json::to_value(ResolvedAvailability::closed(Provenance::DefaultClosed))
            .unwrap();
        assert_eq!(json, serde_json::json!({ "window": null, "provenance": "default_closed" }));
    }
}
