//! # hours-engine
//!
//! Deterministic opening-hours resolution for small-business booking.
//!
//! The engine turns a shop's weekly hours, its general weekday hours shortcut,
//! per-employee weekly work schedules, and sparse date exceptions into one
//! authoritative answer to "is the shop (or this employee) open on this date,
//! and during which window". Slot generation consumes that answer and lives
//! outside this crate.
//!
//! ## Modules
//!
//! - [`day`] — Weekday keys and the Mon-Fri / weekend split
//! - [`window`] — Times of day and half-open opening windows
//! - [`shop`] — Shop weekly hours editor with general-hours propagation
//! - [`employee`] — Employee weekly hour-set editor and window derivation
//! - [`exceptions`] — Date-specific overrides
//! - [`resolver`] — Precedence rules composing all of the above per date
//! - [`document`] — Strict decoding of stored JSON documents
//! - [`error`] — Error types

pub mod day;
pub mod document;
pub mod employee;
pub mod error;
pub mod exceptions;
pub mod resolver;
pub mod shop;
pub mod window;

pub use day::DayKey;
pub use document::{
    employee_schedule_from_value, exceptions_from_value, shop_availability_from_value,
};
pub use employee::{EmployeeWeeklySchedule, HourPreset};
pub use error::ScheduleError;
pub use exceptions::{parse_iso_date, ExceptionCalendar};
pub use resolver::{
    AvailabilityResolver, DayResolution, Diagnostic, EmployeeDirectory, Provenance,
    ResolveOptions, ResolvedAvailability, WindowSource,
};
pub use shop::{DayEntry, GeneralHours, HoursMode, ShopAvailability};
pub use window::{TimeOfDay, TimeWindow, WindowField, DEFAULT_CLOSE, DEFAULT_OPEN};
