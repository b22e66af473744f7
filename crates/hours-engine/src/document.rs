//! Strict decoding of stored schedule documents.
//!
//! Records arrive from the document store as loosely typed JSON: hours may
//! have been written as floats or strings, and day keys may be misspelled.
//! Plain `serde` deserialization of the record types is lenient about window
//! ordering so the resolver can degrade gracefully. The functions here are
//! the strict path, used when importing or editing: every problem becomes a
//! [`ScheduleError`], and nothing is returned half-decoded.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::day::DayKey;
use crate::employee::{EmployeeWeeklySchedule, MAX_HOUR};
use crate::error::{Result, ScheduleError};
use crate::exceptions::{parse_iso_date, ExceptionCalendar};
use crate::shop::ShopAvailability;
use crate::window::TimeWindow;

/// Decode an employee's `{ "<day>": [hours...] }` document.
///
/// `null` (for the whole document or for one day) means not working.
///
/// # Errors
///
/// - [`ScheduleError::UnknownDayKey`] for a key that is not a weekday name.
/// - [`ScheduleError::MalformedScheduleData`] for a non-integer hour, an hour
///   outside 0-23, or a value of the wrong JSON type.
pub fn employee_schedule_from_value(value: &Value) -> Result<EmployeeWeeklySchedule> {
    let mut schedule = EmployeeWeeklySchedule::new();
    let Some(days) = object_or_null(value, "employee schedule")? else {
        return Ok(schedule);
    };

    for (key, hours) in days {
        let day: DayKey = key.parse()?;
        let hours = match hours {
            Value::Null => BTreeSet::new(),
            Value::Array(items) => items
                .iter()
                .map(|item| decode_hour(day, item))
                .collect::<Result<BTreeSet<u8>>>()?,
            other => {
                return Err(ScheduleError::MalformedScheduleData(format!(
                    "{day}: expected a list of hours, got {other}"
                )));
            }
        };
        schedule.set_hours(day, hours)?;
    }
    Ok(schedule)
}

/// Decode a shop availability document and check every stored window.
///
/// Day keys are read like employee day keys: case-insensitive, full or
/// abbreviated names.
///
/// # Errors
///
/// - [`ScheduleError::UnknownDayKey`] for a day key that is not a weekday name.
/// - [`ScheduleError::MalformedScheduleData`] if the document does not have
///   the record's shape.
/// - [`ScheduleError::InvalidWindow`] for any window with `start >= end`.
pub fn shop_availability_from_value(value: &Value) -> Result<ShopAvailability> {
    let mut value = value.clone();
    if let Some(days) = value.get_mut("days").and_then(Value::as_object_mut) {
        let mut normalized = Map::new();
        for (key, entry) in std::mem::take(days) {
            let day: DayKey = key.parse()?;
            if normalized.insert(day.as_str().to_string(), entry).is_some() {
                return Err(ScheduleError::MalformedScheduleData(format!(
                    "shop availability: {day} appears more than once"
                )));
            }
        }
        *days = normalized;
    }

    let shop: ShopAvailability = serde_json::from_value(value)
        .map_err(|e| ScheduleError::MalformedScheduleData(format!("shop availability: {e}")))?;

    require_valid(&shop.general().window, "general hours")?;
    for (day, entry) in shop.days() {
        if let Some(window) = &entry.window {
            require_valid(window, day.as_str())?;
        }
    }
    Ok(shop)
}

/// Decode an `{ "<YYYY-MM-DD>": window-or-null }` exception document.
///
/// # Errors
///
/// - [`ScheduleError::InvalidDate`] for a key that is not an ISO date.
/// - [`ScheduleError::MalformedScheduleData`] for a value that is not a window.
/// - [`ScheduleError::InvalidWindow`] for an inverted window.
pub fn exceptions_from_value(value: &Value) -> Result<ExceptionCalendar> {
    let mut calendar = ExceptionCalendar::new();
    let Some(dates) = object_or_null(value, "exception calendar")? else {
        return Ok(calendar);
    };

    for (key, entry) in dates {
        let date = parse_iso_date(key)?;
        match entry {
            Value::Null => calendar.set_closed(date),
            other => {
                let window: TimeWindow = serde_json::from_value(other.clone()).map_err(|e| {
                    ScheduleError::MalformedScheduleData(format!("exception on {date}: {e}"))
                })?;
                calendar.set_window(date, window)?;
            }
        }
    }
    Ok(calendar)
}

fn object_or_null<'v>(value: &'v Value, what: &str) -> Result<Option<&'v Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(ScheduleError::MalformedScheduleData(format!(
            "{what}: expected an object, got {other}"
        ))),
    }
}

fn decode_hour(day: DayKey, item: &Value) -> Result<u8> {
    let hour = item.as_u64().ok_or_else(|| {
        ScheduleError::MalformedScheduleData(format!("{day}: hour {item} is not a whole number"))
    })?;
    u8::try_from(hour)
        .ok()
        .filter(|h| *h <= MAX_HOUR)
        .ok_or_else(|| {
            ScheduleError::MalformedScheduleData(format!(
                "{day}: hour {hour} is outside 0-{MAX_HOUR}"
            ))
        })
}

fn require_valid(window: &TimeWindow, what: &str) -> Result<()> {
    if window.is_valid() {
        Ok(())
    } else {
        Err(ScheduleError::InvalidWindow(format!(
            "{what}: {window} must start before it ends"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── employee_schedule_from_value ────────────────────────────────────

    #[test]
    fn test_decode_employee_schedule() {
        let schedule = employee_schedule_from_value(&json!({
            "monday": [9, 10, 11],
            "Wednesday": [15, 16],
            "sunday": null
        }))
        .unwrap();
        assert_eq!(schedule.hours(DayKey::Monday).len(), 3);
        assert_eq!(schedule.hours(DayKey::Wednesday).len(), 2);
        assert!(!schedule.is_working(DayKey::Sunday));
    }

    #[test]
    fn test_decode_null_schedule_is_empty() {
        let schedule = employee_schedule_from_value(&Value::Null).unwrap();
        assert_eq!(schedule, EmployeeWeeklySchedule::new());
    }

    #[test]
    fn test_decode_rejects_unknown_day() {
        let err = employee_schedule_from_value(&json!({ "caturday": [9] })).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownDayKey(_)));
    }

    #[test]
    fn test_decode_rejects_non_integer_hours() {
        for bad in [json!(9.5), json!("9"), json!(-1), json!(true)] {
            let err = employee_schedule_from_value(&json!({ "monday": [bad] })).unwrap_err();
            assert!(matches!(err, ScheduleError::MalformedScheduleData(_)), "got: {err}");
        }
    }

    #[test]
    fn test_decode_rejects_out_of_range_hours() {
        for bad in [24, 300] {
            let err = employee_schedule_from_value(&json!({ "friday": [9, bad] })).unwrap_err();
            assert!(err.to_string().contains("outside 0-23"), "got: {err}");
        }
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        assert!(employee_schedule_from_value(&json!([9, 10])).is_err());
        assert!(employee_schedule_from_value(&json!({ "monday": 9 })).is_err());
    }

    // ── shop_availability_from_value ────────────────────────────────────

    #[test]
    fn test_decode_shop_round_trip() {
        let shop = ShopAvailability::new();
        let value = serde_json::to_value(&shop).unwrap();
        assert_eq!(shop_availability_from_value(&value).unwrap(), shop);
    }

    #[test]
    fn test_decode_shop_rejects_inverted_window() {
        let err = shop_availability_from_value(&json!({
            "general": { "window": { "start": "09:00", "end": "17:00" }, "active": true },
            "days": { "monday": { "window": { "start": "17:00", "end": "09:00" } } }
        }))
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWindow(_)));
        assert!(err.to_string().contains("monday"), "got: {err}");
    }

    #[test]
    fn test_decode_shop_rejects_unknown_day() {
        let err = shop_availability_from_value(&json!({
            "days": { "holiday": { "window": null } }
        }))
        .unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownDayKey(_)));
    }

    #[test]
    fn test_decode_shop_accepts_capitalized_and_short_day_keys() {
        let shop = shop_availability_from_value(&json!({
            "general": { "window": { "start": "09:00", "end": "17:00" }, "active": true },
            "days": {
                "Monday": { "window": { "start": "10:00", "end": "18:00" }, "mode": "customized" },
                "sat": { "window": { "start": "10:00", "end": "14:00" } }
            }
        }))
        .unwrap();
        assert!(shop.is_customized(DayKey::Monday));
        assert_eq!(
            shop.day(DayKey::Saturday).and_then(|e| e.window),
            Some(TimeWindow::from_hours(10, 14).unwrap())
        );
    }

    #[test]
    fn test_decode_shop_rejects_duplicate_day_keys() {
        let err = shop_availability_from_value(&json!({
            "days": {
                "monday": { "window": null },
                "Mon": { "window": null }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedScheduleData(_)));
        assert!(err.to_string().contains("more than once"), "got: {err}");
    }

    #[test]
    fn test_decode_shop_rejects_bad_time() {
        let err = shop_availability_from_value(&json!({
            "days": { "monday": { "window": { "start": "9 o'clock", "end": "17:00" } } }
        }))
        .unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedScheduleData(_)));
    }

    // ── exceptions_from_value ───────────────────────────────────────────

    #[test]
    fn test_decode_exceptions() {
        let calendar = exceptions_from_value(&json!({
            "2025-12-25": null,
            "2025-12-24": { "start": "09:00", "end": "13:00" }
        }))
        .unwrap();
        assert_eq!(calendar.len(), 2);
    }

    #[test]
    fn test_decode_exceptions_rejects_bad_entries() {
        let err = exceptions_from_value(&json!({ "Dec 25": null })).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDate(_)));

        let err = exceptions_from_value(&json!({
            "2025-12-24": { "start": "13:00", "end": "09:00" }
        }))
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWindow(_)));

        let err = exceptions_from_value(&json!({ "2025-12-24": "closed" })).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedScheduleData(_)));
    }
}
