//! JSON snapshot of the records the resolver reads.
//!
//! ```json
//! {
//!   "timezone": "Europe/Berlin",
//!   "shop": { "general": { ... }, "days": { ... } },
//!   "employees": { "ana": { "monday": [9, 10, 11] } },
//!   "exceptions": { "2025-12-25": null }
//! }
//! ```
//!
//! [`Snapshot::load`] is lenient like the resolver: inverted windows and
//! out-of-range hours are kept and reported when resolved.
//! [`Snapshot::check`] runs the strict decoders instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use hours_engine::{
    employee_schedule_from_value, exceptions_from_value, shop_availability_from_value,
    EmployeeWeeklySchedule, ExceptionCalendar, ShopAvailability,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub shop: ShopAvailability,
    #[serde(default)]
    pub employees: BTreeMap<String, EmployeeWeeklySchedule>,
    #[serde(default)]
    pub exceptions: ExceptionCalendar,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let value = read_json(path)?;
        let snapshot: Snapshot = serde_json::from_value(value).with_context(|| {
            format!("snapshot {} does not match the expected shape", path.display())
        })?;
        debug!(
            path = %path.display(),
            employees = snapshot.employees.len(),
            exceptions = snapshot.exceptions.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// The snapshot's timezone, or `None` when it does not name one.
    pub fn timezone(&self) -> Result<Option<Tz>> {
        self.timezone.as_deref().map(parse_timezone).transpose()
    }

    /// Strictly validate every record in the snapshot file.
    pub fn check(path: &Path) -> Result<()> {
        let value = read_json(path)?;

        let shop = value.get("shop").context("snapshot has no 'shop' record")?;
        shop_availability_from_value(shop).context("shop record is invalid")?;

        if let Some(employees) = value.get("employees").and_then(Value::as_object) {
            for (id, schedule) in employees {
                employee_schedule_from_value(schedule)
                    .with_context(|| format!("schedule for employee '{id}' is invalid"))?;
            }
        }

        if let Some(exceptions) = value.get("exceptions") {
            exceptions_from_value(exceptions).context("exception calendar is invalid")?;
        }

        if let Some(tz) = value.get("timezone").and_then(Value::as_str) {
            parse_timezone(tz)?;
        }
        Ok(())
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| anyhow::anyhow!("invalid timezone '{name}'"))
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("snapshot {} is not valid JSON", path.display()))
}
