use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use hours_engine::{
    parse_iso_date, AvailabilityResolver, DayKey, DayResolution, Diagnostic, ResolveOptions,
};
use serde::Serialize;

mod logging;
mod snapshot;

use snapshot::{parse_timezone, Snapshot};

/// Resolve shop and employee opening hours from a JSON snapshot.
#[derive(Parser)]
#[command(name = "hours", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single date
    Resolve {
        /// Snapshot file with shop, employees and exceptions
        #[arg(short, long)]
        snapshot: PathBuf,
        /// ISO date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Restrict to one employee's working hours
        #[arg(short, long)]
        employee: Option<String>,
    },
    /// Resolve consecutive dates
    Week {
        #[arg(short, long)]
        snapshot: PathBuf,
        /// First ISO date (YYYY-MM-DD)
        #[arg(short, long)]
        from: String,
        /// Number of dates to resolve
        #[arg(long, default_value_t = 7)]
        days: usize,
        #[arg(short, long)]
        employee: Option<String>,
    },
    /// Check whether an instant falls inside the resolved hours
    OpenAt {
        #[arg(short, long)]
        snapshot: PathBuf,
        /// RFC 3339 instant, e.g. 2026-03-16T14:30:00Z
        #[arg(short, long)]
        at: String,
        /// IANA timezone of the shop; overrides the snapshot's
        #[arg(short, long)]
        timezone: Option<String>,
        #[arg(short, long)]
        employee: Option<String>,
    },
    /// Strictly validate every record in a snapshot
    Check {
        #[arg(short, long)]
        snapshot: PathBuf,
    },
}

#[derive(Serialize)]
struct ResolveOutput {
    #[serde(flatten)]
    resolution: DayResolution,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct OpenAtOutput {
    at: DateTime<Utc>,
    timezone: String,
    open: bool,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            snapshot,
            date,
            employee,
        } => {
            let snapshot = Snapshot::load(&snapshot)?;
            let date = parse_date(&date)?;
            let resolver = resolver_for(&snapshot, None)?;
            let (availability, diagnostics) =
                resolver.resolve_with_diagnostics(date, employee.as_deref());
            print_json(&ResolveOutput {
                resolution: DayResolution {
                    date,
                    day: DayKey::of_date(date),
                    availability,
                },
                diagnostics,
            })
        }
        Command::Week {
            snapshot,
            from,
            days,
            employee,
        } => {
            let snapshot = Snapshot::load(&snapshot)?;
            let from = parse_date(&from)?;
            let resolver = resolver_for(&snapshot, None)?;
            print_json(&resolver.resolve_range(from, days, employee.as_deref()))
        }
        Command::OpenAt {
            snapshot,
            at,
            timezone,
            employee,
        } => {
            let snapshot = Snapshot::load(&snapshot)?;
            let at = DateTime::parse_from_rfc3339(&at)
                .with_context(|| format!("invalid instant '{at}'"))?
                .with_timezone(&Utc);
            let resolver = resolver_for(&snapshot, timezone.as_deref())?;
            let open = resolver.is_open_at(at, employee.as_deref());
            print_json(&OpenAtOutput {
                at,
                timezone: resolver_timezone(&snapshot, timezone.as_deref())?.to_string(),
                open,
            })
        }
        Command::Check { snapshot } => {
            Snapshot::check(&snapshot)?;
            print_json(&serde_json::json!({ "valid": true }))
        }
    }
}

fn resolver_for<'a>(
    snapshot: &'a Snapshot,
    timezone: Option<&str>,
) -> Result<AvailabilityResolver<'a>> {
    let options = ResolveOptions {
        timezone: resolver_timezone(snapshot, timezone)?,
    };
    Ok(AvailabilityResolver::new(&snapshot.shop)
        .with_exceptions(&snapshot.exceptions)
        .with_employees(&snapshot.employees)
        .with_options(options))
}

/// `--timezone` wins over the snapshot's timezone, which wins over UTC.
fn resolver_timezone(snapshot: &Snapshot, timezone: Option<&str>) -> Result<chrono_tz::Tz> {
    match timezone {
        Some(name) => parse_timezone(name),
        None => Ok(snapshot.timezone()?.unwrap_or(chrono_tz::UTC)),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(parse_iso_date(s)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
