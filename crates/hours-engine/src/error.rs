//! Error types for hours-engine operations.

use thiserror::Error;

use crate::day::DayKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Unknown day key: {0}")]
    UnknownDayKey(String),

    #[error("Malformed schedule data: {0}")]
    MalformedScheduleData(String),

    #[error("Not a weekday: {0}")]
    NotWeekday(DayKey),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
