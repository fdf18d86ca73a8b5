/// Tools exposed to protocol clients
///
/// Each tool is a plain function over a `HabitStorage`, the acting user and
/// typed parameters. `today` is always passed in by the caller so that every
/// tool is deterministic under test.

pub mod avatar;
pub mod complete;
pub mod create;
pub mod insights;
pub mod list;
pub mod reminders;
pub mod stats;
pub mod update;

// Re-export tool functions for easy access
pub use avatar::*;
pub use complete::*;
pub use create::*;
pub use insights::*;
pub use list::*;
pub use reminders::*;
pub use stats::*;
pub use update::*;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{format_calendar_date, DomainError, HabitId, HabitRecord};
use crate::storage::StorageError;

/// Errors returned by tool functions
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid habit id '{0}'")]
    InvalidHabitId(String),
}

impl ToolError {
    /// True when the caller sent something wrong, as opposed to a backend failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ToolError::Domain(_)
                | ToolError::InvalidHabitId(_)
                | ToolError::Storage(StorageError::HabitNotFound { .. })
                | ToolError::Storage(StorageError::Rejected(_))
        )
    }
}

/// Parse a habit id sent by a client
pub fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::parse(raw).map_err(|_| ToolError::InvalidHabitId(raw.to_string()))
}

/// A habit as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct HabitView {
    pub id: String,
    pub name: String,
    pub frequency_days: Vec<u8>,
    pub frequency: String,
    pub color: Option<String>,
    pub reminder_time: Option<String>,
    pub start_date: Option<String>,
    pub completed_dates: Vec<String>,
    pub streak: u32,
    pub longest_streak: u32,
    pub due_today: bool,
    pub completed_today: bool,
}

impl HabitView {
    pub fn new(habit: &HabitRecord, today: NaiveDate) -> Self {
        Self {
            id: habit.id.to_string(),
            name: habit.name.clone(),
            frequency_days: habit.frequency_days.indices().collect(),
            frequency: habit.frequency_days.display(),
            color: habit.color.clone(),
            reminder_time: habit.reminder_time.map(|t| t.to_string()),
            start_date: habit.start_date.map(format_calendar_date),
            completed_dates: habit
                .completed_dates
                .iter()
                .map(|d| format_calendar_date(*d))
                .collect(),
            streak: habit.streak,
            longest_streak: habit.longest_streak,
            due_today: habit.frequency_days.is_scheduled(today),
            completed_today: habit.is_completed_on(today),
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
