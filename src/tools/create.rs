/// Tool for creating new habits
///
/// This module implements the habit_create tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_start_date, FrequencyDays, HabitRecord, ReminderTime, UserId};
use crate::storage::HabitStorage;
use crate::tools::{HabitView, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Weekdays the habit is due, 0 = Sunday through 6 = Saturday
    pub frequency_days: Vec<u8>,
    /// Display color (optional)
    pub color: Option<String>,
    /// Daily reminder time as HH:MM (optional)
    pub reminder_time: Option<String>,
    /// First tracked day as YYYY-MM-DD (optional, defaults to today)
    pub start_date: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit: HabitView,
    pub message: String,
}

/// Create a new habit for `user_id`
pub fn create_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: CreateHabitParams,
    today: NaiveDate,
) -> Result<CreateHabitResponse, ToolError> {
    let frequency_days = FrequencyDays::new(params.frequency_days)?;

    let reminder_time = params
        .reminder_time
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(ReminderTime::parse)
        .transpose()?;

    let start_date = match params.start_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_start_date(raw)?,
        _ => today,
    };

    let habit = HabitRecord::new(
        user_id.clone(),
        params.name,
        frequency_days,
        params.color,
        reminder_time,
        Some(start_date),
    )?;

    storage.create_habit(&habit)?;
    tracing::info!("Created habit '{}' ({}) for {}", habit.name, habit.id, user_id);

    Ok(CreateHabitResponse {
        message: format!(
            "✅ Created habit '{}' ({})! Ready to start your streak!",
            habit.name,
            habit.frequency_days.display()
        ),
        habit: HabitView::new(&habit, today),
    })
}
