/// Tools for updating and deleting habits
///
/// This module implements the habit_update and habit_delete tools.
/// Completions are not editable here; they only change through the
/// complete/incomplete tools.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{FrequencyDays, ReminderTime, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitIdParams, HabitView, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    /// New name (optional)
    pub name: Option<String>,
    /// New weekdays, 0 = Sunday through 6 = Saturday (optional)
    pub frequency_days: Option<Vec<u8>>,
    /// New color; an empty string clears it (optional)
    pub color: Option<String>,
    /// New reminder time as HH:MM; an empty string clears it (optional)
    pub reminder_time: Option<String>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: HabitView,
    pub message: String,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub habit_id: String,
    pub message: String,
}

/// Update an existing habit
pub fn update_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: UpdateHabitParams,
    today: NaiveDate,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    let mut frequency_days = params.frequency_days.map(FrequencyDays::new).transpose()?;

    let mut reminder_time = match params.reminder_time.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(raw) => Some(Some(ReminderTime::parse(raw)?)),
    };

    let mut name = params.name;
    let mut color = params.color.map(Some);

    // edit the freshly loaded record so concurrent completions survive
    let habit = storage.modify_habit(user_id, &habit_id, &mut |habit| {
        habit.update(name.take(), frequency_days.take(), color.take(), reminder_time.take())
    })?;

    tracing::info!("Updated habit '{}' ({})", habit.name, habit.id);

    Ok(UpdateHabitResponse {
        message: format!("✅ Updated habit '{}'", habit.name),
        habit: HabitView::new(&habit, today),
    })
}

/// Delete a habit and its completion history
pub fn delete_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: HabitIdParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    storage.delete_habit(user_id, &habit_id)?;

    tracing::info!("Deleted habit {} for {}", habit_id, user_id);

    Ok(DeleteHabitResponse {
        habit_id: habit_id.to_string(),
        message: "🗑️ Habit deleted successfully".to_string(),
    })
}
