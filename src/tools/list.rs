/// Tools for listing and fetching habits
///
/// This module implements the habit_list and habit_get tools.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitIdParams, HabitView, ToolError};

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only return habits scheduled for today (optional, defaults to false)
    pub due_today: Option<bool>,
    /// Sort by: 'name', 'streak', 'created' (optional, defaults to created)
    pub sort_by: Option<String>,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitView>,
    /// Habits due today that are not completed yet
    pub open_today: u32,
}

/// List the habits of `user_id`
pub fn list_habits<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, ToolError> {
    let mut habits: Vec<HabitView> = storage
        .list_habits(user_id)?
        .iter()
        .map(|habit| HabitView::new(habit, today))
        .collect();

    if params.due_today.unwrap_or(false) {
        habits.retain(|h| h.due_today);
    }

    match params.sort_by.as_deref().map(str::trim) {
        Some("name") => habits.sort_by_key(|h| h.name.to_lowercase()),
        Some("streak") => habits.sort_by(|a, b| b.streak.cmp(&a.streak).then_with(|| a.name.cmp(&b.name))),
        // storage already returns creation order
        _ => {}
    }

    let open_today = habits
        .iter()
        .filter(|h| h.due_today && !h.completed_today)
        .count() as u32;

    Ok(ListHabitsResponse { habits, open_today })
}

/// Fetch a single habit
pub fn get_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<HabitView, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(user_id, &habit_id)?;
    Ok(HabitView::new(&habit, today))
}
