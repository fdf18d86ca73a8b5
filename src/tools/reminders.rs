/// Tool for upcoming reminders
///
/// This module implements habit_reminders. It reads the in-memory registry
/// rather than storage, so the answer matches what the server will fire.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::reminders::ReminderRegistry;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

/// Parameters for listing upcoming reminders
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RemindersParams {
    /// Maximum number of reminders to return (optional, defaults to 10)
    pub limit: Option<usize>,
}

/// One upcoming reminder
#[derive(Debug, Serialize)]
pub struct UpcomingReminder {
    pub habit_id: String,
    pub habit_name: String,
    /// Local date and time as YYYY-MM-DD HH:MM
    pub at: String,
}

/// Response listing the user's next reminders
#[derive(Debug, Serialize)]
pub struct RemindersResponse {
    pub reminders: Vec<UpcomingReminder>,
}

/// The next reminders for `user_id` after `now`
pub fn list_reminders(
    registry: &ReminderRegistry,
    user_id: &UserId,
    params: RemindersParams,
    now: NaiveDateTime,
) -> RemindersResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let reminders = registry
        .upcoming(now, usize::MAX)
        .into_iter()
        .filter(|s| &s.reminder.user_id == user_id)
        .take(limit)
        .map(|s| UpcomingReminder {
            habit_id: s.reminder.habit_id.to_string(),
            habit_name: s.reminder.habit_name.clone(),
            at: s.at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    RemindersResponse { reminders }
}
