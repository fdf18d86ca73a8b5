/// Tools for marking habits complete or incomplete
///
/// This module implements habit_complete, habit_incomplete and
/// habit_recalculate. Completion can only be toggled for the current day; the
/// streak engine runs inside the same storage transaction as the toggle.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_calendar_date, DomainError, HabitStats, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, plural, HabitView, ToolError};

/// Parameters for toggling a habit's completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to toggle as YYYY-MM-DD; must be today (optional, defaults to today)
    pub date: Option<String>,
}

/// Parameters for tools that only need a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitIdParams {
    /// ID of the habit
    pub habit_id: String,
}

/// Response from a completion toggle or recalculation
#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub habit: HabitView,
    pub stats: HabitStats,
    /// False when the day was already in the requested state
    pub changed: bool,
    pub message: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Toggle {
    Complete,
    Incomplete,
}

/// Mark today as completed
pub fn complete_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: ToggleHabitParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, ToolError> {
    toggle(storage, user_id, params, today, Toggle::Complete)
}

/// Remove today's completion
pub fn incomplete_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: ToggleHabitParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, ToolError> {
    toggle(storage, user_id, params, today, Toggle::Incomplete)
}

/// Recompute and store the cached streak fields without changing completions
pub fn recalculate_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    let mut stats = HabitStats::empty();
    let habit = storage.modify_habit(user_id, &habit_id, &mut |habit| {
        stats = habit.refresh_stats(today);
        Ok(())
    })?;

    tracing::info!("Recalculated streak for habit {}: {}", habit.id, stats.current_streak);

    Ok(ToggleHabitResponse {
        message: format!(
            "🔄 Streak recalculated for '{}': current {} day{}, best {} day{}",
            habit.name,
            stats.current_streak,
            plural(stats.current_streak),
            stats.longest_streak,
            plural(stats.longest_streak)
        ),
        habit: HabitView::new(&habit, today),
        stats,
        changed: false,
    })
}

fn toggle<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: &UserId,
    params: ToggleHabitParams,
    today: NaiveDate,
    action: Toggle,
) -> Result<ToggleHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    if let Some(raw) = params.date.as_deref() {
        let date = parse_calendar_date(raw)?;
        if date != today {
            let verb = match action {
                Toggle::Complete => "complete",
                Toggle::Incomplete => "uncomplete",
            };
            tracing::debug!("Rejected {} for {}: today is {}", verb, date, today);
            return Err(DomainError::InvalidDate(format!(
                "You can only {} habits for today ({})",
                verb, today
            ))
            .into());
        }
    }

    let mut stats = HabitStats::empty();
    let mut changed = false;
    let habit = storage.modify_habit(user_id, &habit_id, &mut |habit| {
        changed = match action {
            Toggle::Complete => habit.mark_complete(today),
            Toggle::Incomplete => habit.mark_incomplete(today),
        };
        stats = habit.refresh_stats(today);
        Ok(())
    })?;

    let message = match (action, changed) {
        (Toggle::Complete, true) => format!(
            "🔥 Completed '{}'! Current streak: {} day{}",
            habit.name,
            stats.current_streak,
            plural(stats.current_streak)
        ),
        (Toggle::Complete, false) => format!("'{}' was already completed today", habit.name),
        (Toggle::Incomplete, true) => format!(
            "↩️ Marked '{}' as not done today. Current streak: {} day{}",
            habit.name,
            stats.current_streak,
            plural(stats.current_streak)
        ),
        (Toggle::Incomplete, false) => format!("'{}' was not completed today", habit.name),
    };

    tracing::info!(
        "Habit {} toggled (changed: {}), streak {} / best {}",
        habit.id,
        changed,
        stats.current_streak,
        stats.longest_streak
    );

    Ok(ToggleHabitResponse {
        habit: HabitView::new(&habit, today),
        stats,
        changed,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrequencyDays, HabitRecord};
    use crate::storage::{SqliteStorage, StorageError};

    fn day(s: &str) -> NaiveDate {
        parse_calendar_date(s).unwrap()
    }

    fn setup(completed: &[&str]) -> (SqliteStorage, UserId, String) {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let user = UserId::new("alice").unwrap();
        let mut habit = HabitRecord::new(
            user.clone(),
            "Pushups".to_string(),
            FrequencyDays::daily(),
            None,
            None,
            Some(day("2024-03-01")),
        )
        .unwrap();
        for d in completed {
            habit.mark_complete(day(d));
        }
        storage.create_habit(&habit).unwrap();
        (storage, user, habit.id.to_string())
    }

    fn toggle_params(habit_id: &str, date: Option<&str>) -> ToggleHabitParams {
        ToggleHabitParams {
            habit_id: habit_id.to_string(),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_complete_extends_streak() {
        let (storage, user, id) = setup(&["2024-03-08", "2024-03-09"]);
        let today = day("2024-03-10");

        let response = complete_habit(&storage, &user, toggle_params(&id, Some("2024-03-10")), today).unwrap();

        assert!(response.changed);
        assert_eq!(response.stats.current_streak, 3);
        assert_eq!(response.stats.longest_streak, 3);
        assert_eq!(response.habit.streak, 3);
        assert!(response.habit.completed_today);
        assert!(response.message.contains("3 days"));
    }

    #[test]
    fn test_complete_twice_is_idempotent() {
        let (storage, user, id) = setup(&[]);
        let today = day("2024-03-10");

        let first = complete_habit(&storage, &user, toggle_params(&id, None), today).unwrap();
        let second = complete_habit(&storage, &user, toggle_params(&id, None), today).unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.stats, second.stats);
        assert_eq!(second.habit.completed_dates, vec!["2024-03-10".to_string()]);
    }

    #[test]
    fn test_only_today_can_be_toggled() {
        let (storage, user, id) = setup(&[]);
        let today = day("2024-03-10");

        let result = complete_habit(&storage, &user, toggle_params(&id, Some("2024-03-09")), today);
        assert!(matches!(result, Err(ToolError::Domain(DomainError::InvalidDate(_)))));

        let result = incomplete_habit(&storage, &user, toggle_params(&id, Some("03/10/2024")), today);
        assert!(matches!(result, Err(ToolError::Domain(DomainError::InvalidDate(_)))));
    }

    #[test]
    fn test_incomplete_resets_current_streak() {
        let (storage, user, id) = setup(&["2024-03-08", "2024-03-09", "2024-03-10"]);
        let today = day("2024-03-10");

        let response = incomplete_habit(&storage, &user, toggle_params(&id, None), today).unwrap();

        assert!(response.changed);
        assert_eq!(response.stats.current_streak, 0);
        assert_eq!(response.stats.longest_streak, 2);
        assert!(!response.habit.completed_today);
    }

    #[test]
    fn test_unknown_habit() {
        let (storage, user, _) = setup(&[]);
        let today = day("2024-03-10");

        let missing = complete_habit(
            &storage,
            &user,
            toggle_params("00000000-0000-4000-8000-000000000000", None),
            today,
        );
        assert!(matches!(missing, Err(ToolError::Storage(StorageError::HabitNotFound { .. }))));

        let malformed = complete_habit(&storage, &user, toggle_params("42", None), today);
        assert!(matches!(malformed, Err(ToolError::InvalidHabitId(_))));
    }

    #[test]
    fn test_recalculate_refreshes_stale_cache() {
        let (storage, user, id) = setup(&["2024-03-09", "2024-03-10"]);

        let response = recalculate_habit(
            &storage,
            &user,
            HabitIdParams { habit_id: id.clone() },
            day("2024-03-10"),
        )
        .unwrap();

        assert_eq!(response.habit.streak, 2);
        assert!(!response.changed);

        let habit_id = parse_habit_id(&id).unwrap();
        assert_eq!(storage.get_habit(&user, &habit_id).unwrap().longest_streak, 2);
    }
}
