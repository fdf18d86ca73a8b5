/// Tools for habit statistics
///
/// This module implements habit_stats (one habit) and stats_summary (all of a
/// user's habits). Both are read-only; they recompute from completed dates
/// instead of trusting the cached streak fields.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{AnalyticsEngine, UserSummary};
use crate::domain::{HabitStats, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, plural, HabitIdParams, ToolError};

/// Response with the statistics of one habit
#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub habit_id: String,
    pub name: String,
    pub stats: HabitStats,
    pub message: String,
}

/// Response with totals across all habits of a user
#[derive(Debug, Serialize)]
pub struct StatsSummaryResponse {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub message: String,
}

/// Statistics for one habit as of `today`
pub fn habit_stats<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    params: HabitIdParams,
    today: NaiveDate,
) -> Result<HabitStatsResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(user_id, &habit_id)?;
    let stats = analytics.habit_stats(&habit, today);

    let message = format!(
        "📊 '{}': {} day{} current, {} best, {:.1}% completion. {}",
        habit.name,
        stats.current_streak,
        plural(stats.current_streak),
        stats.longest_streak,
        stats.completion_rate,
        stats.motivational_message()
    );

    Ok(HabitStatsResponse {
        habit_id: habit.id.to_string(),
        name: habit.name,
        stats,
        message,
    })
}

/// Totals across every habit of `user_id`
pub fn stats_summary<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    today: NaiveDate,
) -> Result<StatsSummaryResponse, ToolError> {
    let habits = storage.list_habits(user_id)?;
    let summary = analytics.user_summary(&habits, today);

    let message = format!(
        "📈 {} habit{}, {} completion{} in total, best streak {} day{}",
        summary.total_habits,
        plural(summary.total_habits),
        summary.total_completions,
        plural(summary.total_completions),
        summary.best_streak,
        plural(summary.best_streak)
    );

    Ok(StatsSummaryResponse { summary, message })
}
