/// Analytics engine for per-user summaries and insights
///
/// This module aggregates the per-habit output of the streak engine into
/// numbers that describe a user's whole habit set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Accessory, HabitRecord, HabitStats};

/// Totals across all habits of one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub total_habits: u32,
    /// Habits with at least one completed day
    pub habits_with_completions: u32,
    /// Sum of every habit's current streak
    pub total_current_streak: u32,
    /// Longest streak of any habit
    pub best_streak: u32,
    /// Completed days summed over all habits
    pub total_completions: u32,
}

/// Analytics engine for processing habit data
///
/// Stateless; every call recomputes from the records it is given so the
/// answer always reflects `today` rather than cached streak fields.
#[derive(Debug, Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new() -> Self {
        Self
    }

    /// Statistics for one habit as of `today`
    pub fn habit_stats(&self, habit: &HabitRecord, today: NaiveDate) -> HabitStats {
        habit.stats(today)
    }

    /// Summarize all habits of a user
    pub fn user_summary(&self, habits: &[HabitRecord], today: NaiveDate) -> UserSummary {
        habits.iter().fold(UserSummary::default(), |mut summary, habit| {
            let stats = habit.stats(today);
            summary.total_habits += 1;
            if !habit.completed_dates.is_empty() {
                summary.habits_with_completions += 1;
            }
            summary.total_current_streak += stats.current_streak;
            summary.best_streak = summary.best_streak.max(stats.longest_streak);
            summary.total_completions += habit.completed_dates.len() as u32;
            summary
        })
    }

    /// Short insights about a user's habits
    pub fn generate_insights(&self, habits: &[HabitRecord], today: NaiveDate) -> Vec<String> {
        let mut insights = Vec::new();

        if habits.is_empty() {
            insights.push("Start by creating your first habit to track!".to_string());
            return insights;
        }

        let summary = self.user_summary(habits, today);
        if summary.total_completions == 0 {
            insights.push("Great job creating habits! Now start marking them complete.".to_string());
        }

        let due_today: Vec<&HabitRecord> = habits
            .iter()
            .filter(|h| h.frequency_days.is_scheduled(today))
            .collect();
        let open_today = due_today.iter().filter(|h| !h.is_completed_on(today)).count();
        if !due_today.is_empty() {
            if open_today == 0 {
                insights.push("Everything due today is done. Nice!".to_string());
            } else {
                insights.push(format!(
                    "{} of {} habits due today still open.",
                    open_today,
                    due_today.len()
                ));
            }
        }

        let next_reward = Accessory::ALL
            .iter()
            .find(|a| a.required_streak() > summary.best_streak);
        match next_reward {
            Some(reward) => insights.push(format!(
                "{} more day(s) of streak to unlock the {}.",
                reward.required_streak() - summary.best_streak,
                reward
            )),
            None => insights.push("Every avatar accessory is unlocked.".to_string()),
        }

        insights
    }
}
