/// Streak and completion statistics engine
///
/// Pure functions that turn a habit's completed dates into its current
/// streak, longest streak and completion rate. The input is treated as a set:
/// order and duplicates never matter and the caller's slice is never touched.
///
/// Policy: a current streak only exists when the reference day itself is
/// completed. Missing "today" resets it to zero, there is no grace day.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_calendar_dates, DomainError};

/// Derived statistics for a single habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    /// Consecutive completed days ending at the reference day
    pub current_streak: u32,
    /// Longest run of consecutive completed days anywhere in the history
    pub longest_streak: u32,
    /// Calendar days in the tracked window, both ends included
    pub total_days: u32,
    /// Completed days that fall inside the tracked window
    pub completed_days: u32,
    /// `completed_days / total_days` as a percentage (0.0 to 100.0)
    pub completion_rate: f64,
}

/// The window part of [`HabitStats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub total_days: u32,
    pub completed_days: u32,
    pub completion_rate: f64,
}

impl HabitStats {
    /// Statistics for a habit that has never been completed
    pub fn empty() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            total_days: 0,
            completed_days: 0,
            completion_rate: 0.0,
        }
    }

    /// Calculate every statistic for a set of completed dates
    ///
    /// `start_date` bounds the completion window; when unset the window is
    /// just `as_of`. Streaks look at the whole history regardless of it.
    pub fn calculate(dates: &[NaiveDate], start_date: Option<NaiveDate>, as_of: NaiveDate) -> Self {
        let window = completion_stats(dates, start_date, as_of);

        Self {
            current_streak: current_streak(dates, as_of),
            longest_streak: longest_streak(dates),
            total_days: window.total_days,
            completed_days: window.completed_days,
            completion_rate: window.completion_rate,
        }
    }

    /// Same as [`HabitStats::calculate`] but for raw `YYYY-MM-DD` strings
    ///
    /// Any malformed entry fails the whole calculation with `InvalidDate`.
    pub fn from_date_strings<S: AsRef<str>>(
        dates: &[S],
        start_date: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> Result<Self, DomainError> {
        let parsed = normalize_strings(dates)?;
        Ok(Self::calculate(&parsed, start_date, as_of))
    }

    /// Get a motivational message based on the current streak
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }
}

/// Sorted, distinct dates, most recent first
pub fn normalize(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    date_set(dates).into_iter().rev().collect()
}

/// Parse and normalize raw date strings
pub fn normalize_strings<S: AsRef<str>>(dates: &[S]) -> Result<Vec<NaiveDate>, DomainError> {
    let parsed = parse_calendar_dates(dates)?;
    Ok(normalize(&parsed))
}

/// Number of consecutive completed days ending exactly at `as_of`
///
/// Returns 0 when `as_of` itself is not completed. Dates after `as_of` are
/// ignored.
pub fn current_streak(dates: &[NaiveDate], as_of: NaiveDate) -> u32 {
    let set = date_set(dates);
    if !set.contains(&as_of) {
        return 0;
    }

    let mut streak = 0;
    let mut day = Some(as_of);
    while let Some(d) = day {
        if !set.contains(&d) {
            break;
        }
        streak += 1;
        day = d.pred_opt();
    }

    streak
}

/// Longest run of consecutive calendar days in the set, 0 when empty
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let sorted: Vec<NaiveDate> = date_set(dates).into_iter().collect();
    if sorted.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in sorted.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    longest
}

/// Tracked days, completed days and completion rate over `[start_date, as_of]`
pub fn completion_stats(
    dates: &[NaiveDate],
    start_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> CompletionStats {
    let start = start_date.unwrap_or(as_of);
    let span = (as_of - start).num_days() + 1;

    // start after as_of: empty window
    if span <= 0 {
        return CompletionStats {
            total_days: 0,
            completed_days: 0,
            completion_rate: 0.0,
        };
    }

    let total_days = u32::try_from(span).unwrap_or(u32::MAX);
    let completed_days = date_set(dates).range(start..=as_of).count() as u32;

    CompletionStats {
        total_days,
        completed_days,
        completion_rate: completed_days as f64 / total_days as f64 * 100.0,
    }
}

fn date_set(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
    dates.iter().copied().collect()
}
