/// Habit record and its lifecycle
///
/// This module defines HabitRecord, the stored shape of a habit, along with
/// field validation and the completion toggles that feed the streak engine.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, FrequencyDays, HabitId, HabitStats, ReminderTime, UserId};

/// A habit the user wants to do on certain weekdays
///
/// `completed_dates` is a set, so marking the same day twice is a no-op.
/// `streak` and `longest_streak` are cached engine output and only change
/// through [`HabitRecord::refresh_stats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Who owns this habit
    pub user_id: UserId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Weekdays the habit is due on
    pub frequency_days: FrequencyDays,
    /// Display color, no effect on statistics
    pub color: Option<String>,
    /// Optional daily reminder time
    pub reminder_time: Option<ReminderTime>,
    /// Days the habit was completed
    pub completed_dates: BTreeSet<NaiveDate>,
    /// First day counted toward the completion rate
    pub start_date: Option<NaiveDate>,
    /// Cached current streak
    pub streak: u32,
    /// Cached longest streak
    pub longest_streak: u32,
    /// Last time a change left the habit with at least one completion
    pub last_completed_at: Option<DateTime<Utc>>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl HabitRecord {
    /// Create a new habit with validation
    pub fn new(
        user_id: UserId,
        name: String,
        frequency_days: FrequencyDays,
        color: Option<String>,
        reminder_time: Option<ReminderTime>,
        start_date: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(&name)?;
        let color = Self::validate_color(color)?;

        Ok(Self {
            id: HabitId::new(),
            user_id,
            name,
            frequency_days,
            color,
            reminder_time,
            completed_dates: BTreeSet::new(),
            start_date,
            streak: 0,
            longest_streak: 0,
            last_completed_at: None,
            created_at: Utc::now(),
        })
    }

    /// Update the habit's editable properties
    ///
    /// Every new value is validated before any field is touched, so a failed
    /// update leaves the record unchanged.
    pub fn update(
        &mut self,
        name: Option<String>,
        frequency_days: Option<FrequencyDays>,
        color: Option<Option<String>>,
        reminder_time: Option<Option<ReminderTime>>,
    ) -> Result<(), DomainError> {
        let name = name.map(|n| Self::validate_name(&n)).transpose()?;
        let color = color.map(Self::validate_color).transpose()?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_frequency) = frequency_days {
            self.frequency_days = new_frequency;
        }
        if let Some(new_color) = color {
            self.color = new_color;
        }
        if let Some(new_reminder) = reminder_time {
            self.reminder_time = new_reminder;
        }

        Ok(())
    }

    /// Mark a day as completed, returns false if it already was
    pub fn mark_complete(&mut self, date: NaiveDate) -> bool {
        let changed = self.completed_dates.insert(date);
        if changed {
            self.last_completed_at = Some(Utc::now());
        }
        changed
    }

    /// Remove a day from the completed set, returns false if it wasn't there
    pub fn mark_incomplete(&mut self, date: NaiveDate) -> bool {
        let changed = self.completed_dates.remove(&date);
        if changed && !self.completed_dates.is_empty() {
            self.last_completed_at = Some(Utc::now());
        }
        changed
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Completed dates as a plain list, oldest first
    pub fn completed_dates_list(&self) -> Vec<NaiveDate> {
        self.completed_dates.iter().copied().collect()
    }

    /// Compute statistics as of `as_of` without touching the cached fields
    pub fn stats(&self, as_of: NaiveDate) -> HabitStats {
        HabitStats::calculate(&self.completed_dates_list(), self.start_date, as_of)
    }

    /// Recompute statistics and store the streak fields on the record
    pub fn refresh_stats(&mut self, as_of: NaiveDate) -> HabitStats {
        let stats = self.stats(as_of);
        self.streak = stats.current_streak;
        self.longest_streak = stats.longest_streak;
        stats
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(trimmed.to_string())
    }

    fn validate_color(color: Option<String>) -> Result<Option<String>, DomainError> {
        match color {
            Some(c) if c.trim().is_empty() => Ok(None),
            Some(c) if c.trim().len() > 32 => Err(DomainError::Validation {
                message: "Color cannot be longer than 32 characters".to_string(),
            }),
            Some(c) => Ok(Some(c.trim().to_string())),
            None => Ok(None),
        }
    }
}
