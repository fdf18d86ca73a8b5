/// Core identifier and value types used throughout the domain layer
///
/// This module defines the ID wrappers, the weekly frequency set and the
/// reminder time that HabitRecord is built from.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - a habit ID can't be
/// passed where a user ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a habit ID from its string form (useful for database loading)
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a record
///
/// Authentication lives outside this crate, so a user is just an opaque,
/// non-empty string handed in by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation {
                message: "User id cannot be empty".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The weekdays a habit is scheduled on
///
/// Stored as weekday indices with 0 = Sunday through 6 = Saturday, the same
/// numbering clients send. A valid set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct FrequencyDays(BTreeSet<u8>);

impl FrequencyDays {
    /// Build a frequency set from weekday indices, rejecting out-of-range and empty input
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self, DomainError> {
        let mut set = BTreeSet::new();
        for day in days {
            if day > 6 {
                return Err(DomainError::InvalidFrequency(format!(
                    "Weekday index must be 0 (Sunday) to 6 (Saturday), got {}",
                    day
                )));
            }
            set.insert(day);
        }

        if set.is_empty() {
            return Err(DomainError::InvalidFrequency(
                "At least one weekday must be selected".to_string(),
            ));
        }

        Ok(Self(set))
    }

    /// Every day of the week
    pub fn daily() -> Self {
        Self((0..=6).collect())
    }

    /// Check if the habit is due on the given calendar day
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0.contains(&(weekday.num_days_from_sunday() as u8))
    }

    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Short human readable form, e.g. "Mon, Wed, Fri" or "every day"
    pub fn display(&self) -> String {
        const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

        if self.0.len() == 7 {
            return "every day".to_string();
        }

        self.0
            .iter()
            .map(|&d| NAMES[d as usize])
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<Vec<u8>> for FrequencyDays {
    type Error = DomainError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<FrequencyDays> for Vec<u8> {
    fn from(days: FrequencyDays) -> Self {
        days.0.into_iter().collect()
    }
}

/// Time of day a reminder should fire, written as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
        if !well_formed {
            return Err(DomainError::InvalidReminderTime(format!("expected HH:MM, got '{}'", s)));
        }

        let digits = |pair: &[u8]| u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0');
        let hour = digits(&bytes[0..2]);
        let minute = digits(&bytes[3..5]);

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidReminderTime(format!("'{}' is out of range", s)))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ReminderTime> for String {
    fn from(time: ReminderTime) -> Self {
        time.to_string()
    }
}
