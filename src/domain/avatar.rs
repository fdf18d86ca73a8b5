/// Avatar customization and streak rewards
///
/// The avatar is purely cosmetic. Accessories are unlocked by reaching streak
/// milestones on any habit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Accessories an avatar can wear, ordered by the streak they require
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessory {
    None,
    Glasses,
    Bowtie,
    Hat,
}

impl Accessory {
    pub const ALL: [Accessory; 4] = [
        Accessory::None,
        Accessory::Glasses,
        Accessory::Bowtie,
        Accessory::Hat,
    ];

    /// Streak length (in days) needed to unlock this accessory
    pub fn required_streak(&self) -> u32 {
        match self {
            Accessory::None => 0,
            Accessory::Glasses => 7,
            Accessory::Bowtie => 15,
            Accessory::Hat => 30,
        }
    }

    /// The best accessory earned by a streak of the given length
    pub fn reward_for_streak(streak: u32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|a| streak >= a.required_streak())
            .unwrap_or(Accessory::None)
    }

    /// All accessories a streak of the given length has unlocked
    pub fn unlocked_by(streak: u32) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|a| streak >= a.required_streak())
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accessory::None => "none",
            Accessory::Glasses => "glasses",
            Accessory::Bowtie => "bowtie",
            Accessory::Hat => "hat",
        }
    }
}

impl fmt::Display for Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Accessory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Accessory::None),
            "glasses" => Ok(Accessory::Glasses),
            "bowtie" => Ok(Accessory::Bowtie),
            "hat" => Ok(Accessory::Hat),
            other => Err(DomainError::Validation {
                message: format!(
                    "Unknown accessory '{}'. Valid options: none, glasses, bowtie, hat",
                    other
                ),
            }),
        }
    }
}

/// A user's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub color: Option<String>,
    pub shape: Option<String>,
    pub accessory: Accessory,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            color: None,
            shape: None,
            accessory: Accessory::None,
        }
    }
}

impl Avatar {
    /// Build an avatar, checking the accessory against the user's best streak
    pub fn new(
        color: Option<String>,
        shape: Option<String>,
        accessory: Accessory,
        best_streak: u32,
    ) -> Result<Self, DomainError> {
        if best_streak < accessory.required_streak() {
            return Err(DomainError::LockedAccessory {
                accessory: accessory.to_string(),
                required: accessory.required_streak(),
                best: best_streak,
            });
        }

        Ok(Self {
            color: clean(color, "Color")?,
            shape: clean(shape, "Shape")?,
            accessory,
        })
    }
}

fn clean(value: Option<String>, field: &str) -> Result<Option<String>, DomainError> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) if v.trim().len() > 50 => Err(DomainError::Validation {
            message: format!("{} cannot be longer than 50 characters", field),
        }),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}
