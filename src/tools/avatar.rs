/// Tools for the user's avatar
///
/// This module implements avatar_get and avatar_set. Accessories unlock at
/// streak milestones reached on any of the user's habits.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{Accessory, Avatar, UserId};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for customizing the avatar
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AvatarParams {
    /// Avatar color (optional, empty clears it)
    pub color: Option<String>,
    /// Avatar shape (optional, empty clears it)
    pub shape: Option<String>,
    /// Accessory: 'none', 'glasses', 'bowtie' or 'hat' (optional, defaults to none)
    pub accessory: Option<String>,
}

/// Response with the avatar and what the user has unlocked
#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: Avatar,
    /// Longest streak of any habit, which drives unlocks
    pub best_streak: u32,
    pub unlocked: Vec<Accessory>,
    pub message: String,
}

/// Fetch the avatar, falling back to the default one
pub fn get_avatar<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    today: NaiveDate,
) -> Result<AvatarResponse, ToolError> {
    let avatar = storage.get_avatar(user_id)?.unwrap_or_default();
    let best_streak = best_streak(storage, analytics, user_id, today)?;

    let message = match Accessory::ALL.iter().find(|a| a.required_streak() > best_streak) {
        Some(next) => format!(
            "🎨 Reach a {}-day streak to unlock the {}",
            next.required_streak(),
            next
        ),
        None => "🎩 Every accessory unlocked!".to_string(),
    };

    Ok(AvatarResponse {
        avatar,
        best_streak,
        unlocked: Accessory::unlocked_by(best_streak),
        message,
    })
}

/// Replace the avatar; locked accessories are rejected
pub fn set_avatar<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    params: AvatarParams,
    today: NaiveDate,
) -> Result<AvatarResponse, ToolError> {
    let accessory = match params.accessory.as_deref() {
        Some(raw) => raw.parse::<Accessory>()?,
        None => Accessory::None,
    };

    let best_streak = best_streak(storage, analytics, user_id, today)?;
    let avatar = Avatar::new(params.color, params.shape, accessory, best_streak)?;
    storage.save_avatar(user_id, &avatar)?;

    tracing::info!("Saved avatar for {} with accessory {}", user_id, avatar.accessory);

    Ok(AvatarResponse {
        message: format!("✨ Avatar updated (accessory: {})", avatar.accessory),
        avatar,
        best_streak,
        unlocked: Accessory::unlocked_by(best_streak),
    })
}

fn best_streak<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    today: NaiveDate,
) -> Result<u32, ToolError> {
    let habits = storage.list_habits(user_id)?;
    Ok(analytics.user_summary(&habits, today).best_streak)
}
