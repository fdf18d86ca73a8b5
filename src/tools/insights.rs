/// Tool for habit insights
///
/// This module implements the habit_insights tool on top of the analytics
/// engine.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::AnalyticsEngine;
use crate::domain::UserId;
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Response with short text insights
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
}

/// Generate insights across all of the user's habits
pub fn habit_insights<S: HabitStorage + ?Sized>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    today: NaiveDate,
) -> Result<InsightsResponse, ToolError> {
    let habits = storage.list_habits(user_id)?;
    let insights = analytics.generate_insights(&habits, today);
    tracing::debug!("Generated {} insights for {}", insights.len(), user_id);
    Ok(InsightsResponse { insights })
}
