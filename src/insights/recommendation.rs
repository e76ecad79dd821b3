/// Next-workout recommendation
///
/// Looks at the most recent workouts, the all-time statistics and active
/// goals, and asks the generator for one concrete session. Falls back to a
/// fixed moderate cardio session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::StatisticsBundle;
use crate::domain::{GoalRecord, WorkoutRecord};
use crate::insights::parser::parse_fenced_json;
use crate::insights::prompt::recommendation_prompt;
use crate::insights::{InsightError, TextGenerator};

/// Workouts from the recent window that are shown to the model
const RECENT_WORKOUTS_SHOWN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    workout_type: String,
    duration: u32,
    intensity: Intensity,
    reasoning: String,
    tips: Vec<String>,
    alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecommendation {
    pub workout_type: String,
    /// Minutes
    pub duration: u32,
    pub intensity: Intensity,
    pub reasoning: String,
    pub tips: Vec<String>,
    pub alternatives: Vec<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl WorkoutRecommendation {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            workout_type: "Moderate Cardio".to_string(),
            duration: 30,
            intensity: Intensity::Moderate,
            reasoning: "A balanced cardio session is great for maintaining fitness and can be adapted to your current energy level.".to_string(),
            tips: vec![
                "Start with a 5-minute warm-up".to_string(),
                "Maintain steady breathing throughout".to_string(),
                "Cool down with light stretching".to_string(),
            ],
            alternatives: vec!["Brisk Walk".to_string(), "Light Cycling".to_string()],
            success: false,
            error: Some(error.into()),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct WorkoutRecommender {
    generator: Arc<dyn TextGenerator>,
}

impl WorkoutRecommender {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Recommend the next workout
    ///
    /// `recent` is the short recent window in ascending date order; `stats`
    /// covers the longer history.
    pub async fn recommend(
        &self,
        recent: &[WorkoutRecord],
        stats: &StatisticsBundle,
        active_goals: &[GoalRecord],
    ) -> WorkoutRecommendation {
        match self.try_recommend(recent, stats, active_goals).await {
            Ok(payload) => WorkoutRecommendation {
                workout_type: payload.workout_type,
                duration: payload.duration,
                intensity: payload.intensity,
                reasoning: payload.reasoning,
                tips: payload.tips,
                alternatives: payload.alternatives,
                success: true,
                error: None,
                generated_at: Utc::now(),
            },
            Err(e) => {
                warn!("Workout recommendation via {} failed: {}", self.generator.name(), e);
                WorkoutRecommendation::fallback(e.to_string())
            }
        }
    }

    async fn try_recommend(
        &self,
        recent: &[WorkoutRecord],
        stats: &StatisticsBundle,
        active_goals: &[GoalRecord],
    ) -> Result<RecommendationPayload, InsightError> {
        let skip = recent.len().saturating_sub(RECENT_WORKOUTS_SHOWN);
        let recent_types: Vec<String> = recent[skip..].iter().map(|w| w.workout_type.clone()).collect();
        let last_type = recent.last().map(|w| w.workout_type.as_str()).unwrap_or("none");

        let prompt = recommendation_prompt(&recent_types, last_type, stats, active_goals);
        let text = self.generator.generate(&prompt).await?;
        debug!("Received {} chars of recommendation text", text.len());

        Ok(parse_fenced_json(&text)?)
    }
}
