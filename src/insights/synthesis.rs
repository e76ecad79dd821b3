/// Insight synthesis from workout statistics
///
/// One generation attempt per request. Whatever goes wrong (no provider,
/// HTTP failure, malformed JSON, an empty insight list) the caller gets the
/// fixed fallback payload with `success = false` and the reason in `error`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::{GoalPrediction, StatisticsBundle};
use crate::domain::GoalRecord;
use crate::insights::parser::{parse_fenced_json, ParseError};
use crate::insights::prompt::{goal_tip_prompt, insights_prompt};
use crate::insights::{InsightError, TextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Pattern,
    Achievement,
    Recommendation,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub impact: Impact,
    pub emoji: String,
}

/// The part of the result the model is asked to produce
#[derive(Debug, Deserialize)]
struct InsightsPayload {
    insights: Vec<Insight>,
    summary: String,
    motivation: String,
}

/// Insights for one user, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResult {
    pub insights: Vec<Insight>,
    pub summary: String,
    pub motivation: String,
    pub statistics: StatisticsBundle,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsightsResult {
    /// The fixed payload returned whenever synthesis fails
    pub fn fallback(statistics: StatisticsBundle, error: impl Into<String>) -> Self {
        Self {
            insights: vec![Insight {
                kind: InsightKind::Pattern,
                title: "Keep Building Your Routine".to_string(),
                message: "Start tracking your workouts to unlock personalized AI insights. The more data you log, the smarter your recommendations become!".to_string(),
                impact: Impact::Medium,
                emoji: "📊".to_string(),
            }],
            summary: "Begin your fitness journey by logging workouts and setting goals. AI insights will appear as you build your workout history.".to_string(),
            motivation: "Every fitness journey starts with a single workout. You've got this!".to_string(),
            statistics,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Turns statistics into narrative insights through an injected generator
#[derive(Clone)]
pub struct InsightSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl InsightSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate insights for a statistics bundle and the user's active goals
    ///
    /// Never fails: any generation or parse error yields the fallback.
    pub async fn synthesize(&self, stats: &StatisticsBundle, active_goals: &[GoalRecord]) -> InsightsResult {
        match self.try_synthesize(stats, active_goals).await {
            Ok(payload) => InsightsResult {
                insights: payload.insights,
                summary: payload.summary,
                motivation: payload.motivation,
                statistics: stats.clone(),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!("Insight generation via {} failed: {}", self.generator.name(), e);
                InsightsResult::fallback(stats.clone(), e.to_string())
            }
        }
    }

    async fn try_synthesize(
        &self,
        stats: &StatisticsBundle,
        active_goals: &[GoalRecord],
    ) -> Result<InsightsPayload, InsightError> {
        let prompt = insights_prompt(stats, active_goals);
        let text = self.generator.generate(&prompt).await?;
        debug!("Received {} chars of insight text", text.len());

        let payload: InsightsPayload = parse_fenced_json(&text)?;
        if payload.insights.is_empty() {
            return Err(ParseError::Schema("insights list is empty".to_string()).into());
        }
        Ok(payload)
    }

    /// One actionable tip for reaching a projected goal sooner
    ///
    /// Falls back to a pace-based sentence when generation fails.
    pub async fn goal_tip(&self, prediction: &GoalPrediction, stats: &StatisticsBundle) -> String {
        let prompt = goal_tip_prompt(prediction, stats);
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_goal_tip(prediction, stats),
            Err(e) => {
                debug!("Goal tip generation failed, using fallback: {}", e);
                fallback_goal_tip(prediction, stats)
            }
        }
    }
}

fn fallback_goal_tip(prediction: &GoalPrediction, stats: &StatisticsBundle) -> String {
    if stats.workouts_per_week <= 0.0 {
        return "Log a few workouts this week to start building momentum toward this goal.".to_string();
    }
    if prediction.on_track {
        format!(
            "Keep up your pace of {} workouts per week to stay on track.",
            stats.workouts_per_week
        )
    } else {
        format!(
            "Add one more session per week on top of your current {} to reach this goal before the deadline.",
            stats.workouts_per_week
        )
    }
}
