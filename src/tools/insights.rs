/// Tools for AI-written insights and workout recommendations
///
/// This module implements the fitness_insights and workout_recommendation
/// MCP tools. Both load the relevant window of records, compute statistics
/// locally and hand them to the injected generator. Generation problems
/// never surface as tool errors; the response carries `success: false` and
/// a fallback payload instead.

use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{GoalRecord, GoalStatus, UserId, WorkoutRecord};
use crate::insights::{InsightSynthesizer, InsightsResult, WorkoutRecommendation, WorkoutRecommender};
use crate::storage::{FitnessStorage, WorkoutQuery};
use crate::tools::{parse_user_id, ToolError};

const DEFAULT_INSIGHT_DAYS: u32 = 90;
const MAX_INSIGHT_DAYS: u32 = 365;
const INSIGHT_GOAL_LIMIT: u32 = 5;
/// Window the recommender treats as "recent"
pub const RECENT_WINDOW_DAYS: i64 = 14;
const RECOMMENDATION_HISTORY_LIMIT: u32 = 500;
const RECOMMENDATION_GOAL_LIMIT: u32 = 10;

/// Parameters for fitness_insights
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsightsParams {
    pub user_id: String,
    /// How many days of history to analyze (default 90, max 365)
    pub days: Option<u32>,
    /// Also suggest the next workout (default false)
    pub include_recommendation: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub days: u32,
    #[serde(flatten)]
    pub result: InsightsResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<WorkoutRecommendation>,
}

fn active_goals<S: FitnessStorage>(storage: &S, user_id: &UserId, limit: u32) -> Result<Vec<GoalRecord>, ToolError> {
    Ok(storage.get_goals(user_id, Some(GoalStatus::Active), Some(limit))?)
}

/// Workouts within the last `days` days of the engine's reference date
fn recent_slice(workouts: &[WorkoutRecord], engine: AnalyticsEngine, days: i64) -> &[WorkoutRecord] {
    let cutoff = engine.today() - Duration::days(days);
    let start = workouts.partition_point(|w| w.date < cutoff);
    &workouts[start..]
}

pub async fn fitness_insights<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    synthesizer: &InsightSynthesizer,
    recommender: &WorkoutRecommender,
    params: InsightsParams,
) -> Result<InsightsResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let days = params.days.unwrap_or(DEFAULT_INSIGHT_DAYS);
    if days == 0 || days > MAX_INSIGHT_DAYS {
        return Err(ToolError::InvalidArgument(format!(
            "days must be between 1 and {}",
            MAX_INSIGHT_DAYS
        )));
    }

    let workouts = storage.get_workouts(
        &user_id,
        WorkoutQuery {
            date_from: Some(engine.today() - Duration::days(i64::from(days))),
            ..WorkoutQuery::all()
        },
    )?;
    let goals = active_goals(storage, &user_id, INSIGHT_GOAL_LIMIT)?;
    let stats = engine.statistics(&workouts);

    let (result, recommendation) = if params.include_recommendation.unwrap_or(false) {
        let recent = recent_slice(&workouts, engine, RECENT_WINDOW_DAYS);
        let (result, recommendation) = futures::join!(
            synthesizer.synthesize(&stats, &goals),
            recommender.recommend(recent, &stats, &goals)
        );
        (result, Some(recommendation))
    } else {
        (synthesizer.synthesize(&stats, &goals).await, None)
    };

    Ok(InsightsResponse {
        days,
        result,
        recommendation,
    })
}

pub async fn workout_recommendation<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    recommender: &WorkoutRecommender,
    params: super::UserParams,
) -> Result<WorkoutRecommendation, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let history = storage.get_workouts(&user_id, WorkoutQuery::latest(RECOMMENDATION_HISTORY_LIMIT))?;
    let recent = recent_slice(&history, engine, RECENT_WINDOW_DAYS);
    let stats = engine.statistics(&history);
    let goals = active_goals(storage, &user_id, RECOMMENDATION_GOAL_LIMIT)?;

    Ok(recommender.recommend(recent, &stats, &goals).await)
}
