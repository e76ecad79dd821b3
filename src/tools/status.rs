/// Tools reporting analytics, streaks, goal projections and exports
///
/// This module implements the fitness_analytics, workout_streak,
/// goal_predictions and workout_export MCP tools.

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{workouts_to_csv, AnalyticsEngine, AnalyticsReport, GoalPrediction};
use crate::domain::{GoalStatus, StreakResult};
use crate::insights::InsightSynthesizer;
use crate::storage::{FitnessStorage, WorkoutQuery};
use crate::tools::{parse_optional_date, parse_user_id, ToolError};

/// Most workouts loaded for a full analytics report
pub const ANALYTICS_RECORD_LIMIT: u32 = 1000;
/// Trailing window the goal projections are based on
pub const PREDICTION_WINDOW_DAYS: i64 = 60;
const PREDICTION_GOAL_LIMIT: u32 = 20;

/// Parameters shared by the tools that only need a user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserParams {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub report: AnalyticsReport,
    pub message: String,
}

pub fn fitness_analytics<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    params: UserParams,
) -> Result<AnalyticsResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let workouts = storage.get_workouts(&user_id, WorkoutQuery::latest(ANALYTICS_RECORD_LIMIT))?;
    let report = engine.report(&workouts);
    let message = report.streak.motivational_message();

    Ok(AnalyticsResponse {
        user_id: user_id.to_string(),
        report,
        message,
    })
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    #[serde(flatten)]
    pub streak: StreakResult,
    /// True when a workout today or yesterday keeps the streak alive
    pub on_track: bool,
    pub message: String,
}

pub fn workout_streak<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    params: UserParams,
) -> Result<StreakResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    // Streak lengths need every distinct day, so no record cap here
    let workouts = storage.get_workouts(&user_id, WorkoutQuery::all())?;
    let streak = engine.streak(&workouts);

    Ok(StreakResponse {
        on_track: streak.is_on_track(engine.today()),
        message: streak.motivational_message(),
        streak,
    })
}

/// Parameters for goal_predictions
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PredictionParams {
    pub user_id: String,
    /// Ask the model for one tip per goal (default false)
    pub include_tips: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PredictionEntry {
    #[serde(flatten)]
    pub prediction: GoalPrediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub window_days: i64,
    pub workouts_per_week: f64,
    pub predictions: Vec<PredictionEntry>,
}

/// Project completion dates for the user's active goals
pub async fn goal_predictions<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    synthesizer: &InsightSynthesizer,
    params: PredictionParams,
) -> Result<PredictionResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let goals = storage.get_goals(&user_id, Some(GoalStatus::Active), Some(PREDICTION_GOAL_LIMIT))?;
    let workouts = storage.get_workouts(
        &user_id,
        WorkoutQuery {
            date_from: Some(engine.today() - Duration::days(PREDICTION_WINDOW_DAYS)),
            ..WorkoutQuery::all()
        },
    )?;

    let stats = engine.statistics(&workouts);
    let predictions = engine.predictions(&goals, &workouts);

    let tips: Vec<Option<String>> = if params.include_tips.unwrap_or(false) {
        join_all(predictions.iter().map(|p| synthesizer.goal_tip(p, &stats)))
            .await
            .into_iter()
            .map(Some)
            .collect()
    } else {
        vec![None; predictions.len()]
    };

    Ok(PredictionResponse {
        window_days: PREDICTION_WINDOW_DAYS,
        workouts_per_week: stats.workouts_per_week,
        predictions: predictions
            .into_iter()
            .zip(tips)
            .map(|(prediction, tip)| PredictionEntry { prediction, tip })
            .collect(),
    })
}

/// Parameters for workout_export
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportParams {
    pub user_id: String,
    /// Earliest date (YYYY-MM-DD), inclusive
    pub date_from: Option<String>,
    /// Latest date (YYYY-MM-DD), inclusive
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub count: usize,
    pub filename: String,
    pub csv: String,
}

pub fn workout_export<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    params: ExportParams,
) -> Result<ExportResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let user = storage.get_user(&user_id)?;

    let date_from: Option<NaiveDate> = parse_optional_date(params.date_from.as_deref())?;
    let date_to: Option<NaiveDate> = parse_optional_date(params.date_to.as_deref())?;
    let workouts = storage.get_workouts(
        &user_id,
        WorkoutQuery {
            date_from,
            date_to,
            limit: None,
        },
    )?;

    Ok(ExportResponse {
        success: true,
        count: workouts.len(),
        filename: format!("workouts_{}_{}.csv", user.username, engine.today().format("%Y%m%d")),
        csv: workouts_to_csv(&workouts),
    })
}
