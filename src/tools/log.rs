/// Tools for logging workouts and progress measurements
///
/// This module implements the workout_log and progress_log MCP tools.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{ProgressRecord, StreakResult, WorkoutRecord};
use crate::storage::{FitnessStorage, WorkoutQuery};
use crate::tools::{parse_optional_date, parse_user_id, ToolError};

/// Parameters for logging a workout
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogWorkoutParams {
    pub user_id: String,
    /// Workout type, e.g. running, cycling, strength, yoga
    pub workout_type: String,
    /// Duration in minutes (1-1440)
    pub duration: u32,
    /// Estimated calories burned (default 0)
    pub calories_burned: Option<f64>,
    /// Date of the workout (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
    /// Optional notes (max 500 characters)
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogWorkoutResponse {
    pub success: bool,
    pub workout_id: String,
    pub current_streak: u32,
    pub message: String,
}

/// Log a workout and report the streak it leaves the user on
pub fn log_workout<S: FitnessStorage>(storage: &S, params: LogWorkoutParams) -> Result<LogWorkoutResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let date = parse_optional_date(params.date.as_deref())?.unwrap_or_else(|| Utc::now().naive_utc().date());

    let workout = WorkoutRecord::new(
        user_id,
        params.workout_type,
        params.duration,
        params.calories_burned.unwrap_or(0.0),
        date,
        params.notes,
    )?;
    storage.create_workout(&workout)?;

    let history = storage.get_workouts(&user_id, WorkoutQuery::all())?;
    let streak = StreakResult::calculate(&history);

    Ok(LogWorkoutResponse {
        success: true,
        workout_id: workout.id.to_string(),
        current_streak: streak.current_streak,
        message: format!(
            "🔥 Logged {} min of {} on {}! Current streak: {} day{}\nWorkout ID: {}",
            workout.duration_minutes,
            workout.workout_type,
            workout.date,
            streak.current_streak,
            if streak.current_streak == 1 { "" } else { "s" },
            workout.id
        ),
    })
}

/// Parameters for logging a body or performance measurement
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogProgressParams {
    pub user_id: String,
    /// What was measured, e.g. weight, body_fat, resting_hr
    pub metric: String,
    pub value: f64,
    /// Unit of the value, e.g. kg, %, bpm
    pub unit: String,
    /// Date of the measurement (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogProgressResponse {
    pub success: bool,
    pub progress_id: String,
    pub message: String,
}

pub fn log_progress<S: FitnessStorage>(storage: &S, params: LogProgressParams) -> Result<LogProgressResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let date = parse_optional_date(params.date.as_deref())?.unwrap_or_else(|| Utc::now().naive_utc().date());
    let entry = ProgressRecord::new(user_id, params.metric, params.value, params.unit, date, params.notes)?;
    storage.create_progress(&entry)?;

    Ok(LogProgressResponse {
        success: true,
        progress_id: entry.id.to_string(),
        message: format!("📏 Recorded {}: {} {} on {}", entry.metric, entry.value, entry.unit, entry.date),
    })
}
