/// Tools for changing and removing workouts and goals
///
/// This module implements the workout_update, workout_delete, goal_update and
/// goal_delete MCP tools. Every call names the acting user and is rejected
/// when the record belongs to someone else.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{GoalRecord, GoalStatus, UserId, WorkoutRecord};
use crate::storage::FitnessStorage;
use crate::tools::{parse_goal_id, parse_optional_date, parse_user_id, parse_workout_id, ToolError};

/// Shared response for update and delete tools
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub success: bool,
    pub message: String,
}

fn ensure_owner(owner: &UserId, acting: &UserId, what: &str) -> Result<(), ToolError> {
    if owner != acting {
        return Err(ToolError::Forbidden(format!("This {} belongs to another user", what)));
    }
    Ok(())
}

/// Parameters for updating a workout; omitted fields are left unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateWorkoutParams {
    pub user_id: String,
    pub workout_id: String,
    pub workout_type: Option<String>,
    pub duration: Option<u32>,
    pub calories_burned: Option<f64>,
    /// New date (YYYY-MM-DD)
    pub date: Option<String>,
    /// New notes; an empty string clears them
    pub notes: Option<String>,
}

pub fn update_workout<S: FitnessStorage>(storage: &S, params: UpdateWorkoutParams) -> Result<ChangeResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let workout_id = parse_workout_id(&params.workout_id)?;

    let mut workout: WorkoutRecord = storage.get_workout(&workout_id)?;
    ensure_owner(&workout.user_id, &user_id, "workout")?;

    let date = parse_optional_date(params.date.as_deref())?;
    let notes = params
        .notes
        .map(|n| if n.trim().is_empty() { None } else { Some(n) });

    workout.update(params.workout_type, params.duration, params.calories_burned, date, notes)?;
    storage.update_workout(&workout)?;
    debug!("Updated workout {}", workout.id);

    Ok(ChangeResponse {
        success: true,
        message: format!(
            "✅ Updated workout: {} min of {} on {}",
            workout.duration_minutes, workout.workout_type, workout.date
        ),
    })
}

/// Parameters for deleting a workout
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteWorkoutParams {
    pub user_id: String,
    pub workout_id: String,
}

pub fn delete_workout<S: FitnessStorage>(storage: &S, params: DeleteWorkoutParams) -> Result<ChangeResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let workout_id = parse_workout_id(&params.workout_id)?;

    let workout = storage.get_workout(&workout_id)?;
    ensure_owner(&workout.user_id, &user_id, "workout")?;
    storage.delete_workout(&workout_id)?;

    Ok(ChangeResponse {
        success: true,
        message: format!("🗑️ Deleted {} workout from {}", workout.workout_type, workout.date),
    })
}

/// Parameters for updating a goal; omitted fields are left unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateGoalParams {
    pub user_id: String,
    pub goal_id: String,
    pub target_value: Option<f64>,
    /// New progress value
    pub current_value: Option<f64>,
    /// New deadline (YYYY-MM-DD); an empty string removes the deadline
    pub deadline: Option<String>,
    /// active, completed or abandoned
    pub status: Option<String>,
}

pub fn update_goal<S: FitnessStorage>(storage: &S, params: UpdateGoalParams) -> Result<ChangeResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let goal_id = parse_goal_id(&params.goal_id)?;

    let mut goal: GoalRecord = storage.get_goal(&goal_id)?;
    ensure_owner(&goal.user_id, &user_id, "goal")?;

    let deadline = match params.deadline.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(raw) => Some(parse_optional_date(Some(raw))?),
    };
    let mut status = params.status.as_deref().map(GoalStatus::parse).transpose()?;

    // Reaching the target completes an active goal unless a status was given
    let reaches_target = params
        .current_value
        .zip(params.target_value.or(Some(goal.target_value)))
        .is_some_and(|(current, target)| current >= target);
    if status.is_none() && goal.is_active() && reaches_target {
        status = Some(GoalStatus::Completed);
    }

    goal.update(params.target_value, params.current_value, deadline, status)?;
    storage.update_goal(&goal)?;

    let message = if goal.status == GoalStatus::Completed {
        format!("🏆 Goal completed! {}", goal.summary_line())
    } else {
        format!("✅ Updated goal: {}", goal.summary_line())
    };

    Ok(ChangeResponse { success: true, message })
}

/// Parameters for deleting a goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteGoalParams {
    pub user_id: String,
    pub goal_id: String,
}

pub fn delete_goal<S: FitnessStorage>(storage: &S, params: DeleteGoalParams) -> Result<ChangeResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let goal_id = parse_goal_id(&params.goal_id)?;

    let goal = storage.get_goal(&goal_id)?;
    ensure_owner(&goal.user_id, &user_id, "goal")?;
    storage.delete_goal(&goal_id)?;

    Ok(ChangeResponse {
        success: true,
        message: format!("🗑️ Deleted goal: {}", goal.goal_type.display_name()),
    })
}
