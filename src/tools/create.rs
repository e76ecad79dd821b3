/// Tools for creating users and goals
///
/// This module implements the user_create and goal_create MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{GoalKind, GoalRecord, UserRecord};
use crate::storage::FitnessStorage;
use crate::tools::{parse_optional_date, parse_user_id, ToolError};

/// Parameters for creating a user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateUserParams {
    /// Unique username (1-50 characters)
    pub username: String,
    /// Unique email address
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub user_id: String,
    pub message: String,
}

pub fn create_user<S: FitnessStorage>(storage: &S, params: CreateUserParams) -> Result<CreateUserResponse, ToolError> {
    let user = UserRecord::new(params.username, params.email)?;
    storage.create_user(&user)?;

    Ok(CreateUserResponse {
        success: true,
        user_id: user.id.to_string(),
        message: format!("✅ Created user '{}'\nUser ID: {}", user.username, user.id),
    })
}

/// Parameters for creating a goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateGoalParams {
    /// Owner of the goal
    pub user_id: String,
    /// total_workouts, calories_burned, total_duration, or any custom tag (e.g. weight_loss)
    pub goal_type: String,
    /// Value to reach; must be greater than 0
    pub target_value: f64,
    /// Progress so far (default 0)
    pub current_value: Option<f64>,
    /// Unit of the values; defaults by goal type (workouts, kcal, minutes)
    pub unit: Option<String>,
    /// Optional deadline (YYYY-MM-DD)
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateGoalResponse {
    pub success: bool,
    pub goal_id: String,
    pub message: String,
}

fn default_unit(kind: &GoalKind) -> Option<&'static str> {
    match kind {
        GoalKind::TotalWorkouts => Some("workouts"),
        GoalKind::CaloriesBurned => Some("kcal"),
        GoalKind::TotalDuration => Some("minutes"),
        GoalKind::Other(_) => None,
    }
}

pub fn create_goal<S: FitnessStorage>(storage: &S, params: CreateGoalParams) -> Result<CreateGoalResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    storage.get_user(&user_id)?;

    let kind = GoalKind::from(params.goal_type);
    let unit = match params.unit {
        Some(unit) => unit,
        None => default_unit(&kind)
            .map(str::to_string)
            .ok_or_else(|| ToolError::InvalidArgument("A unit is required for custom goal types".to_string()))?,
    };
    let deadline = parse_optional_date(params.deadline.as_deref())?;

    let goal = GoalRecord::new(
        user_id,
        kind,
        params.target_value,
        params.current_value.unwrap_or(0.0),
        unit,
        deadline,
    )?;
    storage.create_goal(&goal)?;

    let deadline_note = goal
        .deadline
        .map(|d| format!(" by {}", d))
        .unwrap_or_default();

    Ok(CreateGoalResponse {
        success: true,
        goal_id: goal.id.to_string(),
        message: format!(
            "🎯 Created goal: {} {} {}{}\nGoal ID: {}",
            goal.goal_type.display_name(),
            goal.target_value,
            goal.unit,
            deadline_note,
            goal.id
        ),
    })
}
