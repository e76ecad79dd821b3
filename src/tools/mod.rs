/// MCP tools for fitness tracking
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call to interact with the fitness tracker. Each tool takes a typed
/// parameter struct whose JSON schema is advertised through `tools/list`.

pub mod create;
pub mod log;
pub mod update;
pub mod query;
pub mod status;
pub mod insights;

// Re-export tool functions for easy access
pub use create::*;
pub use log::*;
pub use update::*;
pub use query::*;
pub use status::*;
pub use insights::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DomainError, GoalId, UserId, WorkoutId};
use crate::storage::StorageError;

/// Errors that a tool call can report back to the client
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Forbidden(String),
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ToolError> {
    UserId::from_string(raw).map_err(|_| ToolError::InvalidArgument(format!("'{}' is not a valid user ID", raw)))
}

pub(crate) fn parse_workout_id(raw: &str) -> Result<WorkoutId, ToolError> {
    WorkoutId::from_string(raw)
        .map_err(|_| ToolError::InvalidArgument(format!("'{}' is not a valid workout ID", raw)))
}

pub(crate) fn parse_goal_id(raw: &str) -> Result<GoalId, ToolError> {
    GoalId::from_string(raw).map_err(|_| ToolError::InvalidArgument(format!("'{}' is not a valid goal ID", raw)))
}

/// Parse a YYYY-MM-DD date argument
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::InvalidArgument(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

pub(crate) fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ToolError> {
    raw.map(parse_date).transpose()
}
