/// Storage layer for persisting fitness data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving users, workouts, goals and
/// progress measurements. Analytics never write here.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    GoalId, GoalRecord, GoalStatus, ProgressRecord, UserId, UserRecord, WorkoutId, WorkoutRecord,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Workout not found: {workout_id}")]
    WorkoutNotFound { workout_id: String },

    #[error("Goal not found: {goal_id}")]
    GoalNotFound { goal_id: String },

    #[error("User already exists: {field} '{value}' is taken")]
    DuplicateUser { field: String, value: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Date window and cap for workout reads
///
/// Both bounds are inclusive. Results are always in ascending date order;
/// when `limit` cuts the list, the most recent workouts are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkoutQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl WorkoutQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// Workouts on or after `date_from`, capped at `limit`
    pub fn since(date_from: NaiveDate, limit: u32) -> Self {
        Self {
            date_from: Some(date_from),
            date_to: None,
            limit: Some(limit),
        }
    }

    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Trait defining the storage interface for fitness records
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait FitnessStorage {
    /// Create a new user; username and email must be unique
    fn create_user(&self, user: &UserRecord) -> Result<(), StorageError>;

    fn get_user(&self, user_id: &UserId) -> Result<UserRecord, StorageError>;

    fn get_user_by_username(&self, username: &str) -> Result<UserRecord, StorageError>;

    /// Log a new workout
    fn create_workout(&self, workout: &WorkoutRecord) -> Result<(), StorageError>;

    fn get_workout(&self, workout_id: &WorkoutId) -> Result<WorkoutRecord, StorageError>;

    fn update_workout(&self, workout: &WorkoutRecord) -> Result<(), StorageError>;

    /// Permanently delete a workout
    fn delete_workout(&self, workout_id: &WorkoutId) -> Result<(), StorageError>;

    /// Workouts for a user in ascending date order (see `WorkoutQuery`)
    fn get_workouts(&self, user_id: &UserId, query: WorkoutQuery) -> Result<Vec<WorkoutRecord>, StorageError>;

    fn create_goal(&self, goal: &GoalRecord) -> Result<(), StorageError>;

    fn get_goal(&self, goal_id: &GoalId) -> Result<GoalRecord, StorageError>;

    fn update_goal(&self, goal: &GoalRecord) -> Result<(), StorageError>;

    fn delete_goal(&self, goal_id: &GoalId) -> Result<(), StorageError>;

    /// Goals for a user, newest first, optionally filtered by status
    fn get_goals(
        &self,
        user_id: &UserId,
        status: Option<GoalStatus>,
        limit: Option<u32>,
    ) -> Result<Vec<GoalRecord>, StorageError>;

    /// Record a body or performance measurement
    fn create_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError>;

    /// Measurements for a user, newest first, optionally for one metric
    fn get_progress(
        &self,
        user_id: &UserId,
        metric: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<ProgressRecord>, StorageError>;
}
