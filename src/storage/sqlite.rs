/// SQLite implementation of the fitness storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving fitness records. It handles all SQL queries and row
/// conversion. Dates and timestamps go through rusqlite's chrono support.

use std::path::PathBuf;

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, Row};

use crate::domain::{
    GoalId, GoalKind, GoalRecord, GoalStatus, ProgressId, ProgressRecord, UserId, UserRecord, WorkoutId,
    WorkoutRecord,
};
use crate::storage::{migrations, FitnessStorage, StorageError, WorkoutQuery};

const WORKOUT_COLUMNS: &str =
    "id, user_id, workout_type, duration_minutes, calories_burned, workout_date, notes, created_at";
const GOAL_COLUMNS: &str =
    "id, user_id, goal_type, target_value, current_value, unit, deadline, status, created_at, updated_at";
const PROGRESS_COLUMNS: &str = "id, user_id, metric, value, unit, measured_on, notes, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the FitnessStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Storage backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Map a UNIQUE violation on the users table to a typed error
    fn map_user_insert_error(e: rusqlite::Error, user: &UserRecord) -> StorageError {
        if let rusqlite::Error::SqliteFailure(err, Some(message)) = &e {
            if err.code == ErrorCode::ConstraintViolation {
                if message.contains("users.email") {
                    return StorageError::DuplicateUser {
                        field: "email".to_string(),
                        value: user.email.clone(),
                    };
                }
                if message.contains("users.username") {
                    return StorageError::DuplicateUser {
                        field: "username".to_string(),
                        value: user.username.clone(),
                    };
                }
            }
        }
        StorageError::Query(e)
    }
}

fn parse_id<T>(idx: usize, raw: String, parse: fn(&str) -> Result<T, uuid::Error>) -> rusqlite::Result<T> {
    parse(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord::from_existing(
        parse_id(0, row.get(0)?, UserId::from_string)?,
        row.get(1)?, // username
        row.get(2)?, // email
        row.get(3)?, // created_at
    ))
}

fn row_to_workout(row: &Row<'_>) -> rusqlite::Result<WorkoutRecord> {
    Ok(WorkoutRecord::from_existing(
        parse_id(0, row.get(0)?, WorkoutId::from_string)?,
        parse_id(1, row.get(1)?, UserId::from_string)?,
        row.get(2)?, // workout_type
        row.get(3)?, // duration_minutes
        row.get(4)?, // calories_burned
        row.get(5)?, // workout_date
        row.get(6)?, // notes
        row.get(7)?, // created_at
    ))
}

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<GoalRecord> {
    let goal_type: String = row.get(2)?;
    let status_str: String = row.get(7)?;
    let status = GoalStatus::parse(&status_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(GoalRecord::from_existing(
        parse_id(0, row.get(0)?, GoalId::from_string)?,
        parse_id(1, row.get(1)?, UserId::from_string)?,
        GoalKind::from(goal_type),
        row.get(3)?, // target_value
        row.get(4)?, // current_value
        row.get(5)?, // unit
        row.get(6)?, // deadline
        status,
        row.get(8)?, // created_at
        row.get(9)?, // updated_at
    ))
}

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<ProgressRecord> {
    Ok(ProgressRecord::from_existing(
        parse_id(0, row.get(0)?, ProgressId::from_string)?,
        parse_id(1, row.get(1)?, UserId::from_string)?,
        row.get(2)?, // metric
        row.get(3)?, // value
        row.get(4)?, // unit
        row.get(5)?, // measured_on
        row.get(6)?, // notes
        row.get(7)?, // created_at
    ))
}

/// SQLite treats a negative LIMIT as "no limit"
fn sql_limit(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}

impl FitnessStorage for SqliteStorage {
    fn create_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO users (id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id.to_string(), user.username, user.email, user.created_at],
            )
            .map_err(|e| Self::map_user_insert_error(e, user))?;

        tracing::debug!("Created user: {} ({})", user.username, user.id);
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<UserRecord, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            params![user_id.to_string()],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn get_user_by_username(&self, username: &str) -> Result<UserRecord, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, username, email, created_at FROM users WHERE username = ?1",
            params![username],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::UserNotFound {
                user_id: username.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn create_workout(&self, workout: &WorkoutRecord) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO workouts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", WORKOUT_COLUMNS),
            params![
                workout.id.to_string(),
                workout.user_id.to_string(),
                workout.workout_type,
                workout.duration_minutes,
                workout.calories_burned,
                workout.date,
                workout.notes,
                workout.created_at,
            ],
        )?;

        tracing::debug!(
            "Created workout: {} ({} min {}) for user {}",
            workout.id,
            workout.duration_minutes,
            workout.workout_type,
            workout.user_id
        );
        Ok(())
    }

    fn get_workout(&self, workout_id: &WorkoutId) -> Result<WorkoutRecord, StorageError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM workouts WHERE id = ?1", WORKOUT_COLUMNS),
            params![workout_id.to_string()],
            row_to_workout,
        );

        match result {
            Ok(workout) => Ok(workout),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::WorkoutNotFound {
                workout_id: workout_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn update_workout(&self, workout: &WorkoutRecord) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE workouts SET
                workout_type = ?2,
                duration_minutes = ?3,
                calories_burned = ?4,
                workout_date = ?5,
                notes = ?6
             WHERE id = ?1",
            params![
                workout.id.to_string(),
                workout.workout_type,
                workout.duration_minutes,
                workout.calories_burned,
                workout.date,
                workout.notes,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::WorkoutNotFound {
                workout_id: workout.id.to_string(),
            });
        }

        tracing::debug!("Updated workout: {}", workout.id);
        Ok(())
    }

    fn delete_workout(&self, workout_id: &WorkoutId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![workout_id.to_string()])?;

        if rows_affected == 0 {
            return Err(StorageError::WorkoutNotFound {
                workout_id: workout_id.to_string(),
            });
        }

        tracing::debug!("Deleted workout: {}", workout_id);
        Ok(())
    }

    fn get_workouts(&self, user_id: &UserId, query: WorkoutQuery) -> Result<Vec<WorkoutRecord>, StorageError> {
        // Newest rows survive the LIMIT, then the outer query restores ascending order
        let sql = format!(
            "SELECT {cols} FROM (
                SELECT {cols} FROM workouts
                WHERE user_id = ?1
                  AND (?2 IS NULL OR workout_date >= ?2)
                  AND (?3 IS NULL OR workout_date <= ?3)
                ORDER BY workout_date DESC, created_at DESC
                LIMIT ?4
             )
             ORDER BY workout_date ASC, created_at ASC",
            cols = WORKOUT_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let workout_iter = stmt.query_map(
            params![user_id.to_string(), query.date_from, query.date_to, sql_limit(query.limit)],
            row_to_workout,
        )?;

        let mut workouts = Vec::new();
        for workout in workout_iter {
            workouts.push(workout?);
        }

        Ok(workouts)
    }

    fn create_goal(&self, goal: &GoalRecord) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)", GOAL_COLUMNS),
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.goal_type.as_str(),
                goal.target_value,
                goal.current_value,
                goal.unit,
                goal.deadline,
                goal.status.as_str(),
                goal.created_at,
                goal.updated_at,
            ],
        )?;

        tracing::debug!("Created goal: {} ({}) for user {}", goal.id, goal.goal_type, goal.user_id);
        Ok(())
    }

    fn get_goal(&self, goal_id: &GoalId) -> Result<GoalRecord, StorageError> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS),
            params![goal_id.to_string()],
            row_to_goal,
        );

        match result {
            Ok(goal) => Ok(goal),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::GoalNotFound {
                goal_id: goal_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn update_goal(&self, goal: &GoalRecord) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE goals SET
                target_value = ?2,
                current_value = ?3,
                deadline = ?4,
                status = ?5,
                updated_at = ?6
             WHERE id = ?1",
            params![
                goal.id.to_string(),
                goal.target_value,
                goal.current_value,
                goal.deadline,
                goal.status.as_str(),
                goal.updated_at,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal.id.to_string(),
            });
        }

        tracing::debug!("Updated goal: {} (status {})", goal.id, goal.status);
        Ok(())
    }

    fn delete_goal(&self, goal_id: &GoalId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![goal_id.to_string()])?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal_id.to_string(),
            });
        }

        tracing::debug!("Deleted goal: {}", goal_id);
        Ok(())
    }

    fn get_goals(
        &self,
        user_id: &UserId,
        status: Option<GoalStatus>,
        limit: Option<u32>,
    ) -> Result<Vec<GoalRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM goals
             WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC
             LIMIT ?3",
            GOAL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let goal_iter = stmt.query_map(
            params![user_id.to_string(), status.map(|s| s.as_str()), sql_limit(limit)],
            row_to_goal,
        )?;

        let mut goals = Vec::new();
        for goal in goal_iter {
            goals.push(goal?);
        }

        Ok(goals)
    }

    fn create_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO progress_entries ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", PROGRESS_COLUMNS),
            params![
                progress.id.to_string(),
                progress.user_id.to_string(),
                progress.metric,
                progress.value,
                progress.unit,
                progress.date,
                progress.notes,
                progress.created_at,
            ],
        )?;

        tracing::debug!("Recorded {} = {} {} for user {}", progress.metric, progress.value, progress.unit, progress.user_id);
        Ok(())
    }

    fn get_progress(
        &self,
        user_id: &UserId,
        metric: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM progress_entries
             WHERE user_id = ?1 AND (?2 IS NULL OR metric = ?2)
             ORDER BY measured_on DESC, created_at DESC
             LIMIT ?3",
            PROGRESS_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let progress_iter = stmt.query_map(
            params![user_id.to_string(), metric.map(|m| m.trim().to_lowercase()), sql_limit(limit)],
            row_to_progress,
        )?;

        let mut entries = Vec::new();
        for entry in progress_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }
}
