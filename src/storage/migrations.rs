/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 2;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    } else if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "Database schema version {} is newer than this build supports ({})",
            current_version, CURRENT_VERSION
        )));
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0); // No version row yet means a fresh database

    Ok(version)
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }
    if from_version < 2 {
        migration_v2(conn)?;
    }

    Ok(())
}

/// Migration to version 1: users, workouts and goals
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS workouts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            workout_type TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            calories_burned REAL NOT NULL DEFAULT 0,
            workout_date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            target_value REAL NOT NULL,
            current_value REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL,
            deadline TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )",
        [],
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created users, workouts and goals tables");
    Ok(())
}

fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Per-user date-ordered reads drive every analytics request
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_workouts_user_date
         ON workouts (user_id, workout_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_goals_user_status
         ON goals (user_id, status)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}

/// Migration to version 2: progress measurements
fn migration_v2(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS progress_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            metric TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            measured_on TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_progress_user_metric_date
         ON progress_entries (user_id, metric, measured_on)",
        [],
    )?;

    tracing::info!("Applied migration v2: Created progress_entries table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_database() {
        let conn = Connection::open_in_memory().unwrap();

        // Should succeed on a fresh database
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        // Should succeed when called again (idempotent)
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('users', 'workouts', 'goals', 'progress_entries')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 4);
    }

    #[test]
    fn test_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_database(&conn).unwrap();
        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_upgrade_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE schema_version (version INTEGER PRIMARY KEY)", []).unwrap();
        migration_v1(&conn).unwrap();
        set_version(&conn, 1).unwrap();

        initialize_database(&conn).unwrap();

        let has_progress: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'progress_entries'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(has_progress, 1);
        assert_eq!(get_current_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        set_version(&conn, CURRENT_VERSION + 1).unwrap();

        assert!(matches!(initialize_database(&conn), Err(StorageError::Migration(_))));
    }
}
