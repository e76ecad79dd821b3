/// Read-only lookups over a user's fitness records
///
/// This module implements the fitness_query MCP tool. The caller picks one
/// action and supplies only the arguments that action takes.

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, StatisticsBundle};
use crate::domain::{GoalRecord, GoalStatus, ProgressRecord, UserRecord, WorkoutRecord};
use crate::storage::{FitnessStorage, WorkoutQuery};
use crate::tools::{parse_optional_date, parse_user_id, ToolError};

const DEFAULT_STATS_DAYS: u32 = 30;
const MAX_STATS_DAYS: u32 = 365;
const DEFAULT_LIST_LIMIT: u32 = 50;

/// One query against a user's records
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FitnessQuery {
    /// Look up the user's profile
    GetUser,
    /// Workouts in ascending date order, optionally within a date range
    ListWorkouts {
        /// Earliest date (YYYY-MM-DD), inclusive
        date_from: Option<String>,
        /// Latest date (YYYY-MM-DD), inclusive
        date_to: Option<String>,
        /// Keep only the most recent N workouts (default 50)
        limit: Option<u32>,
    },
    /// Statistics over the last N days (default 30, max 365)
    GetStats { days: Option<u32> },
    /// Goals, newest first, optionally filtered by status
    ListGoals {
        /// active, completed or abandoned
        status: Option<String>,
    },
    /// Progress measurements, newest first
    GetProgress {
        /// Only this metric, e.g. weight
        metric: Option<String>,
        limit: Option<u32>,
    },
}

/// Parameters for the fitness_query tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FitnessQueryParams {
    pub user_id: String,
    #[serde(flatten)]
    pub query: FitnessQuery,
}

/// A goal as shown in listings
#[derive(Debug, Serialize)]
pub struct GoalSummary {
    pub goal_id: String,
    pub goal_type: String,
    pub current_value: f64,
    pub target_value: f64,
    pub unit: String,
    pub progress_percentage: f64,
    pub deadline: Option<NaiveDate>,
    pub status: GoalStatus,
}

impl From<&GoalRecord> for GoalSummary {
    fn from(goal: &GoalRecord) -> Self {
        Self {
            goal_id: goal.id.to_string(),
            goal_type: goal.goal_type.to_string(),
            current_value: goal.current_value,
            target_value: goal.target_value,
            unit: goal.unit.clone(),
            progress_percentage: (goal.progress_percentage() * 10.0).round() / 10.0,
            deadline: goal.deadline,
            status: goal.status,
        }
    }
}

/// Result of a fitness query, tagged with the action that produced it
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FitnessQueryResponse {
    GetUser {
        user: UserRecord,
    },
    ListWorkouts {
        count: usize,
        workouts: Vec<WorkoutRecord>,
    },
    GetStats {
        days: u32,
        date_from: NaiveDate,
        statistics: StatisticsBundle,
    },
    ListGoals {
        count: usize,
        goals: Vec<GoalSummary>,
    },
    GetProgress {
        count: usize,
        entries: Vec<ProgressRecord>,
    },
}

/// Run one lookup; `engine` pins "today" for the stats window
pub fn fitness_query<S: FitnessStorage>(
    storage: &S,
    engine: AnalyticsEngine,
    params: FitnessQueryParams,
) -> Result<FitnessQueryResponse, ToolError> {
    let user_id = parse_user_id(&params.user_id)?;
    let user = storage.get_user(&user_id)?;

    match params.query {
        FitnessQuery::GetUser => Ok(FitnessQueryResponse::GetUser { user }),

        FitnessQuery::ListWorkouts { date_from, date_to, limit } => {
            let date_from = parse_optional_date(date_from.as_deref())?;
            let date_to = parse_optional_date(date_to.as_deref())?;
            if let (Some(from), Some(to)) = (date_from, date_to) {
                if from > to {
                    return Err(ToolError::InvalidArgument(format!(
                        "date_from {} is after date_to {}",
                        from, to
                    )));
                }
            }

            let workouts = storage.get_workouts(
                &user_id,
                WorkoutQuery {
                    date_from,
                    date_to,
                    limit: Some(limit.unwrap_or(DEFAULT_LIST_LIMIT)),
                },
            )?;
            Ok(FitnessQueryResponse::ListWorkouts {
                count: workouts.len(),
                workouts,
            })
        }

        FitnessQuery::GetStats { days } => {
            let days = days.unwrap_or(DEFAULT_STATS_DAYS);
            if days == 0 || days > MAX_STATS_DAYS {
                return Err(ToolError::InvalidArgument(format!(
                    "days must be between 1 and {}",
                    MAX_STATS_DAYS
                )));
            }

            let date_from = engine.today() - Duration::days(i64::from(days));
            let workouts = storage.get_workouts(
                &user_id,
                WorkoutQuery {
                    date_from: Some(date_from),
                    ..WorkoutQuery::all()
                },
            )?;
            Ok(FitnessQueryResponse::GetStats {
                days,
                date_from,
                statistics: engine.statistics(&workouts),
            })
        }

        FitnessQuery::ListGoals { status } => {
            let status = status.as_deref().map(GoalStatus::parse).transpose()?;
            let goals = storage.get_goals(&user_id, status, None)?;
            let goals: Vec<GoalSummary> = goals.iter().map(GoalSummary::from).collect();
            Ok(FitnessQueryResponse::ListGoals {
                count: goals.len(),
                goals,
            })
        }

        FitnessQuery::GetProgress { metric, limit } => {
            let metric = metric.map(|m| m.trim().to_lowercase());
            let entries = storage.get_progress(&user_id, metric.as_deref(), Some(limit.unwrap_or(DEFAULT_LIST_LIMIT)))?;
            Ok(FitnessQueryResponse::GetProgress {
                count: entries.len(),
                entries,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GoalKind;
    use crate::storage::SqliteStorage;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn setup() -> (SqliteStorage, UserRecord) {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = UserRecord::new("kai".to_string(), "kai@example.com".to_string()).unwrap();
        storage.create_user(&user).unwrap();

        for (d, kind) in [(1, "running"), (3, "yoga"), (10, "running"), (20, "cycling")] {
            let workout = WorkoutRecord::new(user.id, kind.to_string(), 30, 250.0, day(d), None).unwrap();
            storage.create_workout(&workout).unwrap();
        }
        (storage, user)
    }

    fn params(user: &UserRecord, query: serde_json::Value) -> FitnessQueryParams {
        let mut value = query;
        value["user_id"] = json!(user.id.to_string());
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_query_deserializes_from_action_tag() {
        let parsed: FitnessQueryParams = serde_json::from_value(json!({
            "user_id": "abc",
            "action": "list_workouts",
            "date_from": "2024-06-01",
            "limit": 5
        }))
        .unwrap();
        assert!(matches!(
            parsed.query,
            FitnessQuery::ListWorkouts { limit: Some(5), date_to: None, .. }
        ));

        let unknown = serde_json::from_value::<FitnessQueryParams>(json!({"user_id": "abc", "action": "drop_tables"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_list_workouts_in_range() {
        let (storage, user) = setup();
        let engine = AnalyticsEngine::as_of(day(25));

        let response = fitness_query(
            &storage,
            engine,
            params(&user, json!({"action": "list_workouts", "date_from": "2024-06-02", "date_to": "2024-06-15"})),
        )
        .unwrap();

        match response {
            FitnessQueryResponse::ListWorkouts { count, workouts } => {
                assert_eq!(count, 2);
                assert_eq!(workouts[0].date, day(3));
                assert_eq!(workouts[1].date, day(10));
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let reversed = fitness_query(
            &storage,
            engine,
            params(&user, json!({"action": "list_workouts", "date_from": "2024-06-15", "date_to": "2024-06-02"})),
        );
        assert!(matches!(reversed, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_get_stats_window() {
        let (storage, user) = setup();
        let engine = AnalyticsEngine::as_of(day(25));

        let response = fitness_query(&storage, engine, params(&user, json!({"action": "get_stats", "days": 10}))).unwrap();
        match response {
            FitnessQueryResponse::GetStats { days, date_from, statistics } => {
                assert_eq!(days, 10);
                assert_eq!(date_from, day(15));
                assert_eq!(statistics.total_workouts, 1);
                assert_eq!(statistics.days_since_last, 5);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let too_long = fitness_query(&storage, engine, params(&user, json!({"action": "get_stats", "days": 400})));
        assert!(matches!(too_long, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_list_goals_by_status() {
        let (storage, user) = setup();
        let mut done = GoalRecord::new(user.id, GoalKind::TotalWorkouts, 10.0, 10.0, "workouts".to_string(), None).unwrap();
        done.update(None, None, None, Some(GoalStatus::Completed)).unwrap();
        storage.create_goal(&done).unwrap();
        let open = GoalRecord::new(user.id, GoalKind::TotalDuration, 600.0, 150.0, "minutes".to_string(), None).unwrap();
        storage.create_goal(&open).unwrap();

        let response = fitness_query(&storage, AnalyticsEngine::new(), params(&user, json!({"action": "list_goals", "status": "active"}))).unwrap();
        match response {
            FitnessQueryResponse::ListGoals { count, goals } => {
                assert_eq!(count, 1);
                assert_eq!(goals[0].goal_type, "total_duration");
                assert_eq!(goals[0].progress_percentage, 25.0);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_get_user_and_progress() {
        let (storage, user) = setup();
        let entry = ProgressRecord::new(user.id, "weight".to_string(), 70.0, "kg".to_string(), day(2), None).unwrap();
        storage.create_progress(&entry).unwrap();

        let response = fitness_query(&storage, AnalyticsEngine::new(), params(&user, json!({"action": "get_user"}))).unwrap();
        assert!(matches!(response, FitnessQueryResponse::GetUser { ref user } if user.username == "kai"));

        let response =
            fitness_query(&storage, AnalyticsEngine::new(), params(&user, json!({"action": "get_progress", "metric": "Weight"}))).unwrap();
        assert!(matches!(response, FitnessQueryResponse::GetProgress { count: 1, .. }));

        let serialized = serde_json::to_value(
            fitness_query(&storage, AnalyticsEngine::new(), params(&user, json!({"action": "get_progress"}))).unwrap(),
        )
        .unwrap();
        assert_eq!(serialized["action"], "get_progress");
    }
}
