/// Core types and enums used throughout the domain layer
///
/// This module defines the ID newtypes, goal kinds and statuses that are
/// shared by workouts, goals, progress records and the analytics engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Declares a UUID-backed identifier type.
///
/// Each ID is its own type so a goal ID can't be passed where a workout ID
/// is expected.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an ID from its string form (database rows, tool arguments)
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user
    UserId
);
uuid_id!(
    /// Unique identifier for a logged workout
    WorkoutId
);
uuid_id!(
    /// Unique identifier for a goal
    GoalId
);
uuid_id!(
    /// Unique identifier for a progress measurement
    ProgressId
);

/// What a goal measures
///
/// The three well-known kinds have dedicated projection formulas. Anything
/// else is kept verbatim as `Other` and projected with a generic heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalKind {
    /// Number of workouts logged
    TotalWorkouts,
    /// Calories burned across workouts
    CaloriesBurned,
    /// Minutes spent working out
    TotalDuration,
    /// Freeform goal tag (e.g. "weight_loss")
    Other(String),
}

impl GoalKind {
    /// Storage and wire representation
    pub fn as_str(&self) -> &str {
        match self {
            GoalKind::TotalWorkouts => "total_workouts",
            GoalKind::CaloriesBurned => "calories_burned",
            GoalKind::TotalDuration => "total_duration",
            GoalKind::Other(tag) => tag,
        }
    }

    /// Title-cased label used in prompts ("total_workouts" -> "Total Workouts")
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for GoalKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "total_workouts" => GoalKind::TotalWorkouts,
            "calories_burned" => GoalKind::CaloriesBurned,
            "total_duration" => GoalKind::TotalDuration,
            other => GoalKind::Other(other.to_string()),
        }
    }
}

impl From<GoalKind> for String {
    fn from(kind: GoalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a goal
///
/// Transitions happen through explicit updates; the analytics core only
/// reads the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }

    /// Parse a status from user input or a database column
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            other => Err(DomainError::InvalidStatus(format!(
                "'{}' is not a goal status (expected active, completed or abandoned)",
                other
            ))),
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
