/// Goal entity and related functionality
///
/// A goal is a numeric target (workouts, calories, minutes, or a freeform
/// measure) with an optional deadline. Progress (`current_value`) is moved
/// forward by explicit updates; the projection engine only reads it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, GoalId, GoalKind, GoalStatus, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: GoalId,
    pub user_id: UserId,
    pub goal_type: GoalKind,
    pub target_value: f64,
    pub current_value: f64,
    /// Unit for the values (e.g. "workouts", "kcal", "minutes")
    pub unit: String,
    pub deadline: Option<NaiveDate>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoalRecord {
    /// Create a new active goal with validation
    pub fn new(
        user_id: UserId,
        goal_type: GoalKind,
        target_value: f64,
        current_value: f64,
        unit: String,
        deadline: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        Self::validate_kind(&goal_type)?;
        Self::validate_target(target_value)?;
        Self::validate_current(current_value)?;
        let unit = Self::normalize_unit(&unit)?;

        let now = Utc::now();
        Ok(Self {
            id: GoalId::new(),
            user_id,
            goal_type,
            target_value,
            current_value,
            unit,
            deadline,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a goal from existing data (used when loading from database)
    ///
    /// No validation happens here, so loaded goals may carry degenerate values
    /// that downstream calculations have to tolerate.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: GoalId,
        user_id: UserId,
        goal_type: GoalKind,
        target_value: f64,
        current_value: f64,
        unit: String,
        deadline: Option<NaiveDate>,
        status: GoalStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            goal_type,
            target_value,
            current_value,
            unit,
            deadline,
            status,
            created_at,
            updated_at,
        }
    }

    /// Update the goal with validation
    pub fn update(
        &mut self,
        target_value: Option<f64>,
        current_value: Option<f64>,
        deadline: Option<Option<NaiveDate>>,
        status: Option<GoalStatus>,
    ) -> Result<(), DomainError> {
        if let Some(target) = target_value {
            Self::validate_target(target)?;
        }
        if let Some(current) = current_value {
            Self::validate_current(current)?;
        }

        if let Some(target) = target_value {
            self.target_value = target;
        }
        if let Some(current) = current_value {
            self.current_value = current;
        }
        if let Some(new_deadline) = deadline {
            self.deadline = new_deadline;
        }
        if let Some(new_status) = status {
            self.status = new_status;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    /// Percentage of the target reached (0 when the target is degenerate)
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value > 0.0 {
            self.current_value / self.target_value * 100.0
        } else {
            0.0
        }
    }

    /// One-line summary, e.g. "total_workouts: 12/50 workouts (24%)"
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {}/{} {} ({:.0}%)",
            self.goal_type,
            self.current_value,
            self.target_value,
            self.unit,
            self.progress_percentage()
        )
    }

    fn validate_kind(kind: &GoalKind) -> Result<(), DomainError> {
        if let GoalKind::Other(tag) = kind {
            if tag.trim().is_empty() {
                return Err(DomainError::InvalidName("Goal type cannot be empty".to_string()));
            }
        }
        Ok(())
    }

    fn validate_target(target: f64) -> Result<(), DomainError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Target value must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_current(current: f64) -> Result<(), DomainError> {
        if !current.is_finite() || current < 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Current value cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    fn normalize_unit(unit: &str) -> Result<String, DomainError> {
        let trimmed = unit.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidValue {
                message: "Unit cannot be empty".to_string(),
            });
        }
        if trimmed.chars().count() > 20 {
            return Err(DomainError::InvalidValue {
                message: "Unit cannot be longer than 20 characters".to_string(),
            });
        }
        Ok(trimmed.to_string())
    }
}
