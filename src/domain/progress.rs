/// Body and performance measurements (weight, resting heart rate, ...)
///
/// Progress records are stored and listed for the user; they are not part of
/// the workout analytics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ProgressId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    /// What was measured (e.g. "weight", "resting_hr")
    pub metric: String,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(
        user_id: UserId,
        metric: String,
        value: f64,
        unit: String,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        let metric = metric.trim().to_lowercase();
        if metric.is_empty() {
            return Err(DomainError::InvalidName("Metric name cannot be empty".to_string()));
        }
        if !value.is_finite() {
            return Err(DomainError::InvalidValue {
                message: "Measurement value must be a finite number".to_string(),
            });
        }
        if unit.trim().is_empty() {
            return Err(DomainError::InvalidValue {
                message: "Unit cannot be empty".to_string(),
            });
        }
        if notes.as_ref().is_some_and(|n| n.len() > 500) {
            return Err(DomainError::InvalidValue {
                message: "Notes cannot be longer than 500 characters".to_string(),
            });
        }

        Ok(Self {
            id: ProgressId::new(),
            user_id,
            metric,
            value,
            unit: unit.trim().to_string(),
            date,
            notes,
            created_at: Utc::now(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: ProgressId,
        user_id: UserId,
        metric: String,
        value: f64,
        unit: String,
        date: NaiveDate,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            metric,
            value,
            unit,
            date,
            notes,
            created_at,
        }
    }
}
