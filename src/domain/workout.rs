/// Workout entity for logged training sessions
///
/// This module defines the WorkoutRecord struct, the input that every
/// analytics calculation is derived from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, UserId, WorkoutId};

/// A single logged workout
///
/// Workouts are immutable once created except through an explicit update.
/// The workout type is a free tag ("running", "yoga", ...) stored lowercase
/// so that type distributions group consistently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: WorkoutId,
    pub user_id: UserId,
    /// Workout type tag (e.g., "running", "strength")
    #[serde(rename = "type")]
    pub workout_type: String,
    /// Length of the session in minutes (always positive)
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    /// Estimated calories burned (never negative)
    pub calories_burned: f64,
    /// Calendar day the workout happened on
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Create a new workout with validation
    pub fn new(
        user_id: UserId,
        workout_type: String,
        duration_minutes: u32,
        calories_burned: f64,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        let workout_type = Self::normalize_type(&workout_type)?;
        Self::validate_duration(duration_minutes)?;
        Self::validate_calories(calories_burned)?;
        Self::validate_date(&date)?;
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: WorkoutId::new(),
            user_id,
            workout_type,
            duration_minutes,
            calories_burned,
            date,
            notes,
            created_at: Utc::now(),
        })
    }

    /// Create a workout from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: WorkoutId,
        user_id: UserId,
        workout_type: String,
        duration_minutes: u32,
        calories_burned: f64,
        date: NaiveDate,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            workout_type,
            duration_minutes,
            calories_burned,
            date,
            notes,
            created_at,
        }
    }

    /// Apply a partial update, validating every new value before any is applied
    pub fn update(
        &mut self,
        workout_type: Option<String>,
        duration_minutes: Option<u32>,
        calories_burned: Option<f64>,
        date: Option<NaiveDate>,
        notes: Option<Option<String>>,
    ) -> Result<(), DomainError> {
        let workout_type = workout_type.map(|t| Self::normalize_type(&t)).transpose()?;
        if let Some(minutes) = duration_minutes {
            Self::validate_duration(minutes)?;
        }
        if let Some(calories) = calories_burned {
            Self::validate_calories(calories)?;
        }
        if let Some(ref new_date) = date {
            Self::validate_date(new_date)?;
        }
        if let Some(ref new_notes) = notes {
            Self::validate_notes(new_notes)?;
        }

        if let Some(t) = workout_type {
            self.workout_type = t;
        }
        if let Some(minutes) = duration_minutes {
            self.duration_minutes = minutes;
        }
        if let Some(calories) = calories_burned {
            self.calories_burned = calories;
        }
        if let Some(new_date) = date {
            self.date = new_date;
        }
        if let Some(new_notes) = notes {
            self.notes = new_notes;
        }

        Ok(())
    }

    fn normalize_type(workout_type: &str) -> Result<String, DomainError> {
        let normalized = workout_type.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::InvalidName("Workout type cannot be empty".to_string()));
        }
        if normalized.chars().count() > 50 {
            return Err(DomainError::InvalidName(
                "Workout type cannot be longer than 50 characters".to_string(),
            ));
        }

        Ok(normalized)
    }

    fn validate_duration(minutes: u32) -> Result<(), DomainError> {
        if minutes == 0 {
            return Err(DomainError::InvalidValue {
                message: "Duration must be at least 1 minute".to_string(),
            });
        }
        if minutes > 24 * 60 {
            return Err(DomainError::InvalidValue {
                message: "Duration cannot exceed 24 hours".to_string(),
            });
        }
        Ok(())
    }

    fn validate_calories(calories: f64) -> Result<(), DomainError> {
        if !calories.is_finite() || calories < 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Calories burned must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }

    /// Workouts can't be logged for days that haven't happened yet
    fn validate_date(date: &NaiveDate) -> Result<(), DomainError> {
        let today = Utc::now().naive_utc().date();

        if *date > today {
            return Err(DomainError::InvalidDate(
                "Cannot log workouts for future dates".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = notes {
            if text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        Utc::now().naive_utc().date()
    }

    #[test]
    fn test_create_valid_workout() {
        let workout = WorkoutRecord::new(
            UserId::new(),
            "  Running ".to_string(),
            45,
            420.5,
            today(),
            Some("Easy pace".to_string()),
        )
        .unwrap();

        assert_eq!(workout.workout_type, "running");
        assert_eq!(workout.duration_minutes, 45);
        assert_eq!(workout.calories_burned, 420.5);
    }

    #[test]
    fn test_invalid_workout_values() {
        let user = UserId::new();
        assert!(WorkoutRecord::new(user, "yoga".into(), 0, 100.0, today(), None).is_err());
        assert!(WorkoutRecord::new(user, "yoga".into(), 30, -1.0, today(), None).is_err());
        assert!(WorkoutRecord::new(user, "yoga".into(), 30, f64::NAN, today(), None).is_err());
        assert!(WorkoutRecord::new(user, "   ".into(), 30, 100.0, today(), None).is_err());
    }

    #[test]
    fn test_future_date_invalid() {
        let tomorrow = today() + chrono::Duration::days(1);
        let result = WorkoutRecord::new(UserId::new(), "cycling".into(), 30, 200.0, tomorrow, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut workout =
            WorkoutRecord::new(UserId::new(), "swimming".into(), 30, 250.0, today(), None).unwrap();

        let result = workout.update(Some("rowing".into()), Some(0), None, None, None);
        assert!(result.is_err());
        assert_eq!(workout.workout_type, "swimming");

        workout
            .update(None, Some(50), Some(400.0), None, Some(Some("PB".into())))
            .unwrap();
        assert_eq!(workout.duration_minutes, 50);
        assert_eq!(workout.notes.as_deref(), Some("PB"));
    }

    #[test]
    fn test_serialized_field_names() {
        let workout =
            WorkoutRecord::new(UserId::new(), "hiit".into(), 20, 180.0, today(), None).unwrap();
        let value = serde_json::to_value(&workout).unwrap();
        assert_eq!(value["type"], "hiit");
        assert_eq!(value["duration"], 20);
    }
}
