/// Goal completion projection
///
/// Combines a goal's remaining distance with the user's current workout
/// pace (from the statistics bundle) to estimate a completion date, and
/// grades how much to trust that estimate by workout consistency.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analytics::StatisticsBundle;
use crate::domain::{GoalId, GoalKind, GoalRecord};

/// Days used for `days_remaining` when a goal can't be projected and has no deadline
const DEFAULT_HORIZON_DAYS: i64 = 90;

/// Paces that put completion further out than this are not projected
pub const MAX_PROJECTION_DAYS: i64 = 36_500;
/// Baseline length of a freeform goal, scaled by the fraction still remaining
const GENERIC_GOAL_WEEKS: f64 = 12.0;
/// Per-workout fallbacks when the history has no usable averages
const DEFAULT_CALORIES_PER_WORKOUT: f64 = 300.0;
const DEFAULT_MINUTES_PER_WORKOUT: f64 = 30.0;

/// How reliable a projection is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier from a 0-100 consistency score: 75+ high, 50+ medium, else low
    pub fn from_consistency(score: f64) -> Self {
        if score >= 75.0 {
            Confidence::High
        } else if score >= 50.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Projected completion of a single goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPrediction {
    pub goal_id: GoalId,
    pub goal_type: GoalKind,
    pub current_value: f64,
    pub target_value: f64,
    pub unit: String,
    pub progress_percentage: f64,
    pub predicted_date: NaiveDate,
    pub confidence: Confidence,
    pub days_remaining: i64,
    pub deadline: Option<NaiveDate>,
    /// Whether the predicted date falls on or before the deadline
    pub on_track: bool,
}

/// Project a goal relative to today's UTC date
pub fn project(goal: &GoalRecord, stats: &StatisticsBundle) -> Option<GoalPrediction> {
    project_as_of(goal, stats, Utc::now().naive_utc().date())
}

/// Project a goal relative to an explicit "today"
///
/// Returns `None` for goals whose values make a projection meaningless
/// (non-positive or non-finite target, non-finite progress) or whose pace
/// puts completion beyond `MAX_PROJECTION_DAYS`.
pub fn project_as_of(goal: &GoalRecord, stats: &StatisticsBundle, today: NaiveDate) -> Option<GoalPrediction> {
    if !goal.target_value.is_finite() || goal.target_value <= 0.0 || !goal.current_value.is_finite() {
        return None;
    }

    let remaining = goal.target_value - goal.current_value;

    let (predicted_date, days_remaining, confidence) =
        if remaining <= 0.0 || stats.workouts_per_week <= 0.0 {
            // Nothing to extrapolate from: fall back to the stated deadline
            let days = goal
                .deadline
                .map(|deadline| (deadline - today).num_days())
                .unwrap_or(DEFAULT_HORIZON_DAYS);
            let date = match goal.deadline {
                Some(deadline) => deadline,
                None => today.checked_add_signed(Duration::days(DEFAULT_HORIZON_DAYS))?,
            };
            (date, days, Confidence::Low)
        } else {
            let weeks = weeks_needed(&goal.goal_type, remaining, goal.target_value, stats);
            let days = (weeks * 7.0).round();
            if !days.is_finite() || days > MAX_PROJECTION_DAYS as f64 {
                return None;
            }
            let days = days as i64;
            let date = today.checked_add_signed(Duration::days(days))?;
            (date, days, Confidence::from_consistency(stats.consistency_score))
        };

    Some(GoalPrediction {
        goal_id: goal.id,
        goal_type: goal.goal_type.clone(),
        current_value: goal.current_value,
        target_value: goal.target_value,
        unit: goal.unit.clone(),
        progress_percentage: (goal.progress_percentage() * 10.0).round() / 10.0,
        predicted_date,
        confidence,
        days_remaining,
        deadline: goal.deadline,
        on_track: goal.deadline.map_or(true, |deadline| predicted_date <= deadline),
    })
}

/// Project every goal, skipping (and logging) the ones that can't be projected
pub fn project_all_as_of(
    goals: &[GoalRecord],
    stats: &StatisticsBundle,
    today: NaiveDate,
) -> Vec<GoalPrediction> {
    goals
        .iter()
        .filter_map(|goal| {
            let prediction = project_as_of(goal, stats, today);
            if prediction.is_none() {
                warn!(
                    "Skipping projection for goal {}: target {} / current {} is not projectable",
                    goal.id, goal.target_value, goal.current_value
                );
            }
            prediction
        })
        .collect()
}

pub fn project_all(goals: &[GoalRecord], stats: &StatisticsBundle) -> Vec<GoalPrediction> {
    project_all_as_of(goals, stats, Utc::now().naive_utc().date())
}

/// Weeks of training at the current pace needed to cover `remaining`
fn weeks_needed(kind: &GoalKind, remaining: f64, target: f64, stats: &StatisticsBundle) -> f64 {
    let pace = stats.workouts_per_week;
    match kind {
        GoalKind::TotalWorkouts => remaining / pace,
        GoalKind::CaloriesBurned => {
            let per_workout = positive_or(stats.avg_calories, DEFAULT_CALORIES_PER_WORKOUT);
            (remaining / per_workout) / pace
        }
        GoalKind::TotalDuration => {
            let per_workout = positive_or(stats.avg_duration, DEFAULT_MINUTES_PER_WORKOUT);
            (remaining / per_workout) / pace
        }
        GoalKind::Other(_) => remaining / target * GENERIC_GOAL_WEEKS,
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
