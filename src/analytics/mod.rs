/// Analytics engine for workout statistics and goal projections
///
/// This module provides functionality for analyzing workout patterns,
/// projecting goal completion and summarizing activity week by week.
/// Everything here is synchronous and derived fresh from the records.

pub mod export;
pub mod patterns;
pub mod projection;
pub mod weekly;

pub use export::workouts_to_csv;
pub use patterns::{analyze, analyze_as_of, StatisticsBundle, TypeStats, NO_HISTORY_DAYS};
pub use projection::{project, project_all, project_all_as_of, project_as_of, Confidence, GoalPrediction};
pub use weekly::{weekly_trend, WeeklyTrendPoint};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{achievement, Achievement, GoalRecord, StreakResult, WorkoutRecord};

/// Everything the analytics tool reports for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub statistics: StatisticsBundle,
    pub streak: StreakResult,
    pub achievements: Vec<Achievement>,
    pub weekly_trend: Vec<WeeklyTrendPoint>,
}

/// Analytics engine for processing workout data
///
/// Holds the reference date so every calculation in one request agrees on
/// what "today" is.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    today: NaiveDate,
}

impl AnalyticsEngine {
    /// Create an engine anchored at today's UTC date
    pub fn new() -> Self {
        Self::as_of(Utc::now().naive_utc().date())
    }

    pub fn as_of(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn statistics(&self, workouts: &[WorkoutRecord]) -> StatisticsBundle {
        analyze_as_of(workouts, self.today)
    }

    pub fn streak(&self, workouts: &[WorkoutRecord]) -> StreakResult {
        StreakResult::calculate_as_of(workouts, self.today)
    }

    /// Statistics, streak, badges and weekly trend in one pass over the history
    pub fn report(&self, workouts: &[WorkoutRecord]) -> AnalyticsReport {
        AnalyticsReport {
            statistics: self.statistics(workouts),
            streak: self.streak(workouts),
            achievements: achievement::achievements_as_of(workouts, self.today),
            weekly_trend: weekly_trend(workouts),
        }
    }

    /// Projections for each goal, computed from the given workout window
    pub fn predictions(&self, goals: &[GoalRecord], workouts: &[WorkoutRecord]) -> Vec<GoalPrediction> {
        let stats = self.statistics(workouts);
        project_all_as_of(goals, &stats, self.today)
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AchievementTag, UserId, WorkoutId};
    use chrono::Duration;

    #[test]
    fn test_report_combines_all_views() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let user = UserId::new();
        let workouts: Vec<_> = (0..10)
            .map(|i| {
                WorkoutRecord::from_existing(
                    WorkoutId::new(),
                    user,
                    "running".to_string(),
                    30,
                    300.0,
                    today - Duration::days(i),
                    None,
                    Utc::now(),
                )
            })
            .collect();

        let report = AnalyticsEngine::as_of(today).report(&workouts);
        assert_eq!(report.statistics.total_workouts, 10);
        assert_eq!(report.streak.current_streak, 10);
        assert!(report.achievements.iter().any(|a| a.tag == AchievementTag::WeekWarrior));
        let weekly_total: u32 = report.weekly_trend.iter().map(|w| w.workouts).sum();
        assert_eq!(weekly_total, 10);
    }
}
