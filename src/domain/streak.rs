/// Streak calculation from workout history
///
/// This module defines the StreakResult struct and the consecutive-day
/// calculations behind it. Streaks are derived fresh from the workout
/// records on every call and never stored.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::WorkoutRecord;

/// Calculated streak information for a user's workouts
///
/// Several workouts on the same calendar day count as one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    /// Consecutive workout days ending today or yesterday
    pub current_streak: u32,
    /// Best run of consecutive workout days ever recorded
    pub longest_streak: u32,
    /// Most recent day with a workout (None if there are no workouts)
    pub last_workout_date: Option<NaiveDate>,
}

impl StreakResult {
    /// Calculate streaks relative to today's UTC date
    pub fn calculate(workouts: &[WorkoutRecord]) -> Self {
        Self::calculate_as_of(workouts, Utc::now().naive_utc().date())
    }

    /// Calculate streaks relative to an explicit "today"
    ///
    /// A current streak survives one missed day: it may end today or
    /// yesterday. If the latest workout is older than that, it is 0.
    pub fn calculate_as_of(workouts: &[WorkoutRecord], today: NaiveDate) -> Self {
        let dates = Self::distinct_dates_descending(workouts);
        if dates.is_empty() {
            return Self::default();
        }

        let current_streak = Self::calculate_current_streak(&dates, today);
        let longest_streak = Self::calculate_longest_streak(&dates).max(current_streak);

        Self {
            current_streak,
            longest_streak,
            last_workout_date: dates.first().copied(),
        }
    }

    /// Whether the current streak can still be extended today
    pub fn is_on_track(&self, today: NaiveDate) -> bool {
        match self.last_workout_date {
            None => false,
            Some(last) => (0..=1).contains(&(today - last).num_days()),
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single workout.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong routine.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. Training is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're unstoppable!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }

    fn distinct_dates_descending(workouts: &[WorkoutRecord]) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = workouts.iter().map(|w| w.date).collect();
        dates.into_iter().rev().collect()
    }

    /// Length of the one-day-step run anchored at the most recent date,
    /// provided that date is today or yesterday.
    ///
    /// Dates after `today` can't anchor a current streak and are skipped.
    fn calculate_current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
        let past: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();

        let anchor = match past.first() {
            Some(date) => *date,
            None => return 0,
        };
        if (today - anchor).num_days() > 1 {
            return 0;
        }

        let mut streak = 1;
        for pair in past.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }

    /// Maximum run length over the descending distinct dates
    fn calculate_longest_streak(dates: &[NaiveDate]) -> u32 {
        if dates.is_empty() {
            return 0;
        }

        let mut longest = 1;
        let mut run = 1;
        for pair in dates.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                run += 1;
            } else {
                longest = longest.max(run);
                run = 1;
            }
        }

        longest.max(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, WorkoutId};
    use chrono::Duration;

    fn workouts_on(dates: &[NaiveDate]) -> Vec<WorkoutRecord> {
        let user = UserId::new();
        dates
            .iter()
            .map(|date| {
                WorkoutRecord::from_existing(
                    WorkoutId::new(),
                    user,
                    "running".to_string(),
                    30,
                    250.0,
                    *date,
                    None,
                    Utc::now(),
                )
            })
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let streak = StreakResult::calculate_as_of(&[], day(2024, 3, 10));
        assert_eq!(streak, StreakResult::default());
        assert_eq!(streak.last_workout_date, None);
    }

    #[test]
    fn test_three_days_ending_today() {
        let today = day(2024, 3, 10);
        let workouts = workouts_on(&[today - Duration::days(2), today - Duration::days(1), today]);

        let streak = StreakResult::calculate_as_of(&workouts, today);
        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.last_workout_date, Some(today));
    }

    #[test]
    fn test_streak_ending_yesterday_still_counts() {
        let today = day(2024, 3, 10);
        let workouts = workouts_on(&[today - Duration::days(1), today - Duration::days(2)]);

        let streak = StreakResult::calculate_as_of(&workouts, today);
        assert_eq!(streak.current_streak, 2);
    }

    #[test]
    fn test_gap_from_today_breaks_current_streak() {
        let today = day(2024, 3, 10);
        let workouts = workouts_on(&[today - Duration::days(5), today - Duration::days(6)]);

        let streak = StreakResult::calculate_as_of(&workouts, today);
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 2);
    }

    #[test]
    fn test_longest_streak_in_the_past() {
        let today = day(2024, 3, 31);
        let mut dates: Vec<NaiveDate> = (1..=5).map(|d| day(2024, 3, d)).collect();
        dates.extend([day(2024, 3, 10), day(2024, 3, 11), today]);

        let streak = StreakResult::calculate_as_of(&workouts_on(&dates), today);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 5);
    }

    #[test]
    fn test_same_day_workouts_count_once() {
        let today = day(2024, 3, 10);
        let workouts = workouts_on(&[today, today, today - Duration::days(1), today - Duration::days(1)]);

        let streak = StreakResult::calculate_as_of(&workouts, today);
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.longest_streak, 2);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let today = day(2024, 3, 1);
        let workouts = workouts_on(&[day(2024, 2, 28), day(2024, 2, 29), today]);

        let streak = StreakResult::calculate_as_of(&workouts, today);
        assert_eq!(streak.current_streak, 3);
    }

    #[test]
    fn test_is_on_track() {
        let today = day(2024, 3, 10);
        let recent = StreakResult::calculate_as_of(&workouts_on(&[today - Duration::days(1)]), today);
        assert!(recent.is_on_track(today));

        let stale = StreakResult::calculate_as_of(&workouts_on(&[today - Duration::days(3)]), today);
        assert!(!stale.is_on_track(today));
        assert!(!StreakResult::default().is_on_track(today));
    }

    #[test]
    fn test_motivational_messages() {
        let mut streak = StreakResult::default();
        assert!(streak.motivational_message().contains("Ready to start"));

        streak.current_streak = 1;
        assert!(streak.motivational_message().contains("Great start"));

        streak.current_streak = 7;
        assert!(streak.motivational_message().contains("Excellent"));

        streak.current_streak = 100;
        assert!(streak.motivational_message().contains("Legendary"));
    }
}
