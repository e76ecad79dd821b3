/// Rule-based achievement badges
///
/// Badges are threshold predicates over cumulative workout statistics. They
/// hold no state: the set is recomputed from the records on every call.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{StreakResult, WorkoutRecord};

/// Every badge a user can unlock, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTag {
    Dedicated,
    Committed,
    Champion,
    CalorieCrusher,
    FatBurner,
    Versatile,
    WeekWarrior,
    MonthMaster,
}

/// The cumulative statistic a badge threshold is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    TotalWorkouts,
    TotalCalories,
    DistinctTypes,
    CurrentStreak,
}

/// Badges ordered by measure, then by ascending threshold
const RULES: &[(AchievementTag, Measure, f64)] = &[
    (AchievementTag::Dedicated, Measure::TotalWorkouts, 10.0),
    (AchievementTag::Committed, Measure::TotalWorkouts, 50.0),
    (AchievementTag::Champion, Measure::TotalWorkouts, 100.0),
    (AchievementTag::CalorieCrusher, Measure::TotalCalories, 5000.0),
    (AchievementTag::FatBurner, Measure::TotalCalories, 10000.0),
    (AchievementTag::Versatile, Measure::DistinctTypes, 3.0),
    (AchievementTag::WeekWarrior, Measure::CurrentStreak, 7.0),
    (AchievementTag::MonthMaster, Measure::CurrentStreak, 30.0),
];

impl AchievementTag {
    pub fn title(&self) -> &'static str {
        match self {
            AchievementTag::Dedicated => "Dedicated",
            AchievementTag::Committed => "Committed",
            AchievementTag::Champion => "Champion",
            AchievementTag::CalorieCrusher => "Calorie Crusher",
            AchievementTag::FatBurner => "Fat Burner",
            AchievementTag::Versatile => "Versatile",
            AchievementTag::WeekWarrior => "Week Warrior",
            AchievementTag::MonthMaster => "Month Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementTag::Dedicated => "10+ workouts completed",
            AchievementTag::Committed => "50+ workouts completed",
            AchievementTag::Champion => "100+ workouts completed",
            AchievementTag::CalorieCrusher => "5000+ calories burned",
            AchievementTag::FatBurner => "10000+ calories burned",
            AchievementTag::Versatile => "3+ different workout types",
            AchievementTag::WeekWarrior => "7-day workout streak",
            AchievementTag::MonthMaster => "30-day workout streak",
        }
    }
}

/// An unlocked badge as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub tag: AchievementTag,
    pub title: String,
    pub description: String,
}

impl From<AchievementTag> for Achievement {
    fn from(tag: AchievementTag) -> Self {
        Self {
            tag,
            title: tag.title().to_string(),
            description: tag.description().to_string(),
        }
    }
}

/// Badges earned by the given workouts as of today's UTC date
pub fn achievements(workouts: &[WorkoutRecord]) -> Vec<Achievement> {
    achievements_as_of(workouts, Utc::now().naive_utc().date())
}

/// Badges earned by the given workouts, with streaks measured as of `today`
pub fn achievements_as_of(workouts: &[WorkoutRecord], today: NaiveDate) -> Vec<Achievement> {
    let total_workouts = workouts.len() as f64;
    let total_calories: f64 = workouts.iter().map(|w| w.calories_burned).sum();
    let distinct_types = workouts
        .iter()
        .map(|w| w.workout_type.as_str())
        .collect::<HashSet<_>>()
        .len() as f64;
    let current_streak = StreakResult::calculate_as_of(workouts, today).current_streak as f64;

    RULES
        .iter()
        .filter(|(_, measure, threshold)| {
            let value = match measure {
                Measure::TotalWorkouts => total_workouts,
                Measure::TotalCalories => total_calories,
                Measure::DistinctTypes => distinct_types,
                Measure::CurrentStreak => current_streak,
            };
            value >= *threshold
        })
        .map(|(tag, _, _)| Achievement::from(*tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, WorkoutId};
    use chrono::Duration;

    fn workout(workout_type: &str, calories: f64, date: NaiveDate) -> WorkoutRecord {
        WorkoutRecord::from_existing(
            WorkoutId::new(),
            UserId::new(),
            workout_type.to_string(),
            30,
            calories,
            date,
            None,
            Utc::now(),
        )
    }

    fn tags(list: &[Achievement]) -> Vec<AchievementTag> {
        list.iter().map(|a| a.tag).collect()
    }

    #[test]
    fn test_no_workouts_no_badges() {
        assert!(achievements_as_of(&[], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_empty());
    }

    #[test]
    fn test_thresholds_in_ascending_order() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let types = ["running", "yoga", "cycling"];
        let workouts: Vec<_> = (0..10)
            .map(|i| workout(types[i % 3], 600.0, today - Duration::days(i as i64)))
            .collect();

        let earned = achievements_as_of(&workouts, today);
        assert_eq!(
            tags(&earned),
            vec![
                AchievementTag::Dedicated,
                AchievementTag::CalorieCrusher,
                AchievementTag::Versatile,
                AchievementTag::WeekWarrior,
            ]
        );
        assert_eq!(earned[0].title, "Dedicated");
        assert_eq!(earned[1].description, "5000+ calories burned");
    }

    #[test]
    fn test_adding_workouts_never_removes_badges() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let mut workouts: Vec<_> = (0..12)
            .map(|i| workout("running", 450.0, today - Duration::days(i)))
            .collect();
        let before = tags(&achievements_as_of(&workouts, today));

        workouts.push(workout("rowing", 2400.0, today - Duration::days(40)));
        workouts.push(workout("swimming", 2400.0, today));
        let after = tags(&achievements_as_of(&workouts, today));

        for tag in &before {
            assert!(after.contains(tag), "{:?} was lost", tag);
        }
        assert!(after.contains(&AchievementTag::FatBurner));
        assert!(after.contains(&AchievementTag::Versatile));
    }
}
