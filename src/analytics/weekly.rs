/// Week-by-week workout volume
///
/// Buckets workouts by the Monday that starts their week and keeps the most
/// recent weeks that actually contain workouts.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::WorkoutRecord;

/// Number of most recent weeks returned by `weekly_trend`
pub const TREND_WEEKS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrendPoint {
    /// Monday of the week
    pub week_start: NaiveDate,
    pub workouts: u32,
    pub calories: f64,
    /// Total minutes
    pub duration: u64,
}

/// Totals for the last `TREND_WEEKS` weeks with activity, oldest first
pub fn weekly_trend(workouts: &[WorkoutRecord]) -> Vec<WeeklyTrendPoint> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyTrendPoint> = BTreeMap::new();

    for workout in workouts {
        let week_start = week_start(workout.date);
        let point = weeks.entry(week_start).or_insert_with(|| WeeklyTrendPoint {
            week_start,
            workouts: 0,
            calories: 0.0,
            duration: 0,
        });
        point.workouts += 1;
        point.calories += workout.calories_burned;
        point.duration += workout.duration_minutes as u64;
    }

    let skip = weeks.len().saturating_sub(TREND_WEEKS);
    weeks
        .into_values()
        .skip(skip)
        .map(|mut point| {
            point.calories = (point.calories * 100.0).round() / 100.0;
            point
        })
        .collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
