/// Workout pattern analysis
///
/// Turns a list of workout records into a `StatisticsBundle`: totals,
/// averages, weekly frequency, consistency, trend deltas and the type
/// distribution. Everything here is a pure function of its input.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::WorkoutRecord;

/// `days_since_last` value used when there is no workout history at all
pub const NO_HISTORY_DAYS: i64 = 999;

/// Trend deltas need at least this many records to mean anything
const MIN_RECORDS_FOR_TREND: usize = 4;

/// Per-type aggregate inside a statistics bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeStats {
    pub count: u32,
    pub avg_duration: f64,
    pub avg_calories: f64,
}

/// Statistics derived from a set of workouts
///
/// Recomputed per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub total_workouts: u32,
    /// Total minutes across all workouts
    pub total_duration: u64,
    pub total_calories: f64,
    pub avg_duration: f64,
    pub avg_calories: f64,
    pub workouts_per_week: f64,
    /// Days between today and the latest workout, 999 with no history
    pub days_since_last: i64,
    /// 0-100, how evenly workouts spread across ISO weeks
    pub consistency_score: f64,
    pub most_common_type: String,
    pub type_distribution: BTreeMap<String, u32>,
    pub type_stats: BTreeMap<String, TypeStats>,
    /// Percent change of mean duration, second half vs first half
    pub duration_trend_pct: f64,
    /// Percent change of mean calories, second half vs first half
    pub calories_trend_pct: f64,
}

impl StatisticsBundle {
    /// The neutral bundle for an empty history
    pub fn empty() -> Self {
        Self {
            total_workouts: 0,
            total_duration: 0,
            total_calories: 0.0,
            avg_duration: 0.0,
            avg_calories: 0.0,
            workouts_per_week: 0.0,
            days_since_last: NO_HISTORY_DAYS,
            consistency_score: 0.0,
            most_common_type: "none".to_string(),
            type_distribution: BTreeMap::new(),
            type_stats: BTreeMap::new(),
            duration_trend_pct: 0.0,
            calories_trend_pct: 0.0,
        }
    }

    pub fn has_history(&self) -> bool {
        self.total_workouts > 0
    }
}

impl Default for StatisticsBundle {
    fn default() -> Self {
        Self::empty()
    }
}

/// Analyze workouts relative to today's UTC date
pub fn analyze(workouts: &[WorkoutRecord]) -> StatisticsBundle {
    analyze_as_of(workouts, Utc::now().naive_utc().date())
}

/// Analyze workouts relative to an explicit "today"
pub fn analyze_as_of(workouts: &[WorkoutRecord], today: NaiveDate) -> StatisticsBundle {
    if workouts.is_empty() {
        return StatisticsBundle::empty();
    }

    // Stable sort keeps same-day records in the order they were given
    let mut ordered: Vec<&WorkoutRecord> = workouts.iter().collect();
    ordered.sort_by_key(|w| w.date);

    let count = ordered.len();
    let total_duration: u64 = ordered.iter().map(|w| w.duration_minutes as u64).sum();
    let total_calories: f64 = ordered.iter().map(|w| w.calories_burned).sum();

    let first_date = ordered[0].date;
    let last_date = ordered[count - 1].date;

    let (type_distribution, most_common_type) = type_distribution(&ordered);

    StatisticsBundle {
        total_workouts: count as u32,
        total_duration,
        total_calories,
        avg_duration: total_duration as f64 / count as f64,
        avg_calories: total_calories / count as f64,
        workouts_per_week: round1(workouts_per_week(count, first_date, last_date)),
        days_since_last: (today - last_date).num_days(),
        consistency_score: round1(consistency_score(&ordered)),
        most_common_type,
        type_stats: type_stats(&ordered),
        type_distribution,
        duration_trend_pct: round1(trend_pct(&ordered, |w| w.duration_minutes as f64)),
        calories_trend_pct: round1(trend_pct(&ordered, |w| w.calories_burned)),
    }
}

/// Weekly workout rate over the span between the first and last workout
///
/// With a single distinct date there is no span to divide by, so the
/// count itself is reported as the weekly rate.
fn workouts_per_week(count: usize, first: NaiveDate, last: NaiveDate) -> f64 {
    let span_days = (last - first).num_days();
    if span_days <= 0 {
        return count as f64;
    }
    count as f64 / span_days as f64 * 7.0
}

/// 100 minus the coefficient of variation (in percent) of per-ISO-week
/// workout counts, floored at 0
fn consistency_score(workouts: &[&WorkoutRecord]) -> f64 {
    let mut buckets: HashMap<(i32, u32), u32> = HashMap::new();
    for workout in workouts {
        let week = workout.date.iso_week();
        *buckets.entry((week.year(), week.week())).or_insert(0) += 1;
    }

    let counts: Vec<f64> = buckets.values().map(|c| *c as f64).collect();
    let avg = mean(&counts);
    if avg <= 0.0 {
        return 0.0;
    }

    (100.0 - sample_stdev(&counts) / avg * 100.0).max(0.0)
}

/// Percent change of a metric's mean between the second and first half
fn trend_pct<F>(workouts: &[&WorkoutRecord], metric: F) -> f64
where
    F: Fn(&WorkoutRecord) -> f64,
{
    if workouts.len() < MIN_RECORDS_FOR_TREND {
        return 0.0;
    }

    let mid = workouts.len() / 2;
    let first: Vec<f64> = workouts[..mid].iter().map(|w| metric(*w)).collect();
    let second: Vec<f64> = workouts[mid..].iter().map(|w| metric(*w)).collect();

    let first_mean = mean(&first);
    if first_mean == 0.0 {
        return 0.0;
    }

    (mean(&second) - first_mean) / first_mean * 100.0
}

/// Count per type plus the most common type (ties go to the type seen first)
fn type_distribution(workouts: &[&WorkoutRecord]) -> (BTreeMap<String, u32>, String) {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut distribution: BTreeMap<String, u32> = BTreeMap::new();

    for workout in workouts {
        let counter = distribution.entry(workout.workout_type.clone()).or_insert(0);
        if *counter == 0 {
            first_seen.push(&workout.workout_type);
        }
        *counter += 1;
    }

    let mut most_common = "none";
    let mut best = 0;
    for workout_type in first_seen {
        let count = distribution[workout_type];
        if count > best {
            best = count;
            most_common = workout_type;
        }
    }

    let most_common = most_common.to_string();
    (distribution, most_common)
}

fn type_stats(workouts: &[&WorkoutRecord]) -> BTreeMap<String, TypeStats> {
    let mut grouped: BTreeMap<String, (u32, f64, f64)> = BTreeMap::new();
    for workout in workouts {
        let entry = grouped.entry(workout.workout_type.clone()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += workout.duration_minutes as f64;
        entry.2 += workout.calories_burned;
    }

    grouped
        .into_iter()
        .map(|(workout_type, (count, duration, calories))| {
            let stats = TypeStats {
                count,
                avg_duration: duration / count as f64,
                avg_calories: calories / count as f64,
            };
            (workout_type, stats)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two values
fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
