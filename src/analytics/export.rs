/// CSV export of a workout history
///
/// Fields containing commas, quotes or line breaks are quoted so that free
/// text notes can't break the column layout.

use crate::domain::WorkoutRecord;

pub const CSV_HEADER: &str = "Date,Type,Duration (min),Calories,Notes";

/// Render workouts as CSV, one line per workout in the given order
pub fn workouts_to_csv(workouts: &[WorkoutRecord]) -> String {
    let mut lines = Vec::with_capacity(workouts.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for workout in workouts {
        lines.push(format!(
            "{},{},{},{},{}",
            workout.date,
            escape_field(&workout.workout_type),
            workout.duration_minutes,
            workout.calories_burned,
            escape_field(workout.notes.as_deref().unwrap_or("")),
        ));
    }

    lines.join("\n")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
