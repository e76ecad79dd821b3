/// Prompt templates for the insight, recommendation and goal tip requests
///
/// Each builder renders a deterministic summary of the statistics into a
/// fixed instruction template. Nothing here talks to a provider.

use serde::{Deserialize, Serialize};

use crate::analytics::{GoalPrediction, StatisticsBundle};
use crate::domain::GoalRecord;

/// Goals listed in the insights prompt
const MAX_INSIGHT_GOALS: usize = 5;
/// Goals listed in the recommendation prompt
const MAX_RECOMMENDATION_GOALS: usize = 3;

/// A system instruction plus the user message carrying the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

const INSIGHTS_SYSTEM: &str = r#"You are an expert fitness analyst and motivational coach.
Analyze the user's workout data and generate personalized, actionable insights.

Your insights should be:
1. Data-driven and specific (use exact numbers)
2. Encouraging yet honest
3. Actionable with clear recommendations
4. Balanced between celebrating achievements and identifying improvements

Generate 4-6 diverse insights covering:
- Patterns and trends in their training
- Achievements and progress milestones
- Areas for improvement or balance
- Specific recommendations for better results
- Warnings about potential issues (overtraining, inconsistency, etc.)

Each insight must have:
- type: "pattern", "achievement", "recommendation", or "warning"
- title: Short, catchy title (max 8 words)
- message: Detailed insight (2-3 sentences)
- impact: "high", "medium", or "low"
- emoji: Single relevant emoji"#;

const INSIGHTS_RESPONSE_FORMAT: &str = r#"Generate comprehensive insights in JSON format with this structure:
{
  "insights": [
    {
      "type": "pattern" | "achievement" | "recommendation" | "warning",
      "title": "string",
      "message": "string",
      "impact": "high" | "medium" | "low",
      "emoji": "string"
    }
  ],
  "summary": "2-3 sentence overall summary of their fitness journey",
  "motivation": "Encouraging message to keep them motivated (2 sentences)"
}"#;

const RECOMMENDATION_SYSTEM: &str = r#"You are an expert personal trainer providing the NEXT workout recommendation.

Consider:
1. Workout variety and balance (avoid overworking same muscle groups)
2. Recovery time needed
3. User's goals and fitness level
4. Progressive overload principles
5. Time since last workout

Provide a specific, detailed recommendation in JSON format."#;

const RECOMMENDATION_RESPONSE_FORMAT: &str = r#"Recommend the BEST next workout in this JSON format:
{
  "workout_type": "specific workout type (e.g., 'Upper Body Strength', 'HIIT Cardio', '5K Run')",
  "duration": number (minutes),
  "intensity": "low" | "moderate" | "high",
  "reasoning": "Why this workout NOW (2-3 sentences)",
  "tips": ["tip1", "tip2", "tip3"] (3 specific actionable tips),
  "alternatives": ["alternative1", "alternative2"] (2 alternative options if user can't do main recommendation)
}"#;

const GOAL_TIP_SYSTEM: &str =
    "You are a fitness goal coach. Provide a concise, actionable recommendation (1-2 sentences) to help achieve the goal faster.";

/// Prompt asking for insights over the last 90 days of statistics
pub fn insights_prompt(stats: &StatisticsBundle, active_goals: &[GoalRecord]) -> Prompt {
    let type_distribution =
        serde_json::to_string_pretty(&stats.type_distribution).unwrap_or_else(|_| "{}".to_string());

    let user = format!(
        "Analyze this fitness data and generate insights:

WORKOUT STATISTICS (Last 90 days):
- Total Workouts: {total}
- Average per week: {per_week}
- Days since last workout: {since_last}
- Consistency score: {consistency}/100
- Total duration: {duration} minutes
- Total calories: {calories} cal
- Average duration: {avg_duration:.1} min per session
- Average calories: {avg_calories:.1} cal per session

WORKOUT TYPE DISTRIBUTION:
{type_distribution}

TRENDS:
- Duration change: {duration_trend}% (first half vs second half)
- Calories change: {calories_trend}% (first half vs second half)
- Most common workout: {most_common}

ACTIVE GOALS:
{goals}

{format}",
        total = stats.total_workouts,
        per_week = stats.workouts_per_week,
        since_last = stats.days_since_last,
        consistency = stats.consistency_score,
        duration = stats.total_duration,
        calories = stats.total_calories,
        avg_duration = stats.avg_duration,
        avg_calories = stats.avg_calories,
        duration_trend = stats.duration_trend_pct,
        calories_trend = stats.calories_trend_pct,
        most_common = stats.most_common_type,
        goals = goals_summary(active_goals),
        format = INSIGHTS_RESPONSE_FORMAT,
    );

    Prompt::new(INSIGHTS_SYSTEM, user)
}

/// Up to five goals as "kind: current/target unit (pct%)" lines
pub fn goals_summary(goals: &[GoalRecord]) -> String {
    if goals.is_empty() {
        return "No active goals".to_string();
    }

    goals
        .iter()
        .take(MAX_INSIGHT_GOALS)
        .map(|goal| format!("- {}", goal.summary_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for the single best next workout
pub fn recommendation_prompt(
    recent_types: &[String],
    last_workout_type: &str,
    stats: &StatisticsBundle,
    goals: &[GoalRecord],
) -> Prompt {
    let recent = if recent_types.is_empty() {
        "No recent workouts".to_string()
    } else {
        recent_types.join(", ")
    };

    let goals_text = if goals.is_empty() {
        "No active goals set".to_string()
    } else {
        goals
            .iter()
            .take(MAX_RECOMMENDATION_GOALS)
            .map(|g| {
                format!(
                    "- {}: {}/{} {}",
                    g.goal_type.display_name(),
                    g.current_value,
                    g.target_value,
                    g.unit
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = format!(
        "User's Fitness Profile:

RECENT ACTIVITY (Last 7 workouts):
{recent}

LAST WORKOUT:
- Type: {last_workout_type}
- Days ago: {since_last}

ALL-TIME STATS:
- Most common: {most_common}
- Average duration: {avg_duration:.0} minutes
- Workouts per week: {per_week}
- Consistency: {consistency}/100

ACTIVE GOALS:
{goals_text}

{format}",
        since_last = stats.days_since_last,
        most_common = stats.most_common_type,
        avg_duration = stats.avg_duration,
        per_week = stats.workouts_per_week,
        consistency = stats.consistency_score,
        format = RECOMMENDATION_RESPONSE_FORMAT,
    );

    Prompt::new(RECOMMENDATION_SYSTEM, user)
}

/// Prompt asking for one tip that speeds up a projected goal
pub fn goal_tip_prompt(prediction: &GoalPrediction, stats: &StatisticsBundle) -> Prompt {
    let user = format!(
        "Goal: {kind}
Progress: {current}/{target} {unit} ({pct:.0}%)
Current pace: {per_week} workouts/week
Consistency: {consistency}/100

Give ONE specific, actionable tip to reach this goal faster:",
        kind = prediction.goal_type.display_name(),
        current = prediction.current_value,
        target = prediction.target_value,
        unit = prediction.unit,
        pct = prediction.progress_percentage,
        per_week = stats.workouts_per_week,
        consistency = stats.consistency_score,
    );

    Prompt::new(GOAL_TIP_SYSTEM, user)
}
