/// Basic unit tests to verify core functionality through the public API
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use fitness_insights_mcp::analytics::{analyze_as_of, project_as_of, NO_HISTORY_DAYS};
use fitness_insights_mcp::insights::{parse_fenced_json, ParseError};
use fitness_insights_mcp::*;

/// Generator that always fails with a transport error
struct BrokenGenerator;

#[async_trait]
impl TextGenerator for BrokenGenerator {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
        Err(GenerationError::Request("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

fn workout(workout_type: &str, minutes: u32, calories: f64, date: NaiveDate) -> WorkoutRecord {
    WorkoutRecord::new(UserId::new(), workout_type.to_string(), minutes, calories, date, None).unwrap()
}

fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_workout_creation() {
        let w = WorkoutRecord::new(UserId::new(), "  HIIT ".to_string(), 25, 310.0, today(), Some("intervals".to_string()));
        let w = w.unwrap();
        assert_eq!(w.workout_type, "hiit");
        assert_eq!(w.duration_minutes, 25);

        assert!(WorkoutRecord::new(UserId::new(), "run".to_string(), 0, 0.0, today(), None).is_err());
        assert!(WorkoutRecord::new(UserId::new(), "run".to_string(), 30, -5.0, today(), None).is_err());
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let stats = analyze_as_of(&[], today());
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.workouts_per_week, 0.0);
        assert_eq!(stats.days_since_last, NO_HISTORY_DAYS);
        assert!(!stats.has_history());
    }

    #[test]
    fn test_type_distribution_sums_to_total() {
        let workouts = vec![
            workout("running", 30, 300.0, days_ago(9)),
            workout("yoga", 45, 150.0, days_ago(7)),
            workout("running", 35, 320.0, days_ago(4)),
            workout("cycling", 60, 500.0, days_ago(2)),
            workout("running", 30, 310.0, days_ago(1)),
        ];
        let stats = analyze_as_of(&workouts, today());

        let sum: u32 = stats.type_distribution.values().sum();
        assert_eq!(sum, stats.total_workouts);
        assert_eq!(stats.most_common_type, "running");
        assert_eq!(stats.days_since_last, 1);
    }

    #[test]
    fn test_duration_trend() {
        let workouts = vec![
            workout("running", 20, 200.0, days_ago(4)),
            workout("running", 20, 200.0, days_ago(3)),
            workout("running", 40, 200.0, days_ago(2)),
            workout("running", 40, 200.0, days_ago(1)),
        ];
        let stats = analyze_as_of(&workouts, today());
        assert_eq!(stats.duration_trend_pct, 100.0);
        assert_eq!(stats.calories_trend_pct, 0.0);
    }

    #[test]
    fn test_even_weeks_are_fully_consistent() {
        // Mondays and Thursdays of four consecutive ISO weeks
        let first_monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let workouts: Vec<WorkoutRecord> = (0..4)
            .flat_map(|week| {
                let monday = first_monday + Duration::weeks(week);
                vec![
                    workout("strength", 45, 300.0, monday),
                    workout("running", 30, 280.0, monday + Duration::days(3)),
                ]
            })
            .collect();

        let stats = analyze_as_of(&workouts, today());
        assert_eq!(stats.consistency_score, 100.0);
    }

    #[test]
    fn test_streaks() {
        let recent = vec![
            workout("running", 30, 300.0, days_ago(0)),
            workout("running", 30, 300.0, days_ago(1)),
            workout("yoga", 30, 100.0, days_ago(2)),
        ];
        let streak = StreakResult::calculate_as_of(&recent, today());
        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);

        let stale = vec![
            workout("running", 30, 300.0, days_ago(5)),
            workout("running", 30, 300.0, days_ago(6)),
        ];
        let streak = StreakResult::calculate_as_of(&stale, today());
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 2);
    }

    #[test]
    fn test_achievements_only_grow() {
        let mut workouts = Vec::new();
        let mut earned = 0;
        for day in (0..40).rev() {
            workouts.push(workout("running", 30, 250.0, days_ago(day)));
            let count = achievements_as_of(&workouts, today()).len();
            assert!(count >= earned, "achievements shrank after {} workouts", workouts.len());
            earned = count;
        }
        assert!(earned >= 4);
    }

    #[test]
    fn test_goal_projection_days() {
        let goal = GoalRecord::new(UserId::new(), GoalKind::TotalWorkouts, 100.0, 50.0, "workouts".to_string(), None)
            .unwrap();
        let stats = StatisticsBundle {
            workouts_per_week: 5.0,
            ..StatisticsBundle::empty()
        };

        let prediction = project_as_of(&goal, &stats, today()).unwrap();
        assert_eq!(prediction.days_remaining, 70);
        assert_eq!(prediction.predicted_date, today() + Duration::days(70));
        assert!(prediction.on_track);
    }

    #[test]
    fn test_fenced_json_parsing() {
        #[derive(serde::Deserialize)]
        struct Reply {
            score: u32,
        }

        let reply: Reply = parse_fenced_json("Sure!\n```json\n{\"score\": 7}\n```\nAnything else?").unwrap();
        assert_eq!(reply.score, 7);

        let missing = parse_fenced_json::<Reply>("```json\n{\"points\": 7}\n```");
        assert!(matches!(missing, Err(ParseError::Schema(_))));

        let garbage = parse_fenced_json::<Reply>("no json here");
        assert!(matches!(garbage, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_failing_generator_yields_fallback() {
        let synthesizer = InsightSynthesizer::new(Arc::new(BrokenGenerator));
        let stats = analyze_as_of(&[workout("running", 30, 300.0, days_ago(1))], today());

        let result = tokio_test::block_on(synthesizer.synthesize(&stats, &[]));
        assert!(!result.success);
        assert!(!result.insights.is_empty());
        assert_eq!(result.statistics, stats);
        assert!(result.error.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_failing_generator_recommendation_fallback() {
        let recommender = WorkoutRecommender::new(Arc::new(BrokenGenerator));
        let recommendation = tokio_test::block_on(recommender.recommend(&[], &StatisticsBundle::empty(), &[]));
        assert!(!recommendation.success);
        assert_eq!(recommendation.duration, 30);
        assert_eq!(recommendation.alternatives.len(), 2);
    }
}
