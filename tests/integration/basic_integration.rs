/// Basic integration tests: a real SQLite file, the MCP request loop and a
/// scripted text generator standing in for the provider
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fitness_insights_mcp::mcp::McpServer;
use fitness_insights_mcp::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Replays canned replies in order; fails once they run out
struct CannedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl CannedGenerator {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(GenerationError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "canned"
    }
}

const INSIGHTS_REPLY: &str = r#"```json
{"insights": [{"type": "achievement", "title": "Three in a Row", "message": "You trained three days straight.", "impact": "high", "emoji": "🔥"}],
 "summary": "Strong start.", "motivation": "Keep the streak alive!"}
```"#;

const RECOMMENDATION_REPLY: &str = r#"{"workout_type": "Mobility", "duration": 20, "intensity": "low", "reasoning": "Active recovery.", "tips": ["Go slow"], "alternatives": ["Walk"]}"#;

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("fitness.db");
    (dir, path)
}

async fn open_server(path: std::path::PathBuf, generator: Arc<dyn TextGenerator>) -> McpServer {
    let tracker = FitnessTrackerServer::open(path, generator)
        .await
        .expect("Failed to create server");
    McpServer::new(tracker)
}

/// Call a tool over JSON-RPC and return the decoded tool payload
async fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> (bool, Value) {
    let line = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments}
    })
    .to_string();

    let response = server.handle_line(&line).await.expect("tools/call must be answered");
    let response = serde_json::to_value(response).unwrap();
    assert_eq!(response["id"], json!(id));

    let result = &response["result"];
    let is_error = result["isError"].as_bool().unwrap();
    let text = result["content"][0]["text"].as_str().unwrap();
    let payload = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    (is_error, payload)
}

fn days_ago(days: i64) -> String {
    (chrono::Utc::now().naive_utc().date() - chrono::Duration::days(days)).to_string()
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_workflow_over_mcp() {
        let (_dir, path) = temp_db();
        let generator = CannedGenerator::new(&[INSIGHTS_REPLY, RECOMMENDATION_REPLY]);
        let mut server = open_server(path, generator).await;

        let init = server
            .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"it","version":"0"}}}"#)
            .await
            .unwrap();
        assert!(init.error.is_none());
        assert!(server.handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await.is_none());

        let (is_error, user) = call(&mut server, 1, "user_create", json!({"username": "rio", "email": "rio@example.com"})).await;
        assert!(!is_error);
        let user_id = user["user_id"].as_str().unwrap().to_string();

        for (i, days) in [2, 1, 0].into_iter().enumerate() {
            let (is_error, logged) = call(
                &mut server,
                10 + i as u64,
                "workout_log",
                json!({"user_id": user_id, "workout_type": "running", "duration": 30, "calories_burned": 300, "date": days_ago(days)}),
            )
            .await;
            assert!(!is_error, "{}", logged);
        }

        let (_, goal) = call(
            &mut server,
            20,
            "goal_create",
            json!({"user_id": user_id, "goal_type": "total_workouts", "target_value": 20, "current_value": 3}),
        )
        .await;
        assert!(goal["goal_id"].is_string());

        let (_, streak) = call(&mut server, 30, "workout_streak", json!({"user_id": user_id})).await;
        assert_eq!(streak["current_streak"], 3);
        assert_eq!(streak["on_track"], true);

        let (_, analytics) = call(&mut server, 31, "fitness_analytics", json!({"user_id": user_id})).await;
        assert_eq!(analytics["statistics"]["total_workouts"], 3);
        assert_eq!(analytics["statistics"]["type_distribution"]["running"], 3);

        let (_, predictions) = call(&mut server, 32, "goal_predictions", json!({"user_id": user_id})).await;
        assert_eq!(predictions["predictions"].as_array().unwrap().len(), 1);

        let (is_error, insights) = call(
            &mut server,
            40,
            "fitness_insights",
            json!({"user_id": user_id, "include_recommendation": true}),
        )
        .await;
        assert!(!is_error);
        assert_eq!(insights["success"], true);
        assert_eq!(insights["insights"][0]["title"], "Three in a Row");
        assert_eq!(insights["recommendation"]["workout_type"], "Mobility");

        // Script exhausted: the next recommendation degrades to the fallback
        let (is_error, fallback) = call(&mut server, 41, "workout_recommendation", json!({"user_id": user_id})).await;
        assert!(!is_error);
        assert_eq!(fallback["success"], false);
        assert_eq!(fallback["workout_type"], "Moderate Cardio");

        let (_, export) = call(&mut server, 50, "workout_export", json!({"user_id": user_id})).await;
        assert_eq!(export["count"], 3);
        assert!(export["csv"].as_str().unwrap().starts_with("Date,Type,Duration (min),Calories,Notes"));
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let (_dir, path) = temp_db();

        let user_id = {
            let mut server = open_server(path.clone(), Arc::new(UnconfiguredGenerator)).await;
            let (_, user) = call(&mut server, 1, "user_create", json!({"username": "pat", "email": "pat@example.com"})).await;
            let user_id = user["user_id"].as_str().unwrap().to_string();
            call(
                &mut server,
                2,
                "workout_log",
                json!({"user_id": user_id, "workout_type": "rowing", "duration": 25}),
            )
            .await;
            user_id
        };

        // Reopening the same file sees the earlier records
        let mut server = open_server(path, Arc::new(UnconfiguredGenerator)).await;
        let (is_error, listed) = call(
            &mut server,
            3,
            "fitness_query",
            json!({"user_id": user_id, "action": "list_workouts"}),
        )
        .await;
        assert!(!is_error);
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["workouts"][0]["type"], "rowing");
    }

    #[tokio::test]
    async fn test_errors_are_tool_results() {
        let (_dir, path) = temp_db();
        let mut server = open_server(path, Arc::new(UnconfiguredGenerator)).await;

        let (is_error, message) = call(&mut server, 1, "workout_log", json!({"user_id": "nope", "workout_type": "run", "duration": 5})).await;
        assert!(is_error);
        assert!(message.as_str().unwrap().contains("not a valid user ID"));

        let (is_error, _) = call(&mut server, 2, "user_create", json!({"username": "", "email": "x@example.com"})).await;
        assert!(is_error);

        let (is_error, message) = call(&mut server, 3, "fitness_query", json!({"user_id": "x", "action": "explode"})).await;
        assert!(is_error);
        assert!(message.as_str().unwrap().contains("Invalid arguments"));
    }

    #[test]
    fn test_storage_interface() {
        let (_dir, path) = temp_db();
        let storage = SqliteStorage::new(path).expect("Failed to create storage");

        // SqliteStorage is usable through the trait object
        let store: &dyn FitnessStorage = &storage;
        let user = UserRecord::new("quinn".to_string(), "quinn@example.com".to_string()).unwrap();
        store.create_user(&user).unwrap();
        assert_eq!(store.get_user_by_username("quinn").unwrap().id, user.id);
        assert!(store.get_workouts(&user.id, WorkoutQuery::all()).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_insight_services_share_a_generator() {
        let generator: Arc<dyn TextGenerator> = CannedGenerator::new(&[INSIGHTS_REPLY, RECOMMENDATION_REPLY]);
        let synthesizer = InsightSynthesizer::new(generator.clone());
        let recommender = WorkoutRecommender::new(generator);
        let stats = StatisticsBundle::empty();

        let (insights, recommendation) = tokio_test::block_on(async {
            futures::join!(synthesizer.synthesize(&stats, &[]), recommender.recommend(&[], &stats, &[]))
        });

        assert!(insights.success);
        assert!(recommendation.success);
        assert_eq!(recommendation.duration, 20);
    }
}
