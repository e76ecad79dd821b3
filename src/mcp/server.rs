/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Routes tool calls to the fitness tools
/// 3. Sends JSON-RPC responses to stdout

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::analytics::AnalyticsEngine;
use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{FitnessTrackerServer, ServerError};

pub const SERVER_NAME: &str = "Fitness Insights MCP";

/// MCP server that handles communication with the client
pub struct McpServer {
    tracker: FitnessTrackerServer,
    /// Whether the client has completed the initialize handshake
    initialized: bool,
}

fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let input_schema = serde_json::to_value(schema_for!(P)).unwrap_or_else(|_| json!({"type": "object"}));
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Every tool this server exposes, with schemas generated from the parameter structs
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<tools::CreateUserParams>("user_create", "Create a user with a unique username and email"),
        tool::<tools::LogWorkoutParams>(
            "workout_log",
            "Log a workout (type, duration, calories, date) and report the current streak",
        ),
        tool::<tools::UpdateWorkoutParams>("workout_update", "Change fields of a logged workout"),
        tool::<tools::DeleteWorkoutParams>("workout_delete", "Delete a logged workout"),
        tool::<tools::CreateGoalParams>(
            "goal_create",
            "Create a fitness goal (total_workouts, calories_burned, total_duration or a custom type)",
        ),
        tool::<tools::UpdateGoalParams>(
            "goal_update",
            "Update goal progress, target, deadline or status; reaching the target completes the goal",
        ),
        tool::<tools::DeleteGoalParams>("goal_delete", "Delete a goal"),
        tool::<tools::LogProgressParams>("progress_log", "Record a body or performance measurement"),
        tool::<tools::FitnessQueryParams>(
            "fitness_query",
            "Look up records: get_user, list_workouts, get_stats, list_goals or get_progress",
        ),
        tool::<tools::UserParams>(
            "fitness_analytics",
            "Workout statistics, streaks, achievements and the weekly trend",
        ),
        tool::<tools::UserParams>("workout_streak", "Current and longest workout streaks"),
        tool::<tools::PredictionParams>(
            "goal_predictions",
            "Predict completion dates for active goals from the last 60 days of activity",
        ),
        tool::<tools::InsightsParams>(
            "fitness_insights",
            "AI-written insights about workout patterns, with an optional next-workout suggestion",
        ),
        tool::<tools::UserParams>("workout_recommendation", "Suggest the next workout from recent activity"),
        tool::<tools::ExportParams>("workout_export", "Export workouts as CSV"),
    ]
}

/// Deserialize tool arguments; a missing or null object counts as `{}`
fn parse_args<P: DeserializeOwned>(tool_name: &str, arguments: Option<Value>) -> Result<P, ToolCallResult> {
    let arguments = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(value) => value,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments for {}: {}", tool_name, e)))
}

fn respond<T: Serialize>(tool_name: &str, result: Result<T, ToolError>) -> ToolCallResult {
    match result {
        Ok(response) => ToolCallResult::json(&response),
        Err(e) => {
            warn!("Tool {} failed: {}", tool_name, e);
            ToolCallResult::error(e.to_string())
        }
    }
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tracker: FitnessTrackerServer) -> Self {
        Self {
            tracker,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" => {
                self.handle_notification("initialized");
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        match params.client_info {
            Some(client) => info!(
                "MCP client connected: {} {} (protocol {})",
                client.name,
                client.version,
                params.protocol_version.as_deref().unwrap_or("unknown")
            ),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Self::to_response(id, &result)
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let call: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(call)) => call,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, "Missing parameters".to_string(), None);
            }
        };

        debug!("Calling tool {}", call.name);
        let result = self.call_tool(&call.name, call.arguments).await;
        Self::to_response(id, &result)
    }

    /// Dispatch one tool call by name
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let storage = self.tracker.storage();
        let engine = AnalyticsEngine::new();

        macro_rules! call {
            ($params:ty, |$p:ident| $body:expr) => {
                match parse_args::<$params>(name, arguments) {
                    Ok($p) => respond(name, $body),
                    Err(invalid) => invalid,
                }
            };
        }

        match name {
            "user_create" => call!(tools::CreateUserParams, |p| tools::create_user(storage, p)),
            "workout_log" => call!(tools::LogWorkoutParams, |p| tools::log_workout(storage, p)),
            "workout_update" => call!(tools::UpdateWorkoutParams, |p| tools::update_workout(storage, p)),
            "workout_delete" => call!(tools::DeleteWorkoutParams, |p| tools::delete_workout(storage, p)),
            "goal_create" => call!(tools::CreateGoalParams, |p| tools::create_goal(storage, p)),
            "goal_update" => call!(tools::UpdateGoalParams, |p| tools::update_goal(storage, p)),
            "goal_delete" => call!(tools::DeleteGoalParams, |p| tools::delete_goal(storage, p)),
            "progress_log" => call!(tools::LogProgressParams, |p| tools::log_progress(storage, p)),
            "fitness_query" => call!(tools::FitnessQueryParams, |p| tools::fitness_query(storage, engine, p)),
            "fitness_analytics" => call!(tools::UserParams, |p| tools::fitness_analytics(storage, engine, p)),
            "workout_streak" => call!(tools::UserParams, |p| tools::workout_streak(storage, engine, p)),
            "goal_predictions" => call!(tools::PredictionParams, |p| {
                tools::goal_predictions(storage, engine, self.tracker.synthesizer(), p).await
            }),
            "fitness_insights" => call!(tools::InsightsParams, |p| {
                tools::fitness_insights(storage, engine, self.tracker.synthesizer(), self.tracker.recommender(), p).await
            }),
            "workout_recommendation" => call!(tools::UserParams, |p| {
                tools::workout_recommendation(storage, engine, self.tracker.recommender(), p).await
            }),
            "workout_export" => call!(tools::ExportParams, |p| tools::workout_export(storage, engine, p)),
            _ => ToolCallResult::error(format!("Unknown tool: {}", name)),
        }
    }

    fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::testing::ScriptedGenerator;
    use crate::storage::SqliteStorage;
    use std::sync::Arc;

    fn server() -> McpServer {
        let storage = SqliteStorage::in_memory().unwrap();
        McpServer::new(FitnessTrackerServer::new(storage, Arc::new(ScriptedGenerator::new(vec![]))))
    }

    async fn request(server: &mut McpServer, body: Value) -> Value {
        let response = server.handle_line(&body.to_string()).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    fn tool_payload(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_tool_definitions_have_object_schemas() {
        let definitions = tool_definitions();
        assert_eq!(definitions.len(), 15);
        for definition in &definitions {
            assert!(definition.input_schema.is_object(), "{}", definition.name);
            assert!(!definition.description.is_empty());
        }

        let log = definitions.iter().find(|d| d.name == "workout_log").unwrap();
        let required = log.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("duration")));
        assert!(!required.contains(&json!("notes")));
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server();
        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
                   "params": {"protocolVersion": MCP_VERSION, "capabilities": {}, "clientInfo": {"name": "test", "version": "1"}}}),
        )
        .await;
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(response["result"]["protocolVersion"], MCP_VERSION);

        let notification = server
            .handle_line(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#)
            .await;
        assert!(notification.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let mut server = server();

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);

        let response = request(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"})).await;
        assert_eq!(response["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let response = request(&mut server, json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call"})).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);

        assert!(server.handle_line("   \n").await.is_none());
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let mut server = server();

        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "user_create", "arguments": {"username": "zoe", "email": "zoe@example.com"}}}),
        )
        .await;
        assert_eq!(response["result"]["isError"], false);
        let user_id = tool_payload(&response)["user_id"].as_str().unwrap().to_string();

        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "workout_log", "arguments": {"user_id": user_id, "workout_type": "swimming", "duration": 45}}}),
        )
        .await;
        assert_eq!(tool_payload(&response)["current_streak"], 1);

        let response = request(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "fitness_query", "arguments": {"user_id": user_id, "action": "list_workouts"}}}),
        )
        .await;
        assert_eq!(tool_payload(&response)["count"], 1);
    }

    #[tokio::test]
    async fn test_tool_errors_are_reported_in_result() {
        let server = server();

        let missing = server.call_tool("workout_log", Some(json!({"workout_type": "yoga"}))).await;
        assert!(missing.is_error);
        assert!(missing.content[0].text.contains("Invalid arguments for workout_log"));

        let unknown_user = server
            .call_tool("workout_streak", Some(json!({"user_id": crate::domain::UserId::new().to_string()})))
            .await;
        assert!(unknown_user.is_error);

        let unknown_tool = server.call_tool("streak_reset", None).await;
        assert!(unknown_tool.content[0].text.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_insights_tool_falls_back_without_generator_output() {
        let server = server();
        let created = server
            .call_tool("user_create", Some(json!({"username": "ivy", "email": "ivy@example.com"})))
            .await;
        let user_id: Value = serde_json::from_str(&created.content[0].text).unwrap();

        let result = server
            .call_tool("fitness_insights", Some(json!({"user_id": user_id["user_id"]})))
            .await;
        assert!(!result.is_error);
        let payload: Value = serde_json::from_str(&result.content[0].text).unwrap();
        assert_eq!(payload["success"], false);
        assert_eq!(payload["insights"][0]["title"], "Keep Building Your Routine");
    }
}
