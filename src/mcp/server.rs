/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the server loop that:
/// 1. Reads line-delimited JSON-RPC requests from stdin
/// 2. Routes tool calls to the habit tools for the configured user
/// 3. Writes JSON-RPC responses to stdout
/// 4. Ticks once a minute and logs reminders that came due

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::reminders::ReminderRegistry;
use crate::storage::HabitStorage;
use crate::tools::{self, ToolError};
use crate::{HabitServer, ServerError};

const TICK_INTERVAL: Duration = Duration::from_secs(60);
const UPCOMING_LIMIT: usize = 5;

/// Tool parameters for tools that take no arguments
#[derive(Debug, Default, serde::Deserialize, JsonSchema)]
pub struct NoParams {}

/// MCP server that handles communication with a client
pub struct McpServer {
    /// The underlying habit server
    habit_server: HabitServer,
    /// Reminders of every user's habits
    registry: ReminderRegistry,
    /// End of the last reminder window that was checked
    last_tick: NaiveDateTime,
    /// Whether the client has finished initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server and load the reminder registry
    pub fn new(habit_server: HabitServer) -> Result<Self, ServerError> {
        let registry = ReminderRegistry::rebuild(&habit_server.storage().list_habits_with_reminders()?);
        info!("Loaded {} reminders", registry.len());

        Ok(Self {
            habit_server,
            registry,
            last_tick: Local::now().naive_local(),
            initialized: false,
        })
    }

    /// Whether the client sent the `initialized` notification
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current reminder registry
    pub fn registry(&self) -> &ReminderRegistry {
        &self.registry
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            info!("MCP server shutting down (stdin closed)");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to read from stdin: {}", e);
                            break;
                        }
                    };

                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                _ = ticker.tick() => {
                    self.fire_reminders(Local::now().naive_local());
                }
            }
        }

        Ok(())
    }

    /// Log every reminder due since the previous tick and advance the window
    pub fn fire_reminders(&mut self, now: NaiveDateTime) -> usize {
        let due = self.registry.due_between(self.last_tick, now);
        for scheduled in &due {
            info!(
                habit_id = %scheduled.reminder.habit_id,
                user_id = %scheduled.reminder.user_id,
                "⏰ Reminder: time for '{}' ({})",
                scheduled.reminder.habit_name,
                scheduled.at.format("%H:%M")
            );
        }
        let fired = due.len();
        self.last_tick = now;
        fired
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

        self.handle_request(request)
    }

    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest { id, method, params, .. } = request;

        if method == "initialized" || method == "notifications/initialized" {
            self.initialized = true;
            info!("MCP client initialized");
            return id.map(|id| JsonRpcResponse::success(id, Value::Null));
        }

        // anything else without an id is a notification we don't handle
        let id = match id {
            Some(id) => id,
            None => {
                debug!("Ignoring notification '{}'", method);
                return None;
            }
        };

        let response = match method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "habit-streaks".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            definition::<tools::CreateHabitParams>("habit_create", "Create a new habit scheduled on some weekdays"),
            definition::<tools::ListHabitsParams>("habit_list", "List your habits with their current streaks"),
            definition::<tools::HabitIdParams>("habit_get", "Get one habit by id"),
            definition::<tools::UpdateHabitParams>("habit_update", "Change a habit's name, days, color or reminder"),
            definition::<tools::HabitIdParams>("habit_delete", "Delete a habit and its history"),
            definition::<tools::ToggleHabitParams>("habit_complete", "Mark a habit as done today"),
            definition::<tools::ToggleHabitParams>("habit_incomplete", "Undo today's completion of a habit"),
            definition::<tools::HabitIdParams>("habit_stats", "Current streak, longest streak and completion rate of a habit"),
            definition::<tools::HabitIdParams>("habit_recalculate", "Recompute and store a habit's cached streaks"),
            definition::<NoParams>("stats_summary", "Totals across all of your habits"),
            definition::<NoParams>("habit_insights", "Short insights about your habits"),
            definition::<NoParams>("avatar_get", "Show your avatar and unlocked accessories"),
            definition::<tools::AvatarParams>("avatar_set", "Customize your avatar"),
            definition::<tools::RemindersParams>("habit_reminders", "List your upcoming reminders"),
        ];

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
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
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let arguments = call.arguments.unwrap_or_else(|| json!({}));
        debug!("Calling tool '{}' with {}", call.name, arguments);

        let result = self.call_tool(&call.name, arguments);
        to_response(id, &result)
    }

    /// Dispatch one tool call for the configured user
    fn call_tool(&mut self, name: &str, arguments: Value) -> ToolCallResult {
        let now = Local::now().naive_local();
        let today = now.date();
        let storage = self.habit_server.storage();
        let analytics = self.habit_server.analytics();
        let user = self.habit_server.user_id();

        let (result, changes_reminders) = match name {
            "habit_create" => (
                with_args(arguments, |p| tools::create_habit(storage, user, p, today)),
                true,
            ),
            "habit_list" => (
                with_args(arguments, |p| tools::list_habits(storage, user, p, today)),
                false,
            ),
            "habit_get" => (
                with_args(arguments, |p| tools::get_habit(storage, user, p, today)),
                false,
            ),
            "habit_update" => (
                with_args(arguments, |p| tools::update_habit(storage, user, p, today)),
                true,
            ),
            "habit_delete" => (
                with_args(arguments, |p| tools::delete_habit(storage, user, p)),
                true,
            ),
            "habit_complete" => (
                with_args(arguments, |p| tools::complete_habit(storage, user, p, today)),
                false,
            ),
            "habit_incomplete" => (
                with_args(arguments, |p| tools::incomplete_habit(storage, user, p, today)),
                false,
            ),
            "habit_stats" => (
                with_args(arguments, |p| tools::habit_stats(storage, analytics, user, p, today)),
                false,
            ),
            "habit_recalculate" => (
                with_args(arguments, |p| tools::recalculate_habit(storage, user, p, today)),
                false,
            ),
            "stats_summary" => (
                render(tools::stats_summary(storage, analytics, user, today)),
                false,
            ),
            "habit_insights" => (
                render(tools::habit_insights(storage, analytics, user, today)),
                false,
            ),
            "avatar_get" => (
                render(tools::get_avatar(storage, analytics, user, today)),
                false,
            ),
            "avatar_set" => (
                with_args(arguments, |p| tools::set_avatar(storage, analytics, user, p, today)),
                false,
            ),
            "habit_reminders" => (
                with_args(arguments, |p| {
                    Ok::<_, ToolError>(tools::list_reminders(&self.registry, user, p, now))
                }),
                false,
            ),
            _ => (ToolCallResult::error(format!("Unknown tool: {}", name)), false),
        };

        if changes_reminders && !result.is_error {
            self.rebuild_registry();
        }

        result
    }

    /// Replace the registry with one built from the current habit set
    pub fn rebuild_registry(&mut self) {
        match self.habit_server.storage().list_habits_with_reminders() {
            Ok(habits) => self.registry = ReminderRegistry::rebuild(&habits),
            Err(e) => error!("Failed to rebuild reminder registry: {}", e),
        }

        let upcoming = self.registry.upcoming(Local::now().naive_local(), UPCOMING_LIMIT);
        debug!("{} reminders registered, next: {:?}", self.registry.len(), upcoming.first().map(|s| s.at));
    }
}

fn definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schema_for!(T);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
    }
}

/// Deserialize tool arguments and run the tool
fn with_args<P, R, F>(arguments: Value, run: F) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> Result<R, ToolError>,
{
    match serde_json::from_value::<P>(arguments) {
        Ok(params) => render(run(params)),
        Err(e) => {
            warn!("Rejected tool arguments: {}", e);
            ToolCallResult::error(format!("Invalid arguments: {}", e))
        }
    }
}

/// Turn a tool outcome into a tool result
fn render<R: Serialize>(outcome: Result<R, ToolError>) -> ToolCallResult {
    match outcome {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(text) => ToolCallResult::success(text),
            Err(e) => ToolCallResult::error(format!("Failed to encode response: {}", e)),
        },
        Err(e) => {
            let code = tool_error_code(&e);
            if e.is_client_error() {
                warn!(code = code, "Tool call rejected: {}", e);
            } else {
                error!(code = code, "Tool call failed: {}", e);
            }
            ToolCallResult::error(format!("[{}] {}", code, e))
        }
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to encode result: {}", e),
            None,
        ),
    }
}
