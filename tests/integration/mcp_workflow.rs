/// End-to-end tests of the JSON-RPC surface
use habit_streaks::mcp::protocol::error_codes;
use habit_streaks::mcp::McpServer;
use habit_streaks::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn server(dir: &TempDir) -> McpServer {
    let habit_server = HabitServer::new(dir.path().join("habits.db"), UserId::new("alice").unwrap())
        .expect("Failed to create server");
    McpServer::new(habit_server).expect("Failed to create MCP server")
}

fn request(server: &mut McpServer, id: u64, method: &str, params: Value) -> Value {
    let line = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string();
    let response = tokio_test::block_on(server.handle_line(&line)).expect("response");
    serde_json::to_value(response).unwrap()
}

fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> (bool, String) {
    let response = request(server, id, "tools/call", json!({ "name": tool, "arguments": arguments }));
    let result = &response["result"];
    (
        result["isError"].as_bool().unwrap_or(false),
        result["content"][0]["text"].as_str().unwrap_or_default().to_string(),
    )
}

fn payload(text: &str) -> Value {
    serde_json::from_str(text).expect("tool output is JSON")
}

#[tokio::test]
async fn test_initialize_handshake() {
    let dir = TempDir::new().unwrap();
    let mut server = server(&dir);

    let line = json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }).to_string();
    let response = serde_json::to_value(server.handle_line(&line).await.unwrap()).unwrap();
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "habit-streaks");

    let note = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
    assert!(server.handle_line(&note).await.is_none());
    assert!(server.is_initialized());

    assert!(server.handle_line("   ").await.is_none());
}

#[test]
fn test_protocol_errors() {
    let dir = TempDir::new().unwrap();
    let mut server = server(&dir);

    let parse = tokio_test::block_on(server.handle_line("{not json")).unwrap();
    let parse = serde_json::to_value(parse).unwrap();
    assert_eq!(parse["error"]["code"], error_codes::PARSE_ERROR);

    let unknown = request(&mut server, 2, "resources/list", json!({}));
    assert_eq!(unknown["error"]["code"], error_codes::METHOD_NOT_FOUND);

    let line = json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call" }).to_string();
    let missing = serde_json::to_value(tokio_test::block_on(server.handle_line(&line)).unwrap()).unwrap();
    assert_eq!(missing["error"]["code"], error_codes::INVALID_PARAMS);
}

#[test]
fn test_tools_list_has_generated_schemas() {
    let dir = TempDir::new().unwrap();
    let mut server = server(&dir);

    let response = request(&mut server, 1, "tools/list", json!({}));
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);

    let create = tools.iter().find(|t| t["name"] == "habit_create").unwrap();
    let properties = &create["inputSchema"]["properties"];
    assert!(properties.get("name").is_some());
    assert!(properties.get("frequency_days").is_some());
    let required = create["inputSchema"]["required"].as_array().unwrap();
    assert!(required.contains(&json!("name")));
}

#[test]
fn test_habit_workflow_over_json_rpc() {
    let dir = TempDir::new().unwrap();
    let mut server = server(&dir);

    let (is_error, text) = call(
        &mut server,
        1,
        "habit_create",
        json!({ "name": "Drink water", "frequency_days": [0, 1, 2, 3, 4, 5, 6], "reminder_time": "10:00" }),
    );
    assert!(!is_error, "{}", text);
    let habit_id = payload(&text)["habit"]["id"].as_str().unwrap().to_string();
    assert_eq!(server.registry().len(), 1);

    let (is_error, text) = call(&mut server, 2, "habit_complete", json!({ "habit_id": habit_id }));
    assert!(!is_error, "{}", text);
    let done = payload(&text);
    assert_eq!(done["stats"]["current_streak"], 1);
    assert_eq!(done["changed"], true);

    // second completion is a no-op
    let (_, text) = call(&mut server, 3, "habit_complete", json!({ "habit_id": habit_id }));
    let again = payload(&text);
    assert_eq!(again["changed"], false);
    assert_eq!(again["habit"]["completed_dates"].as_array().unwrap().len(), 1);

    let (is_error, text) = call(
        &mut server,
        4,
        "habit_complete",
        json!({ "habit_id": habit_id, "date": "2000-01-01" }),
    );
    assert!(is_error);
    assert!(text.contains(&error_codes::VALIDATION_ERROR.to_string()));

    let (_, text) = call(&mut server, 5, "stats_summary", json!({}));
    let summary = payload(&text);
    assert_eq!(summary["total_habits"], 1);
    assert_eq!(summary["total_completions"], 1);

    let (is_error, text) = call(&mut server, 6, "avatar_set", json!({ "accessory": "glasses" }));
    assert!(is_error);
    assert!(text.contains("7-day"));

    let (is_error, _) = call(&mut server, 7, "habit_update", json!({ "habit_id": habit_id, "reminder_time": "" }));
    assert!(!is_error);
    assert!(server.registry().is_empty());

    let (is_error, _) = call(&mut server, 8, "habit_delete", json!({ "habit_id": habit_id }));
    assert!(!is_error);

    let (is_error, text) = call(&mut server, 9, "habit_get", json!({ "habit_id": habit_id }));
    assert!(is_error);
    assert!(text.contains(&error_codes::HABIT_NOT_FOUND.to_string()));
}

#[test]
fn test_bad_tool_arguments() {
    let dir = TempDir::new().unwrap();
    let mut server = server(&dir);

    let (is_error, text) = call(&mut server, 1, "habit_create", json!({ "name": 42 }));
    assert!(is_error);
    assert!(text.contains("Invalid arguments"));

    let (is_error, text) = call(&mut server, 2, "habit_teleport", json!({}));
    assert!(is_error);
    assert!(text.contains("Unknown tool"));
}
