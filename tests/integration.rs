// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Runs the built-in registry and MCP server against stub upstreams.

use std::time::Duration;

use futures::future::join_all;
use httpmock::prelude::*;
use mcp_gateway::prelude::*;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

async fn registry_for(server: &MockServer) -> Registry {
    let config = GatewayConfig::new()
        .with_base_url(server.base_url())
        .with_email_webhook(server.url("/webhook"));
    Registry::with_builtin_tools(&config).await.unwrap()
}

async fn mock_openai_python(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/openai/openai-python");
            then.status(200).json_body(json!({
                "name": "openai-python",
                "description": "The official Python library for the OpenAI API",
                "stargazers_count": 5000,
                "forks_count": 700,
                "language": "Python",
                "topics": ["openai", "python"]
            }));
        })
        .await;
}

#[tokio::test]
async fn test_repo_info_through_registry() {
    let server = MockServer::start_async().await;
    mock_openai_python(&server).await;
    let registry = registry_for(&server).await;

    let result = registry
        .call(
            "github_get_repo_info",
            json!({"owner": "openai", "repo": "openai-python"}),
        )
        .await
        .unwrap();

    assert!(result.is_success());
    let info = result.result().unwrap();
    assert_eq!(info["name"], "openai-python");
    assert_eq!(info["full_name"], "openai/openai-python");
    assert_eq!(info["stars"], 5000);
    assert_eq!(info["language"], "Python");
    assert_eq!(result.details["owner"], "openai");
}

#[tokio::test]
async fn test_weather_by_zip_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/us/10001");
            then.status(200).json_body(json!({
                "post code": "10001",
                "country": "United States",
                "places": [{
                    "place name": "New York",
                    "state": "New York",
                    "state abbreviation": "NY",
                    "latitude": "40.7484",
                    "longitude": "-73.9967"
                }]
            }));
        })
        .await;
    let forecast_url = server.url("/gridpoints/OKX/33,37/forecast");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/points/40.7484,-73.9967");
            then.status(200).json_body(json!({
                "properties": {
                    "forecast": forecast_url.clone(),
                    "relativeLocation": {"properties": {"city": "Hoboken", "state": "NJ"}}
                }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gridpoints/OKX/33,37/forecast");
            then.status(200).json_body(json!({
                "properties": {"periods": [{
                    "number": 1,
                    "name": "Tonight",
                    "startTime": "2024-01-01T18:00:00-05:00",
                    "endTime": "2024-01-02T06:00:00-05:00",
                    "isDaytime": false,
                    "temperature": 31,
                    "temperatureUnit": "F",
                    "windSpeed": "5 mph",
                    "windDirection": "W",
                    "shortForecast": "Mostly Clear",
                    "detailedForecast": "Mostly clear, with a low around 31."
                }]}
            }));
        })
        .await;
    let registry = registry_for(&server).await;

    let result = registry
        .call("weather_forecast", json!({"location": "10001"}))
        .await
        .unwrap();

    assert!(result.is_success(), "{:?}", result.error());
    let body = result.result().unwrap();
    assert_eq!(body["location"]["city"], "New York");
    assert_eq!(body["location"]["state"], "NY");
    assert_eq!(body["location"]["zip_code"], "10001");
    assert_eq!(body["forecast_type"], "forecast");
    assert_eq!(body["periods"][0]["short_forecast"], "Mostly Clear");
    assert_eq!(result.details["period_count"], 1);
}

#[tokio::test]
async fn test_failures_never_escape_the_envelope() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/ghost/nothing");
            then.status(404).json_body(json!({"message": "Not Found"}));
        })
        .await;
    let registry = registry_for(&server).await;

    let cases = [
        ("github_get_repo_info", json!({"owner": "ghost", "repo": "nothing"})),
        ("github_search_repositories", json!({})),
        ("weather_forecast", json!({"location": "invalid"})),
        ("send_email", json!({"to_email": "nope", "subject": "s", "body": "b"})),
    ];
    for (name, params) in cases {
        let result = registry.call(name, params).await.unwrap();
        assert!(!result.is_success(), "{name} should fail");
        assert!(result.result().is_none());
        assert!(!result.error().unwrap().is_empty());
        assert!(result.details.contains_key("kind"), "{name} lacks kind");
    }
}

#[tokio::test]
async fn test_local_math_tools_through_registry() {
    let registry = Registry::with_builtin_tools(&GatewayConfig::new())
        .await
        .unwrap();

    let sum = registry
        .call("calculate", json!({"expression": "2 + 2"}))
        .await
        .unwrap();
    let envelope = serde_json::to_value(&sum).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["result"], 4);

    let bad = registry
        .call("calculate", json!({"expression": "invalid"}))
        .await
        .unwrap();
    assert!(!bad.is_success());

    let analysis = registry
        .call("analyze_data", json!({"data": [10, 20, 30, 40, 50]}))
        .await
        .unwrap();
    let insights = analysis.result().unwrap()["insights"].as_array().unwrap();
    assert!(insights.iter().any(|i| i.as_str().unwrap().contains("Mean")));

    let empty = registry
        .call("analyze_data", json!({"data": []}))
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&empty).unwrap()["success"], false);
}

#[tokio::test]
async fn test_unknown_tool_is_a_caller_error() {
    let registry = Registry::with_builtin_tools(&GatewayConfig::new())
        .await
        .unwrap();
    let err = registry
        .call("github_get_repo", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownTool(ref name) if name == "github_get_repo"));
}

#[tokio::test]
async fn test_upstream_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/slow/repo/languages");
            then.status(200)
                .json_body(json!({"Rust": 10}))
                .delay(Duration::from_secs(3));
        })
        .await;
    let config = GatewayConfig::new()
        .with_base_url(server.base_url())
        .with_timeout(Duration::from_millis(200))
        .unwrap();
    let registry = Registry::with_builtin_tools(&config).await.unwrap();

    let result = registry
        .call("github_get_languages", json!({"owner": "slow", "repo": "repo"}))
        .await
        .unwrap();

    assert_eq!(
        result.error(),
        Some("Request timeout while connecting to GitHub API")
    );
    assert_eq!(result.details["kind"], "timeout");
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let server = MockServer::start_async().await;
    mock_openai_python(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/openai/openai-python/languages");
            then.status(200)
                .json_body(json!({"Python": 900, "Shell": 100}))
                .delay(Duration::from_millis(200));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/webhook");
            then.status(200);
        })
        .await;
    let registry = registry_for(&server).await;

    let calls = vec![
        registry.call(
            "github_get_repo_info",
            json!({"owner": "openai", "repo": "openai-python"}),
        ),
        registry.call(
            "github_get_languages",
            json!({"owner": "openai", "repo": "openai-python"}),
        ),
        registry.call(
            "send_email",
            json!({"to_email": "a@example.com", "subject": "Hi", "body": "Body"}),
        ),
        registry.call("weather_forecast", json!({"location": "91.0,0"})),
    ];
    let results: Vec<ToolResult> = join_all(calls)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results[0].result().unwrap()["stars"], 5000);
    assert_eq!(results[1].result().unwrap()[0]["percentage"], 90.0);
    assert_eq!(results[2].result().unwrap()["status_code"], 200);
    assert!(results[3].error().unwrap().contains("out of range"));
}

#[tokio::test]
async fn test_mcp_session_over_duplex() {
    let server = MockServer::start_async().await;
    mock_openai_python(&server).await;
    let registry = registry_for(&server).await;

    let (client, server_io) = tokio::io::duplex(256 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let mcp = McpServer::new(registry);
    let serve = tokio::spawn(async move { mcp.serve(server_read, server_write).await });

    let (client_read, mut client_write) = tokio::io::split(client);
    let messages = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
               "params": {"protocolVersion": "2024-11-05", "capabilities": {},
                          "clientInfo": {"name": "it", "version": "0"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "github_get_repo_info",
                          "arguments": {"owner": "openai", "repo": "openai-python"}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "no_such_tool", "arguments": {}}}),
    ];
    for message in &messages {
        let line = format!("{message}\n");
        client_write.write_all(line.as_bytes()).await.unwrap();
    }
    client_write.shutdown().await.unwrap();

    let mut responses = std::collections::HashMap::new();
    let mut lines = BufReader::new(client_read).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        let resp: Value = serde_json::from_str(&line).unwrap();
        responses.insert(resp["id"].as_i64().unwrap(), resp);
    }
    serve.await.unwrap().unwrap();

    // Four requests, one notification.
    assert_eq!(responses.len(), 4);
    assert_eq!(responses[&1]["result"]["serverInfo"]["name"], "mcp-gateway");

    let tools = responses[&2]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 8);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));

    let call = &responses[&3]["result"];
    assert_eq!(call["isError"], false);
    assert_eq!(call["structuredContent"]["result"]["stars"], 5000);

    assert_eq!(responses[&4]["error"]["code"], -32602);
}
