// ABOUTME: McpServer - exposes a tool Registry over newline-delimited JSON-RPC.
// ABOUTME: Each request runs on its own task; one writer task owns the output.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::{
    DEFAULT_PROTOCOL_VERSION, McpImplementationInfo, McpInitializeParams, McpInitializeResult,
    McpRequest, McpResponse, McpRpcError, McpServerCapabilities, McpToolCallParams,
    McpToolResult, McpToolsListResult,
};
use crate::error::{McpError, RegistryError};
use crate::tool::Registry;

const OUTBOX_CAPACITY: usize = 64;

/// MCP server backed by a tool registry.
#[derive(Clone)]
pub struct McpServer {
    registry: Registry,
    info: McpImplementationInfo,
}

impl McpServer {
    /// Create a server reporting this crate's name and version.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            info: McpImplementationInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Override the name and version sent in `serverInfo`.
    pub fn with_server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.info = McpImplementationInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Serve until `reader` reaches EOF.
    ///
    /// Requests are handled concurrently, so responses may be written in a
    /// different order than the requests arrived. In-flight requests are
    /// drained before returning.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), McpError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<McpResponse>(OUTBOX_CAPACITY);
        let writer_handle = tokio::spawn(write_responses(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();

        let read_result = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(McpError::Io(e)),
            };
            if line.trim().is_empty() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    let _ = tx.send(response).await;
                }
            });

            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }
        };

        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        drop(tx);

        let write_result = writer_handle
            .await
            .map_err(|e| McpError::Protocol(format!("writer task failed: {e}")))?;
        tracing::debug!("MCP input closed");
        read_result.and(write_result)
    }

    /// Handle one raw input line. Returns `None` when no reply is due.
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("unparseable MCP message: {e}");
                return Some(McpResponse::error(Value::Null, McpRpcError::parse_error(e)));
            }
        };

        // A present-but-null id is neither a request nor a notification.
        if value.get("id").is_some_and(Value::is_null) {
            return Some(McpResponse::error(
                Value::Null,
                McpRpcError::invalid_request("id must not be null"),
            ));
        }
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<McpRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(McpResponse::error(id, McpRpcError::invalid_request(e))),
        }
    }

    /// Dispatch a parsed request or notification.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools().await,
            "tools/call" => self.call_tool(request.params).await,
            other => Err(McpRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => McpResponse::success(id, result),
            Err(error) => McpResponse::error(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, McpRpcError> {
        let params: McpInitializeParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| McpRpcError::invalid_params(format!("Invalid params: {e}")))?,
            None => McpInitializeParams::default(),
        };
        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "client connected");
        }

        let result = McpInitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            capabilities: McpServerCapabilities {
                tools: Some(json!({"listChanged": false})),
            },
            server_info: self.info.clone(),
        };
        serde_json::to_value(result).map_err(McpRpcError::internal)
    }

    async fn list_tools(&self) -> Result<Value, McpRpcError> {
        let result = McpToolsListResult {
            tools: self.registry.to_definitions().await,
        };
        serde_json::to_value(result).map_err(McpRpcError::internal)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, McpRpcError> {
        let params: McpToolCallParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| McpRpcError::invalid_params(format!("Invalid params: {e}")))?,
            None => return Err(McpRpcError::invalid_params("Invalid params: missing tool name")),
        };
        let arguments = params.arguments.unwrap_or_else(|| json!({}));

        let envelope = match self.registry.call(&params.name, arguments).await {
            Ok(envelope) => envelope,
            Err(err @ RegistryError::UnknownTool(_)) => {
                tracing::warn!(tool = %params.name, "call to unknown tool");
                return Err(McpRpcError::invalid_params(err.to_string()));
            }
            Err(err) => return Err(McpRpcError::internal(err)),
        };
        tracing::info!(tool = %params.name, success = envelope.is_success(), "tool call");

        let result = McpToolResult::from_envelope(&envelope).map_err(McpRpcError::internal)?;
        serde_json::to_value(result).map_err(McpRpcError::internal)
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::Receiver<McpResponse>) -> Result<(), McpError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("request task failed: {e}");
    }
}
