//! Stdio protocol front end.
//!
//! Reads one JSON-RPC frame per line from stdin and writes response frames
//! to stdout. stdout carries protocol frames only; every human-readable
//! diagnostic goes to the stderr side channel. Malformed input never takes
//! the loop down.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::mcp::protocol::{self, CallParams, Request, error_code};
use crate::settings::Settings;
use crate::tools::forge::Forge;
use crate::tools::{InvokeError, Invoker, ToolRegistry, load_descriptors, register_all};

/// Serves the capability table to one connected agent runtime.
pub struct McpServer {
    forge: Arc<Forge>,
    registry: Arc<ToolRegistry>,
    invoker: Invoker,
    settings: Settings,
}

impl McpServer {
    pub fn new(forge: Arc<Forge>, registry: Arc<ToolRegistry>, settings: Settings) -> Self {
        let invoker = Invoker::new(Arc::clone(&forge));
        Self {
            forge,
            registry,
            invoker,
            settings,
        }
    }

    /// Serve until stdin closes.
    pub async fn serve(&self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!("Protocol front end serving on stdio");

        while let Some(line) = lines.next_line().await? {
            for frame in self.handle_line(line.trim()).await {
                let encoded = match serde_json::to_string(&frame) {
                    Ok(encoded) => encoded,
                    Err(error) => {
                        tracing::error!(%error, "Failed to encode response frame");
                        continue;
                    }
                };
                stdout.write_all(encoded.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw input line; returns the frames to write, in order.
    async fn handle_line(&self, line: &str) -> Vec<Value> {
        if line.is_empty() {
            return Vec::new();
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(%error, "Discarding unparseable frame");
                return vec![protocol::error_response(
                    Value::Null,
                    error_code::PARSE_ERROR,
                    "parse error",
                    None,
                )];
            }
        };

        match request.id {
            // Notifications are never answered.
            None => {
                tracing::debug!(method = %request.method, "Notification received");
                Vec::new()
            }
            Some(id) => self.handle_request(id, &request.method, request.params).await,
        }
    }

    async fn handle_request(&self, id: Value, method: &str, params: Value) -> Vec<Value> {
        match method {
            "initialize" => vec![protocol::response(id, protocol::initialize_result())],
            "ping" => vec![protocol::response(id, serde_json::json!({}))],
            "tools/list" => {
                let tools = self.registry.list().await;
                vec![protocol::response(id, protocol::tools_list_result(&tools))]
            }
            "tools/call" => vec![self.handle_call(id, params).await],
            "tools/reload" => self.handle_reload(id).await,
            other => vec![protocol::error_response(
                id,
                error_code::METHOD_NOT_FOUND,
                &format!("method '{other}' not implemented"),
                None,
            )],
        }
    }

    async fn handle_call(&self, id: Value, params: Value) -> Value {
        let params: CallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(error) => {
                return protocol::error_response(
                    id,
                    error_code::INVALID_PARAMS,
                    &format!("invalid call parameters: {error}"),
                    None,
                );
            }
        };

        let Some(tool) = self.registry.get(&params.name).await else {
            return protocol::invoke_error_response(
                id,
                &InvokeError::ToolNotFound(params.name),
            );
        };

        match self.invoker.invoke(&tool, &params.arguments).await {
            Ok(value) => protocol::response(id, protocol::call_result(value)),
            Err(error) => {
                tracing::warn!(tool = %tool.name, %error, "Tool call failed");
                protocol::invoke_error_response(id, &error)
            }
        }
    }

    /// Re-run registration over the registry file with upsert semantics.
    async fn handle_reload(&self, id: Value) -> Vec<Value> {
        let descriptors = match load_descriptors(&self.settings.registry).await {
            Ok(descriptors) => descriptors,
            Err(error) => {
                tracing::error!(%error, "Reload failed to read the registry file");
                return vec![protocol::error_response(
                    id,
                    error_code::INTERNAL_ERROR,
                    &error.to_string(),
                    None,
                )];
            }
        };

        let report = register_all(&self.forge, &self.registry, &descriptors).await;
        let result = serde_json::json!({
            "registered": report.registered,
            "failed": report.failed_count(),
        });

        vec![
            protocol::response(id, result),
            protocol::notification("notifications/tools/list_changed"),
        ]
    }
}
