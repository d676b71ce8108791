//! MCP wire types over JSON-RPC 2.0.
//!
//! Frames are single JSON objects, one per line. Responses carry either a
//! `result` or an `error` object; tool failures put a machine-readable
//! `kind` in `error.data`, so callers can always tell an error from a
//! successful empty result.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::tools::{InvokeError, ToolInfo};

pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC error codes used by the front end.
pub mod error_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const TOOL_EXECUTION: i64 = -32000;
    pub const TOOL_TIMEOUT: i64 = -32001;
}

/// An inbound JSON-RPC frame. A missing `id` marks a notification.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Deserialize)]
pub struct CallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
}

pub fn response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

pub fn error_response(id: Value, code: i64, message: &str, kind: Option<&str>) -> Value {
    let mut error = json!({ "code": code, "message": message });
    if let Some(kind) = kind {
        error["data"] = json!({ "kind": kind });
    }
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

pub fn notification(method: &str) -> Value {
    json!({ "jsonrpc": "2.0", "method": method, "params": {} })
}

pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": true } },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

/// The discovery payload: metadata only, never callable handles.
pub fn tools_list_result(tools: &[ToolInfo]) -> Value {
    let tools: Vec<Value> = tools
        .iter()
        .map(|info| {
            json!({
                "name": info.name,
                "description": info.description,
                "inputSchema": info.signature.input_schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// A successful `tools/call` payload.
pub fn call_result(value: Value) -> Value {
    json!({
        "content": [{ "type": "text", "text": value.to_string() }],
        "structuredContent": { "result": value },
        "isError": false
    })
}

/// Map a dispatch failure to a structured error response.
pub fn invoke_error_response(id: Value, error: &InvokeError) -> Value {
    let code = match error {
        InvokeError::ToolNotFound(_) | InvokeError::InvalidArguments { .. } => {
            error_code::INVALID_PARAMS
        }
        InvokeError::Execution { .. } => error_code::TOOL_EXECUTION,
        InvokeError::Timeout { .. } => error_code::TOOL_TIMEOUT,
    };
    error_response(id, code, &error.to_string(), Some(error.kind()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::tools::InvokeError;

    #[test]
    fn test_request_without_id_is_notification() {
        let request: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.method, "notifications/initialized");
    }

    #[test]
    fn test_call_params_default_arguments() {
        let params: CallParams = serde_json::from_value(json!({"name": "add"})).unwrap();
        assert!(params.arguments.is_empty());
    }

    #[test]
    fn test_invoke_error_carries_kind() {
        let frame = invoke_error_response(
            json!(7),
            &InvokeError::ToolNotFound("ghost".to_string()),
        );
        assert_eq!(frame["error"]["code"], json!(error_code::INVALID_PARAMS));
        assert_eq!(frame["error"]["data"]["kind"], "tool_not_found");
        assert_eq!(frame["id"], json!(7));
    }

    #[test]
    fn test_initialize_result_shape() {
        let result = initialize_result();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "toolforge");
    }
}
