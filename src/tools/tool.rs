//! Registered tool types and the dispatch-side error taxonomy.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use wasmtime::Func;

/// Wasm value type of a tool parameter or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
}

impl WasmType {
    pub(crate) fn from_val_type(ty: &wasmtime::ValType) -> Option<Self> {
        match ty {
            wasmtime::ValType::I32 => Some(WasmType::I32),
            wasmtime::ValType::I64 => Some(WasmType::I64),
            wasmtime::ValType::F32 => Some(WasmType::F32),
            wasmtime::ValType::F64 => Some(WasmType::F64),
            _ => None,
        }
    }

    /// JSON Schema type advertised for this wasm type.
    pub fn schema_type(&self) -> &'static str {
        match self {
            WasmType::I32 | WasmType::I64 => "integer",
            WasmType::F32 | WasmType::F64 => "number",
        }
    }
}

impl std::fmt::Display for WasmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WasmType::I32 => "i32",
            WasmType::I64 => "i64",
            WasmType::F32 => "f32",
            WasmType::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

/// One parameter of a tool's calling signature.
#[derive(Debug, Clone, Serialize)]
pub struct ToolParam {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: WasmType,

    /// Callers may omit optional parameters; they default to zero.
    pub required: bool,
}

/// Ordered calling signature of a registered tool.
///
/// This is the only way callers learn how to invoke the tool; no separate
/// schema is authored for reflected signatures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolSignature {
    pub params: Vec<ToolParam>,
    pub results: Vec<WasmType>,
}

impl ToolSignature {
    /// JSON Schema object advertised as the tool's `inputSchema`.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            properties.insert(
                param.name.clone(),
                serde_json::json!({ "type": param.ty.schema_type() }),
            );
            if param.required {
                required.push(serde_json::Value::String(param.name.clone()));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

/// A tool after successful materialization and resolution.
///
/// Immutable once created; re-registration replaces the whole entry rather
/// than patching it.
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub signature: ToolSignature,
    handle: Func,
}

impl RegisteredTool {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ToolSignature,
        handle: Func,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            signature,
            handle,
        }
    }

    /// The callable handle, reachable only from the dispatch path.
    pub(crate) fn handle(&self) -> Func {
        self.handle
    }

    /// Discovery metadata for this tool. Never exposes the handle.
    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            signature: self.signature.clone(),
        }
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.name)
            .field("params", &self.signature.params.len())
            .finish()
    }
}

/// Discovery metadata for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub signature: ToolSignature,
}

/// Error surfaced to remote callers on the dispatch path.
///
/// The process keeps serving after any of these; they are returned as
/// structured responses, never crashes.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    #[error("invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("tool {name} failed: {reason}")]
    Execution { name: String, reason: String },

    #[error("tool {name} exceeded its budget of {budget:?}")]
    Timeout { name: String, budget: Duration },
}

impl InvokeError {
    /// Machine-readable error kind carried in protocol error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::ToolNotFound(_) => "tool_not_found",
            InvokeError::InvalidArguments { .. } => "invalid_arguments",
            InvokeError::Execution { .. } => "tool_execution",
            InvokeError::Timeout { .. } => "tool_timeout",
        }
    }
}
