//! Tool invocation: argument binding, budgeted execution, trap mapping.
//!
//! Arguments arrive as a JSON object and are bound by name in signature
//! order. Execution happens on the blocking thread pool under a fuel budget
//! and an epoch deadline; a wall-clock timeout abandons the call best-effort
//! (the epoch deadline bounds how long an abandoned call can keep running,
//! so the namespace lock is always released).

use std::sync::Arc;

use serde_json::Value;
use wasmtime::{Trap, Val};

use crate::tools::forge::Forge;
use crate::tools::tool::{InvokeError, RegisteredTool, ToolParam, WasmType};

/// Dispatches calls against registered tools.
#[derive(Debug, Clone)]
pub struct Invoker {
    forge: Arc<Forge>,
}

impl Invoker {
    pub fn new(forge: Arc<Forge>) -> Self {
        Self { forge }
    }

    /// Invoke a registered tool with named arguments.
    pub async fn invoke(
        &self,
        tool: &Arc<RegisteredTool>,
        arguments: &serde_json::Map<String, Value>,
    ) -> Result<Value, InvokeError> {
        let params = bind_arguments(&tool.name, &tool.signature.params, arguments)?;

        let forge = Arc::clone(&self.forge);
        let tool = Arc::clone(tool);
        let name = tool.name.clone();
        let budget = forge.limits().timeout;

        let handle =
            tokio::task::spawn_blocking(move || call_blocking(&forge, &tool, &params));

        match tokio::time::timeout(budget, handle).await {
            // The blocking task is abandoned; the epoch deadline will trap it.
            Err(_elapsed) => Err(InvokeError::Timeout { name, budget }),
            Ok(Err(join_error)) => Err(InvokeError::Execution {
                name,
                reason: join_error.to_string(),
            }),
            Ok(Ok(result)) => result,
        }
    }
}

/// Bind a JSON argument object to wasm values in signature order.
fn bind_arguments(
    name: &str,
    params: &[ToolParam],
    arguments: &serde_json::Map<String, Value>,
) -> Result<Vec<Val>, InvokeError> {
    for key in arguments.keys() {
        if !params.iter().any(|p| p.name == *key) {
            return Err(InvokeError::InvalidArguments {
                name: name.to_string(),
                reason: format!("unknown argument '{key}'"),
            });
        }
    }

    params
        .iter()
        .map(|param| match arguments.get(&param.name) {
            Some(value) => json_to_val(name, param, value),
            None if param.required => Err(InvokeError::InvalidArguments {
                name: name.to_string(),
                reason: format!("missing required argument '{}'", param.name),
            }),
            None => Ok(zero_val(param.ty)),
        })
        .collect()
}

fn json_to_val(name: &str, param: &ToolParam, value: &Value) -> Result<Val, InvokeError> {
    let mismatch = || InvokeError::InvalidArguments {
        name: name.to_string(),
        reason: format!(
            "argument '{}' expects {}, got {value}",
            param.name, param.ty
        ),
    };

    match param.ty {
        WasmType::I32 => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Val::I32)
            .ok_or_else(mismatch),
        WasmType::I64 => value.as_i64().map(Val::I64).ok_or_else(mismatch),
        WasmType::F32 => value
            .as_f64()
            .map(|v| Val::F32((v as f32).to_bits()))
            .ok_or_else(mismatch),
        WasmType::F64 => value
            .as_f64()
            .map(|v| Val::F64(v.to_bits()))
            .ok_or_else(mismatch),
    }
}

fn zero_val(ty: WasmType) -> Val {
    match ty {
        WasmType::I32 => Val::I32(0),
        WasmType::I64 => Val::I64(0),
        WasmType::F32 => Val::F32(0),
        WasmType::F64 => Val::F64(0),
    }
}

/// Run the call with fuel and epoch budgets applied.
fn call_blocking(
    forge: &Forge,
    tool: &RegisteredTool,
    params: &[Val],
) -> Result<Value, InvokeError> {
    let mut namespace = forge.lock_namespace();
    let store = namespace.store_mut();

    store
        .set_fuel(forge.limits().fuel)
        .map_err(|e| InvokeError::Execution {
            name: tool.name.clone(),
            reason: format!("{e:#}"),
        })?;
    store.set_epoch_deadline(forge.deadline_ticks());

    let mut results = vec![Val::I32(0); tool.signature.results.len()];
    match tool.handle().call(&mut *store, params, &mut results) {
        Ok(()) => Ok(results_to_json(&results)),
        Err(error) => Err(map_call_error(forge, &tool.name, error)),
    }
}

fn map_call_error(forge: &Forge, name: &str, error: wasmtime::Error) -> InvokeError {
    if let Some(trap) = error.downcast_ref::<Trap>() {
        match trap {
            // Both budgets surface as a timeout: fuel is the CPU budget,
            // the epoch deadline the wall-clock backstop.
            Trap::OutOfFuel | Trap::Interrupt => InvokeError::Timeout {
                name: name.to_string(),
                budget: forge.limits().timeout,
            },
            _ => InvokeError::Execution {
                name: name.to_string(),
                reason: trap.to_string(),
            },
        }
    } else {
        InvokeError::Execution {
            name: name.to_string(),
            reason: format!("{error:#}"),
        }
    }
}

/// Render call results: none as null, one verbatim, several as an array.
fn results_to_json(results: &[Val]) -> Value {
    match results {
        [] => Value::Null,
        [single] => val_to_json(single),
        many => Value::Array(many.iter().map(val_to_json).collect()),
    }
}

fn val_to_json(val: &Val) -> Value {
    match val {
        Val::I32(v) => Value::from(*v),
        Val::I64(v) => Value::from(*v),
        Val::F32(bits) => Value::from(f32::from_bits(*bits) as f64),
        Val::F64(bits) => Value::from(f64::from_bits(*bits)),
        // Registration rejects signatures with other types.
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::Invoker;
    use crate::tools::descriptor::ToolDescriptor;
    use crate::tools::forge::Forge;
    use crate::tools::registry::ToolRegistry;
    use crate::tools::tool::InvokeError;
    use crate::tools::{register_all, RegisteredTool};

    const ADD: &str = r#"(module
        (func (export "add") (param $a i64) (param $b i64) (result i64)
          local.get $a
          local.get $b
          i64.add))"#;

    const SPIN: &str = r#"(module
        (func (export "spin")
          (loop $forever br $forever)))"#;

    const SCALE: &str = r#"(module
        (func (export "scale") (param $x f64) (result f64)
          local.get $x
          f64.const 2
          f64.mul))"#;

    async fn registered(
        forge: &Arc<Forge>,
        name: &str,
        source: &str,
    ) -> Arc<RegisteredTool> {
        let registry = ToolRegistry::new();
        let descriptor = ToolDescriptor {
            name: name.to_string(),
            description: String::new(),
            script_content: source.to_string(),
            params: None,
        };
        let report = register_all(forge, &registry, std::slice::from_ref(&descriptor)).await;
        assert!(report.all_succeeded(), "failed: {:?}", report.failed);
        registry.get(name).await.unwrap()
    }

    fn args(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invoke_add() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "add", ADD).await;
        let invoker = Invoker::new(forge);

        let result = invoker
            .invoke(&tool, &args(json!({"a": 2, "b": 3})))
            .await
            .unwrap();
        assert_eq!(result, json!(5));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invoke_float_tool() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "scale", SCALE).await;
        let invoker = Invoker::new(forge);

        let result = invoker
            .invoke(&tool, &args(json!({"x": 1.5})))
            .await
            .unwrap();
        assert_eq!(result, json!(3.0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_argument() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "add", ADD).await;
        let invoker = Invoker::new(forge);

        let err = invoker
            .invoke(&tool, &args(json!({"a": 2})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::InvalidArguments { .. }));
        assert!(err.to_string().contains("b"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_argument() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "add", ADD).await;
        let invoker = Invoker::new(forge);

        let err = invoker
            .invoke(&tool, &args(json!({"a": 1, "b": 2, "c": 3})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::InvalidArguments { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_type_mismatch() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "add", ADD).await;
        let invoker = Invoker::new(forge);

        let err = invoker
            .invoke(&tool, &args(json!({"a": "two", "b": 3})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::InvalidArguments { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_runaway_tool_times_out() {
        let forge = Arc::new(Forge::for_testing());
        let tool = registered(&forge, "spin", SPIN).await;
        let invoker = Invoker::new(Arc::clone(&forge));

        let err = invoker.invoke(&tool, &args(json!({}))).await.unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { .. }));

        // The server keeps serving: the namespace lock was released and
        // other tools still run.
        let add = registered(&forge, "add", ADD).await;
        let result = invoker
            .invoke(&add, &args(json!({"a": 20, "b": 22})))
            .await
            .unwrap();
        assert_eq!(result, json!(42));
    }
}
