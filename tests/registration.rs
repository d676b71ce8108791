//! End-to-end registration and dispatch over the library surface:
//! registry file -> register_all -> discovery -> invocation.

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use toolforge::tools::forge::Forge;
use toolforge::tools::{Invoker, ToolRegistry, load_descriptors, register_all};

const ADD: &str = r#"(module
  (func (export "add") (param $a i64) (param $b i64) (result i64)
    local.get $a
    local.get $b
    i64.add))"#;

const HELPER_V1: &str = r#"(module
  (func (export "helper") (result i64) i64.const 40))"#;

const HELPER_V2: &str = r#"(module
  (func (export "helper") (result i64) i64.const 100))"#;

const TOOL2: &str = r#"(module
  (import "env" "helper" (func $helper (result i64)))
  (func (export "tool2") (result i64)
    call $helper
    i64.const 2
    i64.add))"#;

fn write_registry(entries: &serde_json::Value) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(&path, serde_json::to_vec_pretty(entries).unwrap()).unwrap();
    (dir, path)
}

fn args(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().unwrap().clone()
}

#[tokio::test(flavor = "multi_thread")]
async fn registry_file_to_live_tool() {
    let (_dir, path) = write_registry(&json!([
        {
            "name": "add",
            "description": "Add two integers",
            // fenced the way generated snippets arrive
            "script_content": format!("```wat\n{ADD}\n```"),
        }
    ]));

    let descriptors = load_descriptors(&path).await.unwrap();
    let forge = Arc::new(Forge::for_testing());
    let registry = ToolRegistry::new();

    let report = register_all(&forge, &registry, &descriptors).await;
    assert_eq!(report.registered, ["add"]);

    let listed = registry.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "Add two integers");
    let names: Vec<&str> = listed[0]
        .signature
        .params
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, ["a", "b"]);

    let tool = registry.get("add").await.unwrap();
    let invoker = Invoker::new(forge);
    let result = invoker
        .invoke(&tool, &args(json!({"a": 2, "b": 3})))
        .await
        .unwrap();
    assert_eq!(result, json!(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_descriptor_yields_empty_tool_set() {
    let (_dir, path) = write_registry(&json!([
        {
            "name": "bad",
            "description": "never materializes",
            "script_content": "def bad(: syntax error",
        }
    ]));

    let descriptors = load_descriptors(&path).await.unwrap();
    let forge = Arc::new(Forge::for_testing());
    let registry = ToolRegistry::new();

    let report = register_all(&forge, &registry, &descriptors).await;
    assert_eq!(report.registered_count(), 0);
    assert_eq!(report.failed_count(), 1);
    assert!(registry.list().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_namespace_with_collision_overwrite() {
    // helper is defined, redefined, and then used by tool2: the later
    // definition must win, and tool2 must see it.
    let (_dir, path) = write_registry(&json!([
        { "name": "helper", "description": "", "script_content": HELPER_V1 },
        { "name": "helper", "description": "", "script_content": HELPER_V2 },
        { "name": "tool2", "description": "", "script_content": TOOL2 },
    ]));

    let descriptors = load_descriptors(&path).await.unwrap();
    let forge = Arc::new(Forge::for_testing());
    let registry = ToolRegistry::new();

    let report = register_all(&forge, &registry, &descriptors).await;
    assert!(report.all_succeeded());
    // Two names: the duplicate helper upserted over itself.
    assert_eq!(registry.len().await, 2);

    let invoker = Invoker::new(forge);
    let tool2 = registry.get("tool2").await.unwrap();
    let result = invoker.invoke(&tool2, &args(json!({}))).await.unwrap();
    assert_eq!(result, json!(102));
}

#[tokio::test(flavor = "multi_thread")]
async fn reregistration_is_idempotent() {
    let (_dir, path) = write_registry(&json!([
        { "name": "add", "description": "adds", "script_content": ADD },
    ]));

    let descriptors = load_descriptors(&path).await.unwrap();
    let forge = Arc::new(Forge::for_testing());
    let registry = ToolRegistry::new();

    register_all(&forge, &registry, &descriptors).await;
    let first = registry.list().await;
    register_all(&forge, &registry, &descriptors).await;
    let second = registry.list().await;

    assert_eq!(registry.len().await, 1);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );

    // The replaced entry still dispatches.
    let invoker = Invoker::new(forge);
    let tool = registry.get("add").await.unwrap();
    let result = invoker
        .invoke(&tool, &args(json!({"a": 40, "b": 2})))
        .await
        .unwrap();
    assert_eq!(result, json!(42));
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_survives_mixed_outcomes() {
    let (_dir, path) = write_registry(&json!([
        { "name": "bad", "description": "", "script_content": "(module (func" },
        { "name": "add", "description": "", "script_content": ADD },
        { "name": "ghost", "description": "", "script_content": "(module)" },
    ]));

    let descriptors = load_descriptors(&path).await.unwrap();
    let forge = Arc::new(Forge::for_testing());
    let registry = ToolRegistry::new();

    let report = register_all(&forge, &registry, &descriptors).await;

    assert_eq!(report.registered, ["add"]);
    assert_eq!(report.failed_count(), 2);
    let listed = registry.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "add");
}
