//! Process-wide capability table.
//!
//! Populated once during startup registration, then read-mostly for the
//! process lifetime. Hot reload re-registration goes through the same
//! `upsert` path: same name replaces the entry wholesale, new names add,
//! and nothing is deleted for names absent from a later descriptor set.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::tools::tool::{RegisteredTool, ToolInfo};

/// The table mapping tool name to its registered implementation.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<RegisteredTool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tool. Last write wins; the entry is swapped as a
    /// whole, so a concurrent reader never observes a half-replaced tool.
    pub async fn upsert(&self, tool: RegisteredTool) {
        let name = tool.name.clone();
        let previous = self.tools.write().await.insert(name.clone(), Arc::new(tool));
        if previous.is_some() {
            tracing::debug!(name = %name, "Replaced existing tool registration");
        }
    }

    /// Look up a tool for dispatch. Discovery must use [`list`](Self::list).
    pub async fn get(&self, name: &str) -> Option<Arc<RegisteredTool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// Discovery metadata for every registered tool, sorted by name so the
    /// result is a deterministic function of the table contents.
    pub async fn list(&self) -> Vec<ToolInfo> {
        let mut infos: Vec<ToolInfo> = self
            .tools
            .read()
            .await
            .values()
            .map(|tool| tool.info())
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub async fn len(&self) -> usize {
        self.tools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.read().await.is_empty()
    }
}
