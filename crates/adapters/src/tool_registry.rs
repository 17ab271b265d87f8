//! A name-keyed `ToolRegistry` implementing `ToolExecutor` by fanning
//! out to whichever registered tool matches the call. Grounded on
//! `sa_tools::manager::ProcessManager`'s `RwLock<HashMap<String,
//! Arc<..>>>` registration/lookup shape.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reactor_domain::{ToolCall, ToolDefinition};
use reactor_engine::{ToolExecutor, ToolOutcome};

struct Entry {
    definition: ToolDefinition,
    executor: Arc<dyn ToolExecutor>,
}

/// Maps tool name to `(ToolDefinition, executor)`. Implements
/// `ToolExecutor` itself so a `ReactEngine` can be handed one registry
/// instead of juggling a `HashMap` in application code — the same dual
/// pattern `ProcessManager` offers (a map for wiring, a single dispatch
/// method in the hot path).
pub struct ToolRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, definition: ToolDefinition, executor: Arc<dyn ToolExecutor>) {
        self.entries.write().insert(definition.name.clone(), Entry { definition, executor });
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.read().values().map(|e| e.definition.clone()).collect()
    }

    pub fn remove(&self, name: &str) {
        self.entries.write().remove(name);
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        let executor = self.entries.read().get(&call.tool_name).map(|e| e.executor.clone());
        match executor {
            Some(executor) => executor.execute(call).await,
            None => ToolOutcome::Completed(reactor_engine::tool_executor::unknown_tool_result(call)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactor_domain::{FailureReason, ToolResult};

    struct Echo;

    #[async_trait]
    impl ToolExecutor for Echo {
        async fn execute(&self, call: &ToolCall) -> ToolOutcome {
            ToolOutcome::Completed(ToolResult::ok(call.call_id.clone(), call.tool_name.clone(), serde_json::json!({"echoed": true})))
        }
    }

    fn def(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "d", serde_json::json!({"type": "object", "properties": {}}))
    }

    #[tokio::test]
    async fn dispatches_to_registered_tool() {
        let registry = ToolRegistry::new();
        registry.register(def("search"), Arc::new(Echo));
        let call = ToolCall { call_id: "c1".into(), tool_name: "search".into(), arguments: serde_json::json!({}) };
        let ToolOutcome::Completed(result) = registry.execute(&call).await else { panic!("expected completion") };
        assert!(!result.is_failure());
    }

    #[tokio::test]
    async fn unknown_tool_reports_failure() {
        let registry = ToolRegistry::new();
        let call = ToolCall { call_id: "c1".into(), tool_name: "ghost".into(), arguments: serde_json::json!({}) };
        let ToolOutcome::Completed(result) = registry.execute(&call).await else { panic!("expected completion") };
        assert!(matches!(result.failure, Some(FailureReason::UnknownTool { .. })));
    }

    #[test]
    fn definitions_reflects_registered_tools() {
        let registry = ToolRegistry::new();
        registry.register(def("search"), Arc::new(Echo));
        registry.register(def("fetch"), Arc::new(Echo));
        let mut names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        names.sort();
        assert_eq!(names, vec!["fetch".to_string(), "search".to_string()]);
    }
}
