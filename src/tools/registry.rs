//! Name → tool map with discovery listing.
//!
//! One registry is constructed at process start ([`ToolRegistry::builtin`])
//! and shared behind `Arc` by the orchestrator and the REST layer. It is
//! deliberately not a global: tests build their own instances.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::Tool;

/// One entry of the discovery listing.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard registry: the five task tools.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tool in [
            Arc::new(super::add_task::AddTask) as Arc<dyn Tool>,
            Arc::new(super::list_tasks::ListTasks),
            Arc::new(super::complete_task::CompleteTask),
            Arc::new(super::delete_task::DeleteTask),
            Arc::new(super::update_task::UpdateTask),
        ] {
            registry.register(tool.name(), tool);
        }
        registry
    }

    /// Register `tool` under `name`. Re-registering a name replaces the
    /// previous implementation; only the latest is ever invoked.
    pub fn register(&mut self, name: &str, tool: Arc<dyn Tool>) {
        self.tools.insert(name.to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Discovery listing, sorted by name for stable output.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut entries: Vec<ToolDescriptor> = self
            .tools
            .iter()
            .map(|(name, tool)| ToolDescriptor {
                name: name.clone(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
                output_schema: tool.output_schema(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FieldSpec;
    use async_trait::async_trait;
    use serde_json::json;
    use sqlx::SqliteConnection;

    struct Stub(&'static str);

    #[async_trait]
    impl Tool for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn description(&self) -> &'static str {
            self.0
        }
        fn fields(&self) -> &'static [FieldSpec] {
            &[]
        }
        fn output_schema(&self) -> Value {
            json!({})
        }
        async fn execute(
            &self,
            _db: &mut SqliteConnection,
            _args: &Value,
        ) -> anyhow::Result<Value> {
            Ok(json!({ "from": self.0 }))
        }
    }

    #[test]
    fn register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register("stub", Arc::new(Stub("first")));
        assert!(registry.contains("stub"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ToolRegistry::new();
        registry.register("stub", Arc::new(Stub("first")));
        registry.register("stub", Arc::new(Stub("second")));

        let tool = registry.get("stub").unwrap();
        assert_eq!(tool.description(), "second");
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn builtin_has_the_five_task_tools() {
        let registry = ToolRegistry::builtin();
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "add_task",
                "complete_task",
                "delete_task",
                "list_tasks",
                "update_task"
            ]
        );
    }

    #[test]
    fn listing_carries_schemas() {
        let registry = ToolRegistry::builtin();
        let listing = registry.list();
        let add = listing.iter().find(|d| d.name == "add_task").unwrap();
        assert_eq!(add.input_schema["type"], "object");
        assert!(add.input_schema["properties"]["title"].is_object());
        assert!(!add.description.is_empty());
    }
}
