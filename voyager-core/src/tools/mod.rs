//! Callable tools exposed to the model
//!
//! Tools are the sub-capabilities a completion call may invoke on its own:
//! deterministic travel lookups and persona-prompted expert delegates. Each
//! tool declares a name, a description, and a JSON schema for its arguments;
//! the completion provider handles the invocation protocol.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{Result, VoyagerError};

mod experts;
mod voyager;

pub use experts::{ExpertAgent, expert_toolset};
pub use voyager::{
    CalendarValidator, EstimateBudget, FindAttractions, TravelGapChecker, travel_toolset,
};

/// A callable sub-capability the model may invoke during a completion.
#[async_trait]
pub trait ExpertTool: Send + Sync {
    /// Unique tool name, as presented to the model
    fn name(&self) -> &str;

    /// Human-readable description for tool discovery
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments
    fn parameters(&self) -> Value;

    /// Execute the tool with decoded arguments
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Type alias for shared tools
pub type BoxedExpertTool = Arc<dyn ExpertTool>;

/// An ordered, name-keyed collection of tools for one completion call.
///
/// Insertion order is preserved so that tool listings presented to the model
/// are deterministic across runs.
#[derive(Default, Clone)]
pub struct ToolSet {
    tools: Vec<BoxedExpertTool>,
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("names", &self.names())
            .finish()
    }
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any existing tool with the same name.
    pub fn with_tool(mut self, tool: impl ExpertTool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Register a shared tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: BoxedExpertTool) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&BoxedExpertTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Iterate tools in registration order
    pub fn iter(&self) -> impl Iterator<Item = &BoxedExpertTool> {
        self.tools.iter()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Merge another tool set into this one (later registrations win).
    pub fn merged(mut self, other: ToolSet) -> Self {
        for tool in other.tools {
            self.register(tool);
        }
        self
    }

    /// Invoke a tool by name.
    ///
    /// An unknown name is a `Tool` error; a failing tool call is wrapped the
    /// same way so providers can serialize the failure back to the model.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| VoyagerError::Tool {
            name: name.to_string(),
            message: "no such tool".to_string(),
        })?;

        tool.call(args).await.map_err(|e| VoyagerError::Tool {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ExpertTool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its arguments back"
        }

        fn parameters(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": { "message": { "type": "string" } },
                "required": ["message"]
            })
        }

        async fn call(&self, args: Value) -> Result<Value> {
            Ok(args)
        }
    }

    struct Failing;

    #[async_trait]
    impl ExpertTool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters(&self) -> Value {
            serde_json::json!({ "type": "object", "properties": {} })
        }

        async fn call(&self, _args: Value) -> Result<Value> {
            Err(VoyagerError::Transport("expert unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let tools = ToolSet::new().with_tool(Echo);
        let result = tools
            .dispatch("echo", serde_json::json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(result["message"], "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tool_error() {
        let tools = ToolSet::new().with_tool(Echo);
        let err = tools
            .dispatch("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, VoyagerError::Tool { .. }));
    }

    #[tokio::test]
    async fn tool_failure_is_wrapped_with_the_tool_name() {
        let tools = ToolSet::new().with_tool(Failing);
        let err = tools
            .dispatch("failing", serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            VoyagerError::Tool { name, message } => {
                assert_eq!(name, "failing");
                assert!(message.contains("expert unavailable"));
            }
            other => panic!("expected Tool error, got {other:?}"),
        }
    }

    #[test]
    fn names_preserve_registration_order() {
        let tools = ToolSet::new().with_tool(Echo).with_tool(Failing);
        assert_eq!(tools.names(), vec!["echo", "failing"]);
    }
}
