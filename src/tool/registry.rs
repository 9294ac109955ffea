// ABOUTME: Implements the Registry - a thread-safe map from stable tool
// ABOUTME: names to tools, with schema validation and envelope dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Tool, ToolDefinition, ToolResult};
use crate::error::RegistryError;

/// A thread-safe registry of tools.
#[derive(Default)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    pub async fn register<T: Tool + 'static>(&self, tool: T) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(tool)).await
    }

    /// Register a tool from an Arc.
    ///
    /// Fails if the name is taken or the schema is not a usable object schema.
    pub async fn register_arc(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        validate_schema(tool.name(), &tool.schema())?;

        let mut tools = self.tools.write().await;
        if tools.contains_key(tool.name()) {
            return Err(RegistryError::Duplicate(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "registered tool");
        tools.insert(tool.name().to_string(), tool);
        Ok(())
    }

    /// Unregister a tool by name.
    pub async fn unregister(&self, name: &str) {
        let mut tools = self.tools.write().await;
        tools.remove(name);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names, sorted alphabetically.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools.
    pub async fn count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// Convert all tools to definitions, sorted by name.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut defs: Vec<_> = tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Call a tool by exact name.
    ///
    /// An unknown name is the caller's mistake and comes back as an error;
    /// every failure inside a known tool comes back as a failure envelope.
    pub async fn call(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<ToolResult, RegistryError> {
        let tool = self
            .get(name)
            .await
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;
        Ok(tool.execute(params).await)
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
        }
    }
}

fn validate_schema(name: &str, schema: &serde_json::Value) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidSchema {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("tool name is empty"));
    }
    if schema.get("type").and_then(|t| t.as_str()) != Some("object") {
        return Err(invalid("schema type must be \"object\""));
    }
    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .ok_or_else(|| invalid("schema has no properties object"))?;

    if let Some(required) = schema.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| invalid("`required` must be an array"))?;
        for field in required {
            let field = field
                .as_str()
                .ok_or_else(|| invalid("`required` entries must be strings"))?;
            if !properties.contains_key(field) {
                return Err(RegistryError::InvalidSchema {
                    name: name.to_string(),
                    reason: format!("required parameter `{field}` is not declared"),
                });
            }
        }
    }
    Ok(())
}
