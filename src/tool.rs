//! Tool declarations and materialization.
//!
//! A session tool is either a static set of function declarations or a
//! callable that produces its declarations asynchronously. Callables are
//! resolved once, before the setup frame is transmitted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// A function the model may call during the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl FunctionDeclaration {
    /// Create a new declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, parameters: None }
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the parameters schema.
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }
}

/// A tool that resolves its declarations asynchronously.
///
/// Resolution may perform I/O (e.g. listing a remote tool server). A failure
/// here rejects the whole connect call.
#[async_trait]
pub trait CallableTool: Send + Sync {
    /// Produce the static declarations to advertise in the setup frame.
    async fn declarations(&self) -> Result<Vec<FunctionDeclaration>>;
}

/// A tool configured on a session.
#[derive(Clone)]
pub enum LiveTool {
    /// Static declarations, passed through unchanged.
    Declarations(Vec<FunctionDeclaration>),
    /// A callable resolved to declarations during the handshake.
    Callable(Arc<dyn CallableTool>),
}

impl std::fmt::Debug for LiveTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiveTool::Declarations(decls) => {
                f.debug_tuple("Declarations").field(decls).finish()
            }
            LiveTool::Callable(_) => f.debug_tuple("Callable").field(&"..").finish(),
        }
    }
}

impl From<FunctionDeclaration> for LiveTool {
    fn from(decl: FunctionDeclaration) -> Self {
        LiveTool::Declarations(vec![decl])
    }
}

impl From<Vec<FunctionDeclaration>> for LiveTool {
    fn from(decls: Vec<FunctionDeclaration>) -> Self {
        LiveTool::Declarations(decls)
    }
}

/// Resolve every configured tool to its static declarations.
pub(crate) async fn materialize_tools(tools: &[LiveTool]) -> Result<Vec<FunctionDeclaration>> {
    let mut declarations = Vec::new();
    for tool in tools {
        match tool {
            LiveTool::Declarations(decls) => declarations.extend(decls.iter().cloned()),
            LiveTool::Callable(callable) => declarations.extend(callable.declarations().await?),
        }
    }
    Ok(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedTool(Vec<FunctionDeclaration>);

    #[async_trait]
    impl CallableTool for FixedTool {
        async fn declarations(&self) -> Result<Vec<FunctionDeclaration>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_materialize_mixes_static_and_callable() {
        let static_tool = FunctionDeclaration::new("get_weather")
            .with_description("Get current weather")
            .with_parameters(json!({"type": "object", "properties": {}}));
        let callable = Arc::new(FixedTool(vec![FunctionDeclaration::new("search")]));

        let tools =
            vec![LiveTool::from(static_tool.clone()), LiveTool::Callable(callable)];
        let decls = materialize_tools(&tools).await.unwrap();

        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0], static_tool);
        assert_eq!(decls[1].name, "search");
    }

    #[tokio::test]
    async fn test_materialize_empty() {
        let decls = materialize_tools(&[]).await.unwrap();
        assert!(decls.is_empty());
    }
}
