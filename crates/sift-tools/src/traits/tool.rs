use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{error_payload, Context, ToolDefinition};

/// Serialized tool result. Error outputs hold an `{"error": ...}` payload so
/// the model sees one textual shape for both outcomes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            content: serde_json::to_string(value)?,
            is_error: false,
        })
    }

    pub fn error(message: impl AsRef<str>) -> Self {
        Self {
            content: error_payload(message),
            is_error: true,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// `input` is always a JSON object that already passed the definition's
    /// required-parameter and type checks.
    async fn execute(&self, ctx: &Context, input: Value) -> Result<ToolOutput>;

    fn name(&self) -> &str {
        &self.definition().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_text() {
        let output = ToolOutput::text("Hello, world!");
        assert_eq!(output.content, "Hello, world!");
        assert!(!output.is_error);
    }

    #[test]
    fn test_tool_output_json() {
        let data = serde_json::json!([{"title": "t", "link": "https://arxiv.org"}]);
        let output = ToolOutput::json(&data).unwrap();
        assert!(output.content.contains("arxiv"));
        assert!(!output.is_error);
    }

    #[test]
    fn test_tool_output_error_is_payload() {
        let output = ToolOutput::error("Something went wrong");
        assert!(output.is_error);

        let value: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(value["error"], "Something went wrong");
    }
}
