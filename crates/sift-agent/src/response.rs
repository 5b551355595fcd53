use serde::{Deserialize, Serialize};
use sift_core::ToolResult;
use sift_llm::TokenUsage;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub output: String,
    pub is_error: bool,
    pub duration_ms: u64,
}

impl ToolCallRecord {
    pub fn new(arguments: impl Into<String>, result: &ToolResult, duration: Duration) -> Self {
        Self {
            id: result.tool_call_id.clone(),
            name: result.name.clone(),
            arguments: arguments.into(),
            output: result.content.clone(),
            is_error: result.is_error,
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Outcome of a run that reached `Done`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    /// Model reported by the last completion.
    pub model: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
    pub usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

impl AgentResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            tool_calls: Vec::new(),
            iterations: 1,
            usage: TokenUsage::default(),
            estimated_cost: None,
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_estimated_cost(mut self, cost: Option<f64>) -> Self {
        self.estimated_cost = cost;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn failed_tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter().filter(|tc| tc.is_error)
    }
}
