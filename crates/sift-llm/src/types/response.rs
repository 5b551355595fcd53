use super::usage::TokenUsage;
use serde::{Deserialize, Serialize};
use sift_core::{Message, ToolCallRequest};

/// What the model said in one turn: optional text and zero or more tool calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantTurn {
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn into_message(self) -> Message {
        Message::assistant_turn(self.content, self.tool_calls)
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    ContentFilter,
}

impl StopReason {
    pub fn from_finish_reason(reason: &str) -> Option<Self> {
        match reason {
            "stop" => Some(StopReason::EndTurn),
            "length" => Some(StopReason::MaxTokens),
            "tool_calls" | "function_call" => Some(StopReason::ToolUse),
            "content_filter" => Some(StopReason::ContentFilter),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    /// The model that actually served the request, which may differ from the
    /// one asked for when the endpoint routes between models.
    pub model: String,
    pub turn: AssistantTurn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn new(id: impl Into<String>, model: impl Into<String>, turn: AssistantTurn) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            turn,
            stop_reason: None,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = Some(reason);
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn text_content(&self) -> &str {
        self.turn.text()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.turn.has_tool_calls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Role;

    #[test]
    fn test_completion_response() {
        let resp = CompletionResponse::new("resp-123", "llama3-8b-8192", AssistantTurn::from_text("Hello"))
            .with_stop_reason(StopReason::EndTurn)
            .with_usage(TokenUsage::new(10, 5));

        assert_eq!(resp.id, "resp-123");
        assert_eq!(resp.text_content(), "Hello");
        assert_eq!(resp.usage.total(), 15);
        assert!(!resp.has_tool_calls());
    }

    #[test]
    fn test_turn_into_message() {
        let turn = AssistantTurn {
            content: Some(String::new()),
            tool_calls: vec![ToolCallRequest::new("call_1", "search", "{}")],
        };

        let msg = turn.into_message();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls.len(), 1);
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(StopReason::from_finish_reason("tool_calls"), Some(StopReason::ToolUse));
        assert_eq!(StopReason::from_finish_reason("length"), Some(StopReason::MaxTokens));
        assert_eq!(StopReason::from_finish_reason("other"), None);
    }
}
