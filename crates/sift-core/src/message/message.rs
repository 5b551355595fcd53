use crate::tool::{ToolCallRequest, ToolResult};
use crate::types::MessageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a conversation.
///
/// Assistant messages may carry tool-call requests instead of (or next to)
/// text. Tool messages carry the serialized result and the id of the call
/// they answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: Option<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            created_at: Utc::now(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, Some(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Some(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Some(text.into()))
    }

    pub fn assistant_turn(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        let mut msg = Self::new(Role::Assistant, content.filter(|c| !c.is_empty()));
        msg.tool_calls = tool_calls;
        msg
    }

    pub fn tool_result(result: &ToolResult) -> Self {
        let mut msg = Self::new(Role::Tool, Some(result.content.clone()));
        msg.tool_call_id = Some(result.tool_call_id.clone());
        msg.name = Some(result.name.clone());
        msg
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn answers(&self, call_id: &str) -> bool {
        self.role == Role::Tool && self.tool_call_id.as_deref() == Some(call_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_assistant_turn_drops_empty_content() {
        let call = ToolCallRequest::new("call_1", "search", r#"{"query":"rust"}"#);
        let msg = Message::assistant_turn(Some(String::new()), vec![call]);

        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_none());
        assert!(msg.has_tool_calls());
    }

    #[test]
    fn test_tool_result_message() {
        let result = ToolResult::success("call_7", "search", "[]");
        let msg = Message::tool_result(&result);

        assert_eq!(msg.role, Role::Tool);
        assert!(msg.answers("call_7"));
        assert!(!msg.answers("call_8"));
        assert_eq!(msg.name.as_deref(), Some("search"));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
