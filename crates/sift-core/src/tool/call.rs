use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArgumentDecodeError {
    #[error("arguments for '{tool}' are not valid JSON: {source}")]
    Malformed {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("arguments for '{tool}' must be a JSON object, got {found}")]
    NotAnObject { tool: String, found: &'static str },
}

/// A tool invocation requested by the model. `arguments` is the raw text the
/// model produced; it is only trusted after [`ToolCallRequest::decode_arguments`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn decode_arguments(&self) -> Result<Map<String, Value>, ArgumentDecodeError> {
        // no-argument functions arrive as "" from some providers
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value =
            serde_json::from_str(&self.arguments).map_err(|source| ArgumentDecodeError::Malformed {
                tool: self.name.clone(),
                source,
            })?;

        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(ArgumentDecodeError::NotAnObject {
                tool: self.name.clone(),
                found: json_kind(&other),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serialized outcome of one tool call, correlated to its request by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        message: impl AsRef<str>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: error_payload(message),
            is_error: true,
        }
    }

    /// The `error` message if the content is an error payload.
    pub fn error_message(&self) -> Option<String> {
        let value: Value = serde_json::from_str(&self.content).ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }
}

/// Renders `{"error": <message>}`. The message is never empty.
pub fn error_payload(message: impl AsRef<str>) -> String {
    let message = message.as_ref().trim();
    let message = if message.is_empty() {
        "unknown error"
    } else {
        message
    };
    json!({ "error": message }).to_string()
}
