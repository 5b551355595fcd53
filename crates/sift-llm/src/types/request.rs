use sift_core::{Conversation, Message, ToolDefinition};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }

    pub fn from_conversation(model: impl Into<String>, conversation: &Conversation) -> Self {
        Self::new(model, conversation.messages().to_vec())
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
    Tool { name: String },
}

impl ToolChoice {
    /// `auto`, `none` and `required` map to their variants; any other value
    /// forces the tool with that name.
    pub fn from_name(value: &str) -> Self {
        match value.trim() {
            "" | "auto" => ToolChoice::Auto,
            "none" => ToolChoice::None,
            "required" => ToolChoice::Required,
            name => ToolChoice::Tool { name: name.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_choice_from_name() {
        assert_eq!(ToolChoice::from_name("auto"), ToolChoice::Auto);
        assert_eq!(ToolChoice::from_name(""), ToolChoice::Auto);
        assert_eq!(ToolChoice::from_name("none"), ToolChoice::None);
        assert_eq!(ToolChoice::from_name("required"), ToolChoice::Required);
        assert_eq!(
            ToolChoice::from_name("search"),
            ToolChoice::Tool { name: "search".into() }
        );
    }

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("llama3-8b-8192", vec![Message::user("Hello")])
            .with_max_tokens(4096)
            .with_temperature(0.7)
            .with_presence_penalty(0.0);

        assert_eq!(req.model, "llama3-8b-8192");
        assert_eq!(req.max_tokens, Some(4096));
        assert_eq!(req.presence_penalty, Some(0.0));
        assert!(req.tools.is_empty());
    }

    #[test]
    fn test_from_conversation_copies_history() {
        let mut conv = Conversation::with_system("sys");
        conv.push_user("Hi");

        let req = CompletionRequest::from_conversation("m", &conv);
        assert_eq!(req.messages.len(), 2);
    }

    #[test]
    fn test_tool_choice_serialization() {
        let auto = serde_json::to_string(&ToolChoice::Auto).unwrap();
        assert_eq!(auto, "\"auto\"");

        let tool = serde_json::to_string(&ToolChoice::Tool {
            name: "search".into(),
        })
        .unwrap();
        assert!(tool.contains("search"));
    }
}
