use super::message::{Message, Role};
use crate::error::{Error, Result};
use crate::tool::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// Append-only, ordered message history owned by one run at a time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Message::user(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.text())
    }

    /// Tool calls requested by an assistant turn that have no tool message
    /// answering them yet.
    pub fn dangling_tool_calls(&self) -> Vec<&ToolCallRequest> {
        let mut dangling = Vec::new();
        for (idx, msg) in self.messages.iter().enumerate() {
            for call in &msg.tool_calls {
                let answered = self.messages[idx + 1..].iter().any(|m| m.answers(&call.id));
                if !answered {
                    dangling.push(call);
                }
            }
        }
        dangling
    }

    /// Checks the shape required before a run starts: a system message, the
    /// newest user message last, and no unanswered tool calls.
    pub fn validate_for_run(&self) -> Result<()> {
        if self.system_prompt().is_none() {
            return Err(Error::validation("conversation has no system message"));
        }
        match self.last() {
            Some(m) if m.role == Role::User => {}
            Some(m) => {
                return Err(Error::validation(format!(
                    "conversation must end with a user message, found {}",
                    m.role
                )))
            }
            None => return Err(Error::validation("conversation is empty")),
        }
        if let Some(call) = self.dangling_tool_calls().first() {
            return Err(Error::validation(format!(
                "tool call {} ({}) has no result",
                call.id, call.name
            )));
        }
        Ok(())
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
