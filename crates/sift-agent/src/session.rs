use crate::response::AgentResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift_core::{Conversation, SessionId};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub message_count: usize,
    pub tool_call_count: usize,
    pub iteration_count: usize,
}

/// A conversation that survives across turns of an interactive chat.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    system_prompt: String,
    conversation: Conversation,
    stats: SessionStats,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            conversation: Conversation::with_system(system_prompt.clone()),
            system_prompt,
            stats: SessionStats::default(),
        }
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.conversation.push_user(text);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.conversation.len(),
            ..self.stats.clone()
        }
    }

    pub fn record(&mut self, response: &AgentResponse) {
        self.stats.tool_call_count += response.tool_call_count();
        self.stats.iteration_count += response.iterations;
    }

    /// Drops everything but the system prompt.
    pub fn clear(&mut self) {
        self.conversation = Conversation::with_system(self.system_prompt.clone());
        self.stats = SessionStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{Message, Role};

    #[test]
    fn test_session_starts_with_system_prompt() {
        let session = Session::new("You are a helpful assistant.");
        assert_eq!(session.message_count(), 1);
        assert_eq!(
            session.conversation().system_prompt(),
            Some("You are a helpful assistant.")
        );
    }

    #[test]
    fn test_session_stats() {
        let mut session = Session::new("sys");
        session.push_user("Hello");
        session.conversation_mut().push(Message::assistant("Hi there!"));
        session.record(&AgentResponse::new("Hi there!", "m").with_iterations(1));

        let stats = session.stats();
        assert_eq!(stats.message_count, 3);
        assert_eq!(stats.iteration_count, 1);
        assert_eq!(stats.tool_call_count, 0);
    }

    #[test]
    fn test_session_clear_keeps_system() {
        let mut session = Session::new("sys");
        session.push_user("Hello");
        session.clear();

        assert_eq!(session.message_count(), 1);
        assert_eq!(session.conversation().messages()[0].role, Role::System);
        assert_eq!(session.stats().iteration_count, 0);
    }
}
