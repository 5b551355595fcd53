use crate::state::LoopState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    StateChanged {
        from: LoopState,
        to: LoopState,
    },

    ModelRequest {
        iteration: usize,
    },

    ToolCallStarted {
        id: String,
        name: String,
        arguments: String,
    },

    ToolCallFinished {
        id: String,
        name: String,
        output: String,
        is_error: bool,
        duration_ms: u64,
    },

    FinalAnswer {
        text: String,
    },

    Aborted {
        reason: String,
    },
}

impl AgentEvent {
    pub fn state_changed(from: LoopState, to: LoopState) -> Self {
        Self::StateChanged { from, to }
    }

    pub fn tool_call_started(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::ToolCallStarted {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::FinalAnswer { .. } | Self::Aborted { .. })
    }
}
