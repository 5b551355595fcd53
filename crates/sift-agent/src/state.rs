use serde::{Deserialize, Serialize};

/// Where a run of the chat loop currently is.
///
/// ```text
/// AwaitingModel --no tool calls--> Done
/// AwaitingModel --tool calls-----> ExecutingTools --results appended--> AwaitingModel
/// AwaitingModel --budget / transport error / cancel--> Aborted
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    AwaitingModel,
    ExecutingTools,
    Done,
    Aborted,
}

impl LoopState {
    pub fn initial() -> Self {
        LoopState::AwaitingModel
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done | LoopState::Aborted)
    }

    pub fn can_transition_to(&self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (AwaitingModel, Done)
                | (AwaitingModel, ExecutingTools)
                | (AwaitingModel, Aborted)
                | (ExecutingTools, AwaitingModel)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::AwaitingModel => "awaiting_model",
            LoopState::ExecutingTools => "executing_tools",
            LoopState::Done => "done",
            LoopState::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        let s = LoopState::initial();
        assert_eq!(s, LoopState::AwaitingModel);
        assert!(s.can_transition_to(LoopState::Done));
        assert!(s.can_transition_to(LoopState::ExecutingTools));
        assert!(s.can_transition_to(LoopState::Aborted));
        assert!(LoopState::ExecutingTools.can_transition_to(LoopState::AwaitingModel));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [LoopState::Done, LoopState::Aborted] {
            assert!(terminal.is_terminal());
            for next in [
                LoopState::AwaitingModel,
                LoopState::ExecutingTools,
                LoopState::Done,
                LoopState::Aborted,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_tools_always_return_to_model() {
        assert!(!LoopState::ExecutingTools.can_transition_to(LoopState::Done));
        assert!(!LoopState::ExecutingTools.can_transition_to(LoopState::Aborted));
    }
}
