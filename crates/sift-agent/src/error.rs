use crate::response::ToolCallRecord;
use sift_core::error::Error as CoreError;
use sift_llm::{LlmError, TokenUsage};
use sift_tools::ToolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid conversation: {0}")]
    Core(#[from] CoreError),

    #[error("Iteration budget of {max_iterations} exhausted before a final answer")]
    IterationBudgetExceeded {
        max_iterations: usize,
        partial: Option<String>,
        usage: TokenUsage,
        tool_calls: Vec<ToolCallRecord>,
        estimated_cost: Option<f64>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::IterationBudgetExceeded { .. })
    }

    /// Assistant text produced alongside tool calls before the budget ran out.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            Self::IterationBudgetExceeded { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }

    /// Tokens spent by a run that ran out of iterations.
    pub fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::IterationBudgetExceeded { usage, .. } => Some(*usage),
            _ => None,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        match self {
            Self::IterationBudgetExceeded { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn estimated_cost(&self) -> Option<f64> {
        match self {
            Self::IterationBudgetExceeded { estimated_cost, .. } => *estimated_cost,
            _ => None,
        }
    }
}
