//! Bounded tool-augmented chat against OpenAI-compatible endpoints.
//!
//! This crate re-exports the workspace crates so the demos and embedders need
//! a single dependency.

pub use sift_agent as agent;
pub use sift_core as core;
pub use sift_llm as llm;
pub use sift_tools as tools;

pub use sift_agent::{
    Agent, AgentBuilder, AgentConfig, AgentError, AgentEvent, AgentResponse, ChatLoop, LoopState,
    Session,
};
pub use sift_core::{Config, Context, Conversation, Message, Role, ToolDefinition, ToolParameter};
pub use sift_llm::{ChatTransport, OpenAiProvider, Pricing, TokenUsage};
pub use sift_tools::{Tool, ToolExecutor, ToolOutput, ToolRegistry};

pub mod prelude {
    pub use sift_agent::{Agent, AgentConfig, AgentError, AgentEvent, AgentResponse, Session};
    pub use sift_core::{
        Config, Context, Conversation, Message, Role, ToolCallRequest, ToolDefinition,
        ToolParameter, ToolResult,
    };
    pub use sift_llm::{ChatTransport, CompletionRequest, CompletionResponse, OpenAiProvider};
    pub use sift_tools::{Tool, ToolError, ToolOutput, ToolRegistry};
}
