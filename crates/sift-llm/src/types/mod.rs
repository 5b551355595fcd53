mod request;
mod response;
mod usage;

pub use request::{CompletionRequest, ToolChoice};
pub use response::{AssistantTurn, CompletionResponse, StopReason};
pub use usage::{Pricing, TokenUsage};
