pub mod error;
pub mod providers;
pub mod traits;
pub mod types;

pub use error::{LlmError, Result};
pub use traits::ChatTransport;
pub use types::{
    AssistantTurn, CompletionRequest, CompletionResponse, Pricing, StopReason, TokenUsage,
    ToolChoice,
};

#[cfg(feature = "openai")]
pub use providers::{AuthScheme, OpenAiProvider};

pub mod prelude {
    pub use crate::error::{LlmError, Result};
    pub use crate::traits::ChatTransport;
    pub use crate::types::{
        AssistantTurn, CompletionRequest, CompletionResponse, Pricing, TokenUsage, ToolChoice,
    };

    #[cfg(feature = "openai")]
    pub use crate::providers::OpenAiProvider;
}
