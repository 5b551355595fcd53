pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod tool;
pub mod types;

pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
pub use message::{Conversation, Message, Role};
pub use tool::{error_payload, ArgumentDecodeError, ToolCallRequest, ToolDefinition, ToolParameter, ToolResult};
pub use types::{Id, MessageId, RequestId, SessionId};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::Context;
    pub use crate::error::{Error, Result};
    pub use crate::message::{Conversation, Message, Role};
    pub use crate::tool::{
        error_payload, JsonSchemaType, ToolCallRequest, ToolDefinition, ToolParameter, ToolResult,
    };
    pub use crate::types::{Id, MessageId, RequestId, SessionId};
}
