mod call;
mod schema;

pub use call::{error_payload, ArgumentDecodeError, ToolCallRequest, ToolResult};
pub use schema::{JsonSchemaType, ToolDefinition, ToolParameter};
