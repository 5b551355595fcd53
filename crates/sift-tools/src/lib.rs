pub mod builtin;
pub mod error;
pub mod executor;
pub mod registry;
pub mod traits;

pub use builtin::{create_default_registry, register_all};
pub use error::{Result, ToolError};
pub use executor::{CallOutcome, ToolExecutor, DEFAULT_TOOL_TIMEOUT};
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolOutput};

#[cfg(feature = "search")]
pub use builtin::{
    create_search_tool, BingConfig, BingSearch, ExaConfig, ExaSearch, SearchBackend, SearchHit,
    SearchTool,
};

pub mod prelude {
    pub use crate::error::{Result, ToolError};
    pub use crate::executor::ToolExecutor;
    pub use crate::registry::ToolRegistry;
    pub use crate::traits::{Tool, ToolOutput};

    #[cfg(feature = "search")]
    pub use crate::builtin::{SearchBackend, SearchHit, SearchTool};
}
