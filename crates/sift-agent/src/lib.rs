pub mod agent;
pub mod chat_loop;
pub mod config;
pub mod error;
pub mod event;
pub mod response;
pub mod session;
pub mod state;

pub use agent::{Agent, AgentBuilder};
pub use chat_loop::ChatLoop;
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use event::AgentEvent;
pub use response::{AgentResponse, ToolCallRecord};
pub use session::{Session, SessionStats};
pub use state::LoopState;

pub mod prelude {
    pub use crate::agent::{Agent, AgentBuilder};
    pub use crate::config::AgentConfig;
    pub use crate::error::{AgentError, Result};
    pub use crate::event::AgentEvent;
    pub use crate::response::{AgentResponse, ToolCallRecord};
    pub use crate::session::{Session, SessionStats};
    pub use crate::state::LoopState;
}
