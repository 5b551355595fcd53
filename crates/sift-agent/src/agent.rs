use crate::chat_loop::ChatLoop;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::event::AgentEvent;
use crate::response::AgentResponse;
use crate::session::Session;
use sift_core::{Context, Conversation};
use sift_llm::{ChatTransport, Pricing};
use sift_tools::{ToolExecutor, ToolRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct Agent {
    chat_loop: ChatLoop,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn config(&self) -> &AgentConfig {
        self.chat_loop.config()
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        self.chat_loop.transport()
    }

    pub fn tools(&self) -> &Arc<ToolExecutor> {
        self.chat_loop.tools()
    }

    pub fn model(&self) -> &str {
        self.chat_loop.model()
    }

    pub fn create_session(&self) -> Session {
        Session::new(&self.config().system_prompt)
    }

    /// Runs the loop over a caller-owned conversation.
    pub async fn run(&self, ctx: &Context, conversation: &mut Conversation) -> Result<AgentResponse> {
        self.chat_loop.run(ctx, conversation).await
    }

    pub async fn chat(&self, session: &mut Session, message: &str) -> Result<String> {
        let response = self.process(session, message).await?;
        Ok(response.text)
    }

    pub async fn process(&self, session: &mut Session, message: &str) -> Result<AgentResponse> {
        let ctx = Context::new().with_session(*session.id());
        self.process_with_context(&ctx, session, message, None).await
    }

    pub async fn process_with_events(
        &self,
        session: &mut Session,
        message: &str,
        events: mpsc::Sender<AgentEvent>,
    ) -> Result<AgentResponse> {
        let ctx = Context::new().with_session(*session.id());
        self.process_with_context(&ctx, session, message, Some(&events))
            .await
    }

    pub async fn process_with_context(
        &self,
        ctx: &Context,
        session: &mut Session,
        message: &str,
        events: Option<&mpsc::Sender<AgentEvent>>,
    ) -> Result<AgentResponse> {
        session.push_user(message);
        let response = self
            .chat_loop
            .run_with_events(ctx, session.conversation_mut(), events)
            .await?;
        session.record(&response);
        Ok(response)
    }
}

#[derive(Default)]
pub struct AgentBuilder {
    config: Option<AgentConfig>,
    name: Option<String>,
    system_prompt: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_iterations: Option<usize>,
    parallel_tool_calls: Option<bool>,
    tools_enabled: Option<bool>,
    transport: Option<Arc<dyn ChatTransport>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    pricing: Option<Pricing>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = Some(parallel);
        self
    }

    pub fn tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = Some(enabled);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let transport = self
            .transport
            .ok_or_else(|| AgentError::config("chat transport is required"))?;

        let mut config = self.config.unwrap_or_default();

        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(prompt) = self.system_prompt {
            config.system_prompt = prompt;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(temp) = self.temperature {
            config.temperature = Some(temp);
        }
        if let Some(max) = self.max_tokens {
            config.max_tokens = Some(max);
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if let Some(parallel) = self.parallel_tool_calls {
            config.parallel_tool_calls = parallel;
        }
        if let Some(enabled) = self.tools_enabled {
            config.tools_enabled = enabled;
        }

        if config.max_iterations == 0 {
            return Err(AgentError::config("max_iterations must be at least 1"));
        }
        if config.model.is_empty() {
            config.model = transport.default_model().to_string();
        }

        let registry = self
            .tool_registry
            .unwrap_or_else(|| Arc::new(ToolRegistry::new()));
        let tools = Arc::new(ToolExecutor::new(registry).with_timeout(config.tool_timeout()));

        Ok(Agent {
            chat_loop: ChatLoop::new(config, transport, tools).with_pricing(self.pricing),
        })
    }
}
