use serde::{Deserialize, Serialize};
use sift_llm::ToolChoice;
use sift_core::config::{
    Config, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TOOL_TIMEOUT_SECS,
};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Empty means the transport's default model.
    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub top_p: Option<f32>,

    #[serde(default)]
    pub frequency_penalty: Option<f32>,

    #[serde(default)]
    pub presence_penalty: Option<f32>,

    /// Sent only when tool schemas are attached to the request.
    #[serde(default)]
    pub tool_choice: ToolChoice,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub parallel_tool_calls: bool,

    #[serde(default = "default_true")]
    pub tools_enabled: bool,
}

fn default_name() -> String {
    "assistant".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_tokens() -> Option<u32> {
    Some(DEFAULT_MAX_TOKENS)
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_tool_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            system_prompt: default_system_prompt(),
            model: String::new(),
            temperature: None,
            max_tokens: default_max_tokens(),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            tool_choice: ToolChoice::Auto,
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout_secs(),
            parallel_tool_calls: true,
            tools_enabled: true,
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    /// Reads the `[agent]` table and the tool timeout from a loaded config.
    pub fn from_config(config: &Config) -> Self {
        let agent = &config.agent;
        Self {
            system_prompt: agent.system_prompt.clone(),
            model: agent.model.clone().unwrap_or_default(),
            temperature: agent.temperature,
            max_tokens: Some(agent.max_tokens),
            top_p: agent.top_p,
            frequency_penalty: agent.frequency_penalty,
            presence_penalty: agent.presence_penalty,
            tool_choice: agent
                .tool_choice
                .as_deref()
                .map(ToolChoice::from_name)
                .unwrap_or_default(),
            max_iterations: agent.max_iterations,
            tool_timeout_secs: config.tools.timeout_secs,
            parallel_tool_calls: agent.parallel_tool_calls,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    pub fn with_tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
