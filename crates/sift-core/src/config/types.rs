use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub agent: AgentSection,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Groq,
    Azure,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Azure => "azure",
        }
    }

    pub fn default_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Openai => "OPENAI_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::Azure => "AZURE_OPENAI_API_KEY",
        }
    }
}

/// One named entry of `[llm.providers]`.
///
/// Credentials are given either literally (`api_key`) or by naming an
/// environment variable (`api_key_env`). Azure entries also need
/// `base_url` (the resource endpoint) and `deployment`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingConfig>,
}

impl ProviderConfig {
    pub fn new(provider_type: ProviderKind) -> Self {
        Self {
            provider_type,
            api_key: None,
            api_key_env: None,
            base_url: None,
            model: None,
            deployment: None,
            api_version: None,
            timeout_secs: None,
            pricing: None,
        }
    }

    pub fn key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_key_env())
    }
}

/// USD per million tokens.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub builtin_enabled: bool,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub disabled_tools: Vec<String>,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            builtin_enabled: true,
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            disabled_tools: vec![],
            search: SearchConfig::default(),
        }
    }
}

impl ToolsConfig {
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_tools.iter().any(|t| t == name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    #[default]
    Exa,
    Bing,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub backend: SearchBackendKind,
    #[serde(default)]
    pub exa: ExaSettings,
    #[serde(default)]
    pub bing: BingSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_exa_key_env")]
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    #[serde(default)]
    pub include_domains: Vec<String>,
    /// ISO dates bounding the published-date window, e.g. `2023-12-31`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_published_date: Option<String>,
    #[serde(default = "default_true")]
    pub use_autoprompt: bool,
}

impl Default for ExaSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_exa_key_env(),
            base_url: None,
            num_results: default_num_results(),
            include_domains: vec![],
            start_published_date: None,
            end_published_date: None,
            use_autoprompt: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_bing_key_env")]
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

impl Default for BingSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_bing_key_env(),
            endpoint: None,
            num_results: default_num_results(),
        }
    }
}

/// The `[agent]` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// `auto`, `none`, `required`, or the name of a tool to force.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(default = "default_true")]
    pub parallel_tool_calls: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model: None,
            temperature: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            tool_choice: None,
            parallel_tool_calls: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tool_timeout() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_num_results() -> u32 {
    5
}

fn default_exa_key_env() -> String {
    "EXA_API_KEY".to_string()
}

fn default_bing_key_env() -> String {
    "BING_SEARCH_SUBSCRIPTION_KEY".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
