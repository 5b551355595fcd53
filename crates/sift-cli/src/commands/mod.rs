pub mod chat;
pub mod config;
pub mod run;

use anyhow::Context as _;
use sift_agent::{Agent, AgentConfig};
use sift_core::config::{resolve_secret, ProviderKind};
use sift_core::Config;
use sift_llm::{OpenAiProvider, Pricing};
use sift_tools::create_default_registry;
use std::sync::Arc;
use std::time::Duration;

/// Command-line overrides applied on top of the loaded config.
#[derive(Clone, Copy, Default)]
pub struct AgentOptions<'a> {
    pub provider: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub model: Option<&'a str>,
    pub system_prompt: Option<&'a str>,
    pub max_iterations: Option<usize>,
}

pub fn create_transport(
    config: &Config,
    options: &AgentOptions<'_>,
) -> anyhow::Result<(OpenAiProvider, Option<Pricing>)> {
    let (name, entry) = config.provider(options.provider)?;
    let api_key = resolve_secret(options.api_key.or(entry.api_key.as_deref()), entry.key_env())
        .with_context(|| format!("no credential for provider '{}'", name))?;

    let mut transport = match entry.provider_type {
        ProviderKind::Groq => OpenAiProvider::groq(api_key),
        ProviderKind::Openai => match entry.base_url.as_deref() {
            Some(base_url) => OpenAiProvider::with_base_url(api_key, base_url),
            None => OpenAiProvider::new(api_key),
        },
        ProviderKind::Azure => {
            let endpoint = entry
                .base_url
                .as_deref()
                .with_context(|| format!("provider '{}' needs base_url", name))?;
            let deployment = entry
                .deployment
                .as_deref()
                .with_context(|| format!("provider '{}' needs deployment", name))?;
            OpenAiProvider::azure(endpoint, deployment, entry.api_version.as_deref(), api_key)
        }
    }
    .with_name(name);

    if let Some(model) = &entry.model {
        transport = transport.with_model(model);
    }
    if let Some(secs) = entry.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    Ok((transport, entry.pricing.map(Pricing::from)))
}

pub fn create_agent(config: &Config, options: AgentOptions<'_>) -> anyhow::Result<Agent> {
    let (transport, pricing) = create_transport(config, &options)?;
    let registry = create_default_registry(&config.tools)
        .context("failed to set up the search tool (use --no-tools to chat without it)")?;

    let mut agent_config = AgentConfig::from_config(config);
    if let Some(prompt) = options.system_prompt {
        agent_config.system_prompt = prompt.to_string();
    }
    if let Some(model) = options.model {
        agent_config.model = model.to_string();
    }
    if let Some(max) = options.max_iterations {
        agent_config.max_iterations = max;
    }

    let mut builder = Agent::builder()
        .config(agent_config)
        .transport(Arc::new(transport))
        .tool_registry(Arc::new(registry));
    if let Some(pricing) = pricing {
        builder = builder.pricing(pricing);
    }

    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create agent: {}", e))
}
