//! Two personas sharing one Azure OpenAI model-router deployment, chained so
//! the second reads the first one's answer. The router picks a model per
//! request; the response reports which one answered.
//!
//! Run with: AZURE_ENDPOINT=... AZURE_OPENAI_API_KEY=... DEPLOYMENT_NAME=... \
//!           cargo run --example model_router

use sift::{Agent, AgentConfig, OpenAiProvider};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let endpoint = std::env::var("AZURE_ENDPOINT")?;
    let api_key = std::env::var("AZURE_OPENAI_API_KEY")?;
    let deployment = std::env::var("DEPLOYMENT_NAME")?;
    let api_version = std::env::var("API_VERSION").ok();

    let transport = Arc::new(OpenAiProvider::azure(
        &endpoint,
        &deployment,
        api_version.as_deref(),
        api_key,
    ));

    let personas = [
        "You are a senior engineer focused on cloud security posture management. \
         Summarize the main security risks in the report you are given.",
        "You are a security analyst focused on compliance and risk mitigation. \
         Propose how to find this issue in code.",
    ];
    let mut input = "A Kubernetes ServiceAccount is over-permissive and \
                   automountServiceAccountToken is enabled on a production pod."
        .to_string();

    for (i, persona) in personas.iter().enumerate() {
        let config = AgentConfig::new(deployment.clone(), *persona)
            .with_max_tokens(8192)
            .with_temperature(0.7)
            .with_top_p(0.95)
            .with_frequency_penalty(0.0)
            .with_presence_penalty(0.0)
            .with_tools_enabled(false);
        let agent = Agent::builder()
            .config(config)
            .transport(transport.clone())
            .build()?;

        let mut session = agent.create_session();
        let response = agent.process(&mut session, &input).await?;

        println!("Agent {} (model chosen by the router: {})", i + 1, response.model);
        println!("{}\n", response.text);
        input = response.text;
    }

    Ok(())
}
