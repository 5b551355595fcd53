//! Search-augmented chat
//!
//! Run with: GROQ_API_KEY=... EXA_API_KEY=... cargo run --example search_chat

use sift::tools::{ExaConfig, ExaSearch, SearchTool};
use sift::{Agent, AgentEvent, OpenAiProvider, ToolRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let groq_key = std::env::var("GROQ_API_KEY")?;
    let exa_key = std::env::var("EXA_API_KEY")?;

    let search = ExaSearch::new(
        ExaConfig::new(exa_key)
            .with_num_results(5)
            .with_include_domains(vec!["arxiv.org".into()]),
    );
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchTool::new(search)))?;

    let agent = Agent::builder()
        .system_prompt("You are a helpful assistant. Use the search tool for recent facts.")
        .transport(Arc::new(OpenAiProvider::groq(groq_key)))
        .tool_registry(Arc::new(registry))
        .max_iterations(5)
        .build()?;

    let mut session = agent.create_session();

    // Print tool steps while the loop runs
    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AgentEvent::ToolCallStarted { name, arguments, .. } => {
                    println!("-> {} {}", name, arguments);
                }
                AgentEvent::ToolCallFinished { name, is_error, duration_ms, .. } => {
                    println!("<- {} ({} ms, error: {})", name, duration_ms, is_error);
                }
                _ => {}
            }
        }
    });

    let response = agent
        .process_with_events(&mut session, "What is the latest paper on retrieval-augmented generation?", tx)
        .await?;
    printer.await?;

    println!("\nAssistant: {}", response.text);
    println!(
        "[{} model calls, {} tokens, served by {}]",
        response.iterations,
        response.usage.total(),
        response.model
    );

    Ok(())
}
