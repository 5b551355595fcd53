use anyhow::bail;
use colored::Colorize;
use sift_agent::{AgentError, AgentResponse};
use sift_core::Config;
use std::io::Read;
use std::process::ExitCode;

use super::{create_agent, AgentOptions};

const EXIT_FAILURE: u8 = 1;
const EXIT_BUDGET_EXCEEDED: u8 = 2;

pub async fn run(
    config: &Config,
    options: AgentOptions<'_>,
    message: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let message = match message {
        Some(message) => message,
        None => read_stdin()?,
    };

    let agent = create_agent(config, options)?;
    let mut session = agent.create_session();

    match agent.process(&mut session, &message).await {
        Ok(response) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.text);
                print_summary(&response);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ AgentError::IterationBudgetExceeded { .. }) => {
            if let Some(partial) = e.partial_text() {
                println!("{}", partial);
            }
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!("{}", budget_summary(&e).dimmed());
            Ok(ExitCode::from(EXIT_BUDGET_EXCEEDED))
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        bail!("no prompt given and stdin is empty");
    }
    Ok(input.to_string())
}

fn print_summary(response: &AgentResponse) {
    let summary = format!(
        "{} · {} model calls · {} tool calls · {} tokens{}",
        response.model,
        response.iterations,
        response.tool_call_count(),
        response.usage.total(),
        cost_suffix(response.estimated_cost)
    );
    eprintln!("{}", summary.dimmed());
}

fn budget_summary(err: &AgentError) -> String {
    let failed = err.tool_calls().iter().filter(|r| r.is_error).count();
    format!(
        "{} tool calls ({} failed) · {} tokens{}",
        err.tool_calls().len(),
        failed,
        err.usage().unwrap_or_default().total(),
        cost_suffix(err.estimated_cost())
    )
}

fn cost_suffix(cost: Option<f64>) -> String {
    cost.map(|c| format!(" · ${:.6}", c)).unwrap_or_default()
}
