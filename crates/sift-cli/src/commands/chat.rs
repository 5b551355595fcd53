use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sift_agent::{AgentError, AgentEvent};
use sift_core::{Config, Context};
use tokio::sync::mpsc;

use super::{create_agent, AgentOptions};

pub async fn run(config: &Config, options: AgentOptions<'_>) -> anyhow::Result<()> {
    let agent = create_agent(config, options)?;
    let mut session = agent.create_session();

    println!("{} {}", "sift".green().bold(), agent.model().dimmed());
    println!(
        "Type {} to exit, {} to start over\n",
        "quit".yellow(),
        "/clear".yellow()
    );

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(&format!("{} ", "You:".cyan().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line {
                    "quit" | "exit" => {
                        println!("{}", "Goodbye!".green());
                        break;
                    }
                    "/clear" => {
                        session.clear();
                        println!("{}\n", "Conversation cleared.".dimmed());
                        continue;
                    }
                    "/stats" => {
                        let stats = session.stats();
                        println!(
                            "{} messages, {} model calls, {} tool calls\n",
                            stats.message_count, stats.iteration_count, stats.tool_call_count
                        );
                        continue;
                    }
                    _ => {}
                }

                rl.add_history_entry(line)?;

                let ctx = Context::new().with_session(*session.id());
                let cancel = ctx.cancellation_token();
                let interrupt = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                });

                let (tx, mut rx) = mpsc::channel(64);
                let printer = async move {
                    while let Some(event) = rx.recv().await {
                        print_event(&event);
                    }
                };
                let turn = async {
                    let result = agent
                        .process_with_context(&ctx, &mut session, line, Some(&tx))
                        .await;
                    drop(tx);
                    result
                };
                let (result, _) = tokio::join!(turn, printer);
                interrupt.abort();

                match result {
                    Ok(response) => {
                        println!("{} {}\n", "Assistant:".magenta().bold(), response.text);
                    }
                    Err(e @ AgentError::IterationBudgetExceeded { .. }) => {
                        if let Some(partial) = e.partial_text() {
                            println!("{} {}", "Assistant:".magenta().bold(), partial);
                        }
                        println!("{} {}\n", "Error:".red().bold(), e);
                    }
                    Err(AgentError::Cancelled) => {
                        println!("{}\n", "Interrupted.".yellow());
                    }
                    Err(e) => {
                        println!("{} {}\n", "Error:".red().bold(), e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".yellow());
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".green());
                break;
            }
            Err(err) => {
                println!("{} {:?}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::ToolCallStarted {
            name, arguments, ..
        } => {
            println!("  {} {} {}", "→".blue(), name.bold(), arguments.dimmed());
        }
        AgentEvent::ToolCallFinished {
            name,
            output,
            is_error,
            duration_ms,
            ..
        } => {
            if *is_error {
                println!("  {} {} {}", "✗".red(), name.bold(), output.red());
            } else {
                println!(
                    "  {} {} {}",
                    "✓".green(),
                    name.bold(),
                    format!("({} ms, {} bytes)", duration_ms, output.len()).dimmed()
                );
            }
        }
        _ => {}
    }
}
