use clap::{Parser, Subcommand};
use sift_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "sift")]
#[command(author, version, about = "Tool-augmented chat with search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./sift.toml, ~/.sift/config.toml, ~/.config/sift/config.toml)
    #[arg(short, long, global = true, env = "SIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Provider entry or preset: groq, openai, azure
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// API key for the provider, overriding the configured one
    #[arg(short, long, global = true)]
    api_key: Option<String>,

    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Chat without the built-in search tool
    #[arg(long, global = true)]
    no_tools: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// System prompt for the session
        #[arg(short, long)]
        system: Option<String>,
    },
    /// Answer a single prompt and exit
    Run {
        /// The prompt to send; read from stdin when omitted
        message: Option<String>,
        /// System prompt for the run
        #[arg(short, long)]
        system: Option<String>,
        /// Maximum number of model calls
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_default()?,
    };
    Ok(config.merge_env())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    init_tracing(cli.verbose, &config);

    if cli.no_tools {
        config.tools.builtin_enabled = false;
    }

    let options = commands::AgentOptions {
        provider: cli.provider.as_deref(),
        api_key: cli.api_key.as_deref(),
        model: cli.model.as_deref(),
        system_prompt: None,
        max_iterations: None,
    };

    match cli.command {
        Commands::Chat { system } => {
            let options = commands::AgentOptions {
                system_prompt: system.as_deref(),
                ..options
            };
            commands::chat::run(&config, options).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            message,
            system,
            max_iterations,
            json,
        } => {
            let options = commands::AgentOptions {
                system_prompt: system.as_deref(),
                max_iterations,
                ..options
            };
            commands::run::run(&config, options, message, json).await
        }
        Commands::Config { action } => {
            commands::config::run(&config, cli.config.as_deref(), action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
