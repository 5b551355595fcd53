use anyhow::bail;
use clap::Subcommand;
use colored::Colorize;
use sift_core::Config;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Write a default configuration file
    Init {
        #[arg(default_value = "sift.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check the configuration and report the resolved provider
    Check,
}

pub fn run(config: &Config, source: Option<&Path>, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let rendered = if json { config.to_json()? } else { config.to_toml()? };
            println!("{}", rendered);
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save_to_file(&path)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
        ConfigAction::Check => {
            config.validate()?;
            let (name, provider) = config.provider(None)?;
            if let Some(source) = source {
                println!("config: {}", source.display());
            }
            println!(
                "provider: {} ({}), key from {}",
                name,
                provider.provider_type.as_str(),
                if provider.api_key.is_some() { "config" } else { provider.key_env() }
            );
            println!(
                "search: {} backend, {} tools disabled",
                match config.tools.search.backend {
                    sift_core::config::SearchBackendKind::Exa => "exa",
                    sift_core::config::SearchBackendKind::Bing => "bing",
                },
                config.tools.disabled_tools.len()
            );
            println!("max iterations: {}", config.agent.max_iterations);
            println!("{}", "ok".green());
        }
    }

    Ok(())
}
