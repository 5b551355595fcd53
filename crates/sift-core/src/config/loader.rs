use super::types::{Config, LogLevel, ProviderConfig, ProviderKind};
use crate::error::{Error, Result};
use std::path::Path;

const DEFAULT_PATHS: [&str; 3] = [
    "./sift.toml",
    "~/.sift/config.toml",
    "~/.config/sift/config.toml",
];

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Json)
    }

    pub fn load_default() -> Result<Self> {
        Self::load_first(&DEFAULT_PATHS)
    }

    /// Loads the first existing file among `paths`, else the defaults.
    fn load_first(paths: &[&str]) -> Result<Self> {
        for path in paths {
            let expanded = shellexpand::tilde(path);
            let path = Path::new(expanded.as_ref());
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load_from_file(path);
            }
        }

        Ok(Config::default())
    }

    pub fn merge_env(mut self) -> Self {
        if let Ok(level) = std::env::var("SIFT_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&level) {
                self.general.log_level = level;
            }
        }

        if let Ok(provider) = std::env::var("SIFT_DEFAULT_PROVIDER") {
            self.llm.default_provider = Some(provider);
        }

        if let Ok(max) = std::env::var("SIFT_MAX_ITERATIONS") {
            match max.trim().parse::<usize>() {
                Ok(n) => self.agent.max_iterations = n,
                Err(_) => tracing::warn!(value = %max, "ignoring invalid SIFT_MAX_ITERATIONS"),
            }
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent.max_iterations == 0 {
            return Err(Error::invalid_input(
                "agent.max_iterations",
                "must be at least 1",
            ));
        }

        if let Some(name) = &self.llm.default_provider {
            if !self.llm.providers.contains_key(name) && ProviderKind::preset(name).is_none() {
                return Err(Error::not_found("provider", name.clone()));
            }
        }

        for (name, provider) in &self.llm.providers {
            if provider.provider_type == ProviderKind::Azure
                && (provider.base_url.is_none() || provider.deployment.is_none())
            {
                return Err(Error::invalid_input(
                    format!("llm.providers.{}", name),
                    "azure providers need base_url and deployment",
                ));
            }
        }

        Ok(())
    }

    /// The provider entry to use: the named one, else `llm.default_provider`,
    /// else `groq`. Names without a table entry fall back to the built-in
    /// preset of the same name.
    pub fn provider(&self, name: Option<&str>) -> Result<(String, ProviderConfig)> {
        let name = name
            .map(str::to_string)
            .or_else(|| self.llm.default_provider.clone())
            .unwrap_or_else(|| "groq".to_string());

        if let Some(provider) = self.llm.providers.get(&name) {
            return Ok((name, provider.clone()));
        }

        match ProviderKind::preset(&name) {
            Some(kind) => Ok((name, ProviderConfig::new(kind))),
            None => Err(Error::not_found("provider", name)),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

impl ProviderKind {
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(ProviderKind::Openai),
            "groq" => Some(ProviderKind::Groq),
            "azure" => Some(ProviderKind::Azure),
            _ => None,
        }
    }
}

/// Reads a credential given literally or through an environment variable.
pub fn resolve_secret(literal: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(value) = literal.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }

    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::missing_config(env_var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::SearchBackendKind;
    use std::io::Write;
    use std::sync::Mutex;

    // merge_env reads process-wide variables; tests touching them hold this.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 3] = ["SIFT_LOG_LEVEL", "SIFT_DEFAULT_PROVIDER", "SIFT_MAX_ITERATIONS"];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let out = f();
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        out
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, LogLevel::Info);
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.agent.system_prompt, "You are a helpful assistant.");
        assert_eq!(config.tools.timeout_secs, 60);
        assert_eq!(config.tools.search.backend, SearchBackendKind::Exa);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [general]
            log_level = "debug"

            [llm]
            default_provider = "work"

            [llm.providers.work]
            provider_type = "azure"
            base_url = "https://example.openai.azure.com"
            deployment = "gpt-4o"
            api_key_env = "WORK_KEY"

            [llm.providers.work.pricing]
            input_per_million = 5.0
            output_per_million = 15.0

            [tools.search]
            backend = "bing"

            [agent]
            max_iterations = 3
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.general.log_level, LogLevel::Debug);
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.tools.search.backend, SearchBackendKind::Bing);
        assert_eq!(config.tools.search.exa.num_results, 5);

        let (name, provider) = config.provider(None).unwrap();
        assert_eq!(name, "work");
        assert_eq!(provider.provider_type, ProviderKind::Azure);
        assert_eq!(provider.key_env(), "WORK_KEY");
        assert_eq!(provider.pricing.unwrap().output_per_million, 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_falls_back_to_preset() {
        let config = Config::default();

        let (name, provider) = config.provider(None).unwrap();
        assert_eq!(name, "groq");
        assert_eq!(provider.key_env(), "GROQ_API_KEY");

        let (_, provider) = config.provider(Some("openai")).unwrap();
        assert_eq!(provider.provider_type, ProviderKind::Openai);

        assert!(matches!(
            config.provider(Some("nope")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let mut config = Config::default();
        config.agent.max_iterations = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_incomplete_azure() {
        let toml = r#"
            [llm.providers.az]
            provider_type = "azure"
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\nsystem_prompt = \"Be terse.\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.agent.system_prompt, "Be terse.");
        assert_eq!(config.agent.max_tokens, 4096);
    }

    #[test]
    fn test_toml_roundtrip_keeps_providers() {
        let mut config = Config::default();
        config
            .llm
            .providers
            .insert("groq".into(), ProviderConfig::new(ProviderKind::Groq));

        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert!(parsed.llm.providers.contains_key("groq"));
    }

    #[test]
    fn test_resolve_secret_prefers_literal() {
        let value = resolve_secret(Some("literal"), "SIFT_TEST_UNSET_VARIABLE").unwrap();
        assert_eq!(value, "literal");

        let err = resolve_secret(None, "SIFT_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, Error::MissingConfig(_)));
    }

    #[test]
    fn test_merge_env_without_overrides_keeps_config() {
        let config = with_env(&[], || Config::default().merge_env());
        assert_eq!(config.general.log_level, LogLevel::Info);
        assert_eq!(config.llm.default_provider, None);
        assert_eq!(config.agent.max_iterations, 5);
    }

    #[test]
    fn test_merge_env_log_level() {
        let config = with_env(&[("SIFT_LOG_LEVEL", "debug")], || Config::default().merge_env());
        assert_eq!(config.general.log_level, LogLevel::Debug);

        let config = with_env(&[("SIFT_LOG_LEVEL", "chatty")], || Config::default().merge_env());
        assert_eq!(config.general.log_level, LogLevel::Info);
    }

    #[test]
    fn test_merge_env_default_provider() {
        let config =
            with_env(&[("SIFT_DEFAULT_PROVIDER", "openai")], || Config::default().merge_env());
        assert_eq!(config.llm.default_provider.as_deref(), Some("openai"));
        assert_eq!(config.provider(None).unwrap().0, "openai");
    }

    #[test]
    fn test_merge_env_max_iterations() {
        let config = with_env(&[("SIFT_MAX_ITERATIONS", " 8 ")], || Config::default().merge_env());
        assert_eq!(config.agent.max_iterations, 8);
    }

    #[test]
    fn test_merge_env_ignores_invalid_max_iterations() {
        let mut base = Config::default();
        base.agent.max_iterations = 3;

        let config = with_env(&[("SIFT_MAX_ITERATIONS", "lots")], || base.merge_env());
        assert_eq!(config.agent.max_iterations, 3);
    }

    #[test]
    fn test_load_first_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sift.toml");

        let config = Config::load_first(&[missing.to_str().unwrap()]).unwrap();
        assert_eq!(config.agent.max_iterations, 5);
        assert!(config.llm.providers.is_empty());
    }

    #[test]
    fn test_load_first_takes_first_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sift.toml");
        let second = dir.path().join("second.toml");
        let third = dir.path().join("third.toml");
        std::fs::write(&second, "[agent]\nmax_iterations = 2\n").unwrap();
        std::fs::write(&third, "[agent]\nmax_iterations = 9\n").unwrap();

        let config = Config::load_first(&[
            missing.to_str().unwrap(),
            second.to_str().unwrap(),
            third.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(config.agent.max_iterations, 2);
    }

    #[test]
    fn test_load_first_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("sift.toml");
        std::fs::write(&broken, "[agent\n").unwrap();

        assert!(Config::load_first(&[broken.to_str().unwrap()]).is_err());
    }
}
