#[cfg(feature = "search")]
pub mod search;

#[cfg(feature = "search")]
pub use search::{
    BingConfig, BingSearch, ExaConfig, ExaSearch, SearchBackend, SearchHit, SearchTool,
    SEARCH_TOOL_NAME,
};

use crate::error::Result;
use crate::registry::ToolRegistry;
use sift_core::config::ToolsConfig;

/// Builds the `search` tool for the configured backend, reading its
/// credential from the settings or the named environment variable.
#[cfg(feature = "search")]
pub fn create_search_tool(config: &ToolsConfig) -> Result<std::sync::Arc<dyn crate::Tool>> {
    use sift_core::config::{resolve_secret, SearchBackendKind};
    use std::sync::Arc;

    let search = &config.search;
    let tool: Arc<dyn crate::Tool> = match search.backend {
        SearchBackendKind::Exa => {
            let key = resolve_secret(search.exa.api_key.as_deref(), &search.exa.api_key_env)?;
            Arc::new(SearchTool::new(ExaSearch::new(ExaConfig::from_settings(
                key,
                &search.exa,
            ))))
        }
        SearchBackendKind::Bing => {
            let key = resolve_secret(search.bing.api_key.as_deref(), &search.bing.api_key_env)?;
            Arc::new(SearchTool::new(BingSearch::new(BingConfig::from_settings(
                key,
                &search.bing,
            ))))
        }
    };

    Ok(tool)
}

pub fn register_all(registry: &mut ToolRegistry, config: &ToolsConfig) -> Result<()> {
    if !config.builtin_enabled {
        return Ok(());
    }

    #[cfg(feature = "search")]
    if !config.is_disabled(SEARCH_TOOL_NAME) {
        registry.register(create_search_tool(config)?)?;
    }

    Ok(())
}

pub fn create_default_registry(config: &ToolsConfig) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry, config)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use sift_core::config::SearchBackendKind;

    #[test]
    fn test_disabled_builtins_make_empty_registry() {
        let config = ToolsConfig {
            builtin_enabled: false,
            ..ToolsConfig::default()
        };
        let registry = create_default_registry(&config).unwrap();
        assert!(registry.is_empty());
    }

    #[cfg(feature = "search")]
    #[test]
    fn test_search_registered_with_literal_key() {
        let mut config = ToolsConfig::default();
        config.search.backend = SearchBackendKind::Bing;
        config.search.bing.api_key = Some("literal-key".into());

        let registry = create_default_registry(&config).unwrap();
        assert!(registry.contains("search"));
    }

    #[cfg(feature = "search")]
    #[test]
    fn test_search_disabled_by_name() {
        let mut config = ToolsConfig::default();
        config.disabled_tools.push("search".into());

        let registry = create_default_registry(&config).unwrap();
        assert!(!registry.contains("search"));
    }

    #[cfg(feature = "search")]
    #[test]
    fn test_missing_search_key_is_config_error() {
        let mut config = ToolsConfig::default();
        config.search.backend = SearchBackendKind::Exa;
        config.search.exa.api_key_env = "SIFT_TEST_MISSING_EXA_KEY".into();

        let result = create_default_registry(&config);
        assert!(matches!(result, Err(ToolError::Core(_))));
    }
}
