mod bing;
mod exa;

pub use bing::{BingConfig, BingSearch, DEFAULT_BING_ENDPOINT};
pub use exa::{ExaConfig, ExaSearch, DEFAULT_EXA_BASE_URL};

use crate::error::{Result, ToolError};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Context, ToolDefinition, ToolParameter};
use tracing::debug;

pub const SEARCH_TOOL_NAME: &str = "search";

/// One search result as the model sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// The `search` tool, answering from whichever backend it wraps.
pub struct SearchTool<B> {
    def: ToolDefinition,
    backend: B,
}

impl<B: SearchBackend> SearchTool<B> {
    pub fn new(backend: B) -> Self {
        let def = ToolDefinition::new(
            SEARCH_TOOL_NAME,
            "Search for any query that is not known or understood by the model.",
        )
        .with_required_param(
            "query",
            ToolParameter::string().with_description("Search query to look up"),
        );

        Self { def, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[derive(Deserialize)]
struct SearchInput {
    query: String,
}

#[async_trait]
impl<B: SearchBackend> Tool for SearchTool<B> {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
        let input: SearchInput = serde_json::from_value(input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::invalid_input("query must not be empty"));
        }

        let hits = self.backend.search(query).await?;
        debug!(backend = self.backend.name(), query, hits = hits.len(), "search completed");

        ToolOutput::json(&hits)
    }
}
