use super::{SearchBackend, SearchHit};
use crate::error::{Result, ToolError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sift_core::config::ExaSettings;
use std::time::Duration;

pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";

#[derive(Clone, Debug)]
pub struct ExaConfig {
    pub api_key: String,
    pub base_url: String,
    pub search_type: String,
    pub num_results: u32,
    pub include_domains: Vec<String>,
    pub start_published_date: Option<String>,
    pub end_published_date: Option<String>,
    pub use_autoprompt: bool,
}

impl ExaConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_EXA_BASE_URL.to_string(),
            search_type: "neural".to_string(),
            num_results: 5,
            include_domains: vec![],
            start_published_date: None,
            end_published_date: None,
            use_autoprompt: true,
        }
    }

    pub fn from_settings(api_key: impl Into<String>, settings: &ExaSettings) -> Self {
        Self {
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_EXA_BASE_URL.to_string()),
            num_results: settings.num_results,
            include_domains: settings.include_domains.clone(),
            start_published_date: settings.start_published_date.clone(),
            end_published_date: settings.end_published_date.clone(),
            use_autoprompt: settings.use_autoprompt,
            ..Self::new(api_key)
        }
    }

    pub fn with_include_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }

    pub fn with_num_results(mut self, n: u32) -> Self {
        self.num_results = n;
        self
    }
}

/// Neural search against the Exa API, returning page text as the snippet.
pub struct ExaSearch {
    config: ExaConfig,
    client: Client,
}

impl ExaSearch {
    pub fn new(config: ExaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("sift/0.1")
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    fn request_body<'a>(&'a self, query: &'a str) -> ExaRequest<'a> {
        ExaRequest {
            query,
            search_type: &self.config.search_type,
            num_results: self.config.num_results,
            include_domains: &self.config.include_domains,
            start_published_date: self.config.start_published_date.as_deref(),
            end_published_date: self.config.end_published_date.as_deref(),
            use_autoprompt: self.config.use_autoprompt,
            contents: ExaContents { text: true },
        }
    }
}

#[async_trait]
impl SearchBackend for ExaSearch {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .json(&self.request_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::execution_failed(
                "search",
                format!("exa returned {}: {}", status, text),
            ));
        }

        let body: ExaResponse = response.json().await?;
        Ok(parse_results(body))
    }
}

fn parse_results(body: ExaResponse) -> Vec<SearchHit> {
    body.results
        .into_iter()
        .map(|r| SearchHit {
            title: r.title.unwrap_or_default(),
            link: r.url,
            snippet: r.text.unwrap_or_default(),
            score: r.score,
            publish: r.published_date,
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'a str,
    num_results: u32,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    start_published_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_published_date: Option<&'a str>,
    use_autoprompt: bool,
    contents: ExaContents,
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

#[derive(Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    published_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::search::SearchTool;
    use crate::traits::Tool;
    use sift_core::Context;

    #[test]
    fn test_request_body_shape() {
        let search = ExaSearch::new(
            ExaConfig::new("key").with_include_domains(vec!["arxiv.org".into()]),
        );

        let body = serde_json::to_value(search.request_body("latest paper on X")).unwrap();
        assert_eq!(body["query"], "latest paper on X");
        assert_eq!(body["type"], "neural");
        assert_eq!(body["numResults"], 5);
        assert_eq!(body["useAutoprompt"], true);
        assert_eq!(body["includeDomains"], serde_json::json!(["arxiv.org"]));
        assert_eq!(body["contents"]["text"], true);
        assert!(body.get("startPublishedDate").is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = ExaSettings {
            num_results: 10,
            start_published_date: Some("2023-12-31".into()),
            ..ExaSettings::default()
        };

        let config = ExaConfig::from_settings("key", &settings);
        assert_eq!(config.num_results, 10);
        assert_eq!(config.base_url, DEFAULT_EXA_BASE_URL);
        assert_eq!(config.start_published_date.as_deref(), Some("2023-12-31"));
    }

    #[test]
    fn test_parse_results() {
        let raw = serde_json::json!({
            "results": [
                {
                    "title": "Attention Is All You Need",
                    "url": "https://arxiv.org/abs/1706.03762",
                    "text": "The dominant sequence transduction models...",
                    "score": 0.21,
                    "publishedDate": "2017-06-12"
                },
                {"url": "https://arxiv.org/abs/2"}
            ]
        });

        let hits = parse_results(serde_json::from_value(raw).unwrap());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://arxiv.org/abs/1706.03762");
        assert_eq!(hits[0].publish.as_deref(), Some("2017-06-12"));
        assert_eq!(hits[0].score, Some(0.21));
        assert_eq!(hits[1].title, "");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_error() {
        let mut config = ExaConfig::new("key");
        config.base_url = "http://127.0.0.1:9".to_string();
        let tool = SearchTool::new(ExaSearch::new(config));

        let result = tool
            .execute(&Context::new(), serde_json::json!({"query": "X"}))
            .await;
        assert!(result.is_err());
    }
}
