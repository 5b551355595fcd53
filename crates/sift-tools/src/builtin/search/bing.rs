use super::{SearchBackend, SearchHit};
use crate::error::{Result, ToolError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sift_core::config::BingSettings;
use std::time::Duration;

pub const DEFAULT_BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

#[derive(Clone, Debug)]
pub struct BingConfig {
    pub subscription_key: String,
    pub endpoint: String,
    pub count: u32,
}

impl BingConfig {
    pub fn new(subscription_key: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            endpoint: DEFAULT_BING_ENDPOINT.to_string(),
            count: 5,
        }
    }

    pub fn from_settings(subscription_key: impl Into<String>, settings: &BingSettings) -> Self {
        Self {
            endpoint: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BING_ENDPOINT.to_string()),
            count: settings.num_results,
            ..Self::new(subscription_key)
        }
    }
}

pub struct BingSearch {
    config: BingConfig,
    client: Client,
}

impl BingSearch {
    pub fn new(config: BingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("sift/0.1")
            .build()
            .unwrap_or_default();

        Self { config, client }
    }
}

#[async_trait]
impl SearchBackend for BingSearch {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let count = self.config.count.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .query(&[
                ("q", query),
                ("textDecorations", "false"),
                ("count", count.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::execution_failed(
                "search",
                format!("bing returned {}: {}", status, text),
            ));
        }

        let body: BingResponse = response.json().await?;
        Ok(parse_results(body))
    }
}

fn parse_results(body: BingResponse) -> Vec<SearchHit> {
    body.web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .map(|page| SearchHit {
            title: page.name,
            link: page.url,
            snippet: page.snippet,
            score: None,
            publish: None,
        })
        .collect()
}

#[derive(Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Deserialize)]
struct BingPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let raw = serde_json::json!({
            "_type": "SearchResponse",
            "webPages": {
                "value": [
                    {"name": "Rust", "url": "https://www.rust-lang.org/", "snippet": "A language empowering everyone"},
                    {"name": "Docs", "url": "https://doc.rust-lang.org/"}
                ]
            }
        });

        let hits = parse_results(serde_json::from_value(raw).unwrap());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust");
        assert_eq!(hits[0].link, "https://www.rust-lang.org/");
        assert_eq!(hits[1].snippet, "");

        let serialized = serde_json::to_value(&hits[0]).unwrap();
        assert!(serialized.get("score").is_none());
    }

    #[test]
    fn test_parse_results_without_web_pages() {
        let hits = parse_results(serde_json::from_value(serde_json::json!({})).unwrap());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let settings = BingSettings {
            endpoint: Some("https://example.test/search".into()),
            ..BingSettings::default()
        };
        let config = BingConfig::from_settings("key", &settings);
        assert_eq!(config.endpoint, "https://example.test/search");
        assert_eq!(config.count, 5);
    }
}
