use crate::error::{LlmError, Result};
use crate::traits::ChatTransport;
use crate::types::{
    AssistantTurn, CompletionRequest, CompletionResponse, StopReason, TokenUsage, ToolChoice,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Message, Role, ToolCallRequest, ToolDefinition};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` as used by Azure OpenAI deployments.
    ApiKeyHeader,
}

/// Chat-completion transport for any endpoint speaking the OpenAI
/// `/chat/completions` dialect.
pub struct OpenAiProvider {
    client: Client,
    name: String,
    api_key: String,
    endpoint: String,
    auth: AuthScheme,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            name: "openai".to_string(),
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            auth: AuthScheme::Bearer,
            default_model: "gpt-4o".to_string(),
        }
    }

    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            name: "groq".to_string(),
            default_model: "llama3-8b-8192".to_string(),
            ..Self::with_base_url(api_key, GROQ_BASE_URL)
        }
    }

    pub fn azure(
        endpoint: &str,
        deployment: &str,
        api_version: Option<&str>,
        api_key: impl Into<String>,
    ) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            api_version.unwrap_or(DEFAULT_AZURE_API_VERSION)
        );

        Self {
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            name: "azure".to_string(),
            api_key: api_key.into(),
            endpoint,
            auth: AuthScheme::ApiKeyHeader,
            default_model: deployment.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth
    }

    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| {
                let tool_calls = if msg.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        msg.tool_calls
                            .iter()
                            .map(|tc| OpenAiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".to_string(),
                                function: OpenAiFunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                };

                OpenAiMessage {
                    role: msg.role.as_str().to_string(),
                    content: match msg.role {
                        // assistant turns that only call tools carry null content
                        Role::Assistant => msg.content.clone(),
                        _ => Some(msg.text().to_string()),
                    },
                    tool_calls,
                    tool_call_id: msg.tool_call_id.clone(),
                    name: match msg.role {
                        Role::Tool => msg.name.clone(),
                        _ => None,
                    },
                }
            })
            .collect()
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                r#type: "function".to_string(),
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: Some(t.description.clone()),
                    parameters: serde_json::to_value(&t.parameters)
                        .unwrap_or(Value::Object(Default::default())),
                },
            })
            .collect()
    }

    fn convert_tool_choice(&self, choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => Value::String("auto".to_string()),
            ToolChoice::None => Value::String("none".to_string()),
            ToolChoice::Required => Value::String("required".to_string()),
            ToolChoice::Tool { name } => serde_json::json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> Result<Value> {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };

        let mut body = serde_json::json!({
            "model": model,
            "messages": self.convert_messages(&request.messages),
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = temp.into();
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = top_p.into();
        }
        if let Some(penalty) = request.frequency_penalty {
            body["frequency_penalty"] = penalty.into();
        }
        if let Some(penalty) = request.presence_penalty {
            body["presence_penalty"] = penalty.into();
        }
        if !request.tools.is_empty() {
            body["tools"] = serde_json::to_value(self.convert_tools(&request.tools))?;
            let choice = request.tool_choice.clone().unwrap_or_default();
            body["tool_choice"] = self.convert_tool_choice(&choice);
        }

        Ok(body)
    }

    fn parse_response(&self, response: OpenAiResponse, requested_model: &str) -> Result<CompletionResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response("No choices in response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();

        let turn = AssistantTurn {
            content: choice.message.content,
            tool_calls,
        };

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let model = response
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| requested_model.to_string());

        let mut parsed = CompletionResponse::new(response.id.unwrap_or_default(), model, turn)
            .with_usage(usage);
        if let Some(reason) = choice
            .finish_reason
            .as_deref()
            .and_then(StopReason::from_finish_reason)
        {
            parsed = parsed.with_stop_reason(reason);
        }

        Ok(parsed)
    }

    fn status_error(&self, status: StatusCode, body: &str) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed(format!("{}: {}", self.name, status)),
            429 => LlmError::rate_limited(&self.name, None),
            400 | 404 | 422 => LlmError::invalid_request(format!("{}: {}", status, body)),
            _ => LlmError::api(&self.name, format!("{}: {}", status, body)),
        }
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl ChatTransport for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(&request)?;
        let started = Instant::now();

        let builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        let builder = match self.auth {
            AuthScheme::Bearer => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            AuthScheme::ApiKeyHeader => builder.header("api-key", &self.api_key),
        };

        let response = builder.json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), "completion request failed");
            return Err(self.status_error(status, &text));
        }

        let openai_response: OpenAiResponse = response.json().await?;
        let parsed = self.parse_response(openai_response, &request.model)?;

        debug!(
            provider = %self.name,
            model = %parsed.model,
            tool_calls = parsed.turn.tool_calls.len(),
            prompt_tokens = parsed.usage.prompt_tokens,
            completion_tokens = parsed.usage.completion_tokens,
            duration_ms = started.elapsed().as_millis() as u64,
            "completion received"
        );

        Ok(parsed)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: OpenAiFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{ToolParameter, ToolResult};

    #[test]
    fn test_provider_presets() {
        let provider = OpenAiProvider::new("test-key").with_model("gpt-4");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "gpt-4");
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/chat/completions");

        let groq = OpenAiProvider::groq("test-key");
        assert_eq!(groq.name(), "groq");
        assert_eq!(groq.default_model(), "llama3-8b-8192");
        assert_eq!(groq.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(groq.auth_scheme(), AuthScheme::Bearer);

        let azure = OpenAiProvider::azure(
            "https://example.openai.azure.com/",
            "gpt-4o",
            Some("2024-06-01"),
            "test-key",
        );
        assert_eq!(
            azure.endpoint(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
        assert_eq!(azure.auth_scheme(), AuthScheme::ApiKeyHeader);
    }

    #[test]
    fn test_message_conversion() {
        let provider = OpenAiProvider::groq("test-key");

        let messages = vec![
            Message::system("You are a helpful assistant."),
            Message::user("What is the latest paper on X?"),
            Message::assistant_turn(
                None,
                vec![ToolCallRequest::new("call_1", "search", r#"{"query":"X"}"#)],
            ),
            Message::tool_result(&ToolResult::success("call_1", "search", "[]")),
        ];

        let converted = provider.convert_messages(&messages);
        assert_eq!(converted.len(), 4);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[2].role, "assistant");
        assert!(converted[2].content.is_none());
        assert_eq!(converted[2].tool_calls.as_ref().map(|c| c.len()), Some(1));
        assert_eq!(converted[3].role, "tool");
        assert_eq!(converted[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(converted[3].name.as_deref(), Some("search"));
    }

    #[test]
    fn test_body_includes_tools_and_tuning() {
        let provider = OpenAiProvider::groq("test-key");
        let tool = ToolDefinition::new("search", "Search the web")
            .with_required_param("query", ToolParameter::string());

        let request = CompletionRequest::new("llama3-8b-8192", vec![Message::user("Hi")])
            .with_tools(vec![tool])
            .with_max_tokens(4096)
            .with_top_p(1.0);

        let body = provider.build_body(&request).unwrap();
        assert_eq!(body["model"], "llama3-8b-8192");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "search");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"],
            serde_json::json!(["query"])
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_body_omits_tools_when_none_declared() {
        let provider = OpenAiProvider::groq("test-key");
        let request = CompletionRequest::new("", vec![Message::user("Hi")]);

        let body = provider.build_body(&request).unwrap();
        assert_eq!(body["model"], "llama3-8b-8192");
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let provider = OpenAiProvider::groq("test-key");
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "llama3-70b-8192",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "search", "arguments": "{\"query\": \"X\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        });

        let response: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let parsed = provider.parse_response(response, "llama3-8b-8192").unwrap();

        assert_eq!(parsed.model, "llama3-70b-8192");
        assert_eq!(parsed.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(parsed.turn.tool_calls[0].id, "call_abc");
        assert_eq!(parsed.turn.tool_calls[0].arguments, "{\"query\": \"X\"}");
        assert_eq!(parsed.usage.total(), 19);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let provider = OpenAiProvider::groq("test-key");
        let response: OpenAiResponse =
            serde_json::from_value(serde_json::json!({"id": "x", "choices": []})).unwrap();

        assert!(matches!(
            provider.parse_response(response, "m"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let provider = OpenAiProvider::groq("test-key");

        assert!(matches!(
            provider.status_error(StatusCode::UNAUTHORIZED, ""),
            LlmError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            provider.status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            provider.status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            LlmError::Api { .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let provider = OpenAiProvider::with_base_url("test-key", "http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(5));

        let err = provider
            .complete(CompletionRequest::new("m", vec![Message::user("Hi")]))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Network(_) | LlmError::Timeout(_)));
    }
}
