use crate::error::{Result, ToolError};
use crate::registry::ToolRegistry;
use crate::traits::ToolOutput;
use futures::future::join_all;
use serde_json::Value;
use sift_core::{error_payload, Context, ToolCallRequest, ToolDefinition, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct CallOutcome {
    pub result: ToolResult,
    pub duration: Duration,
}

/// Runs tool calls against a registry. Every failure, from an unknown name to
/// a timed-out tool, comes back as an error payload.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    default_timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            default_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Executes `name` with the raw argument text the model produced.
    pub async fn execute(&self, ctx: &Context, name: &str, arguments: &str) -> ToolOutput {
        let started = Instant::now();

        match self.try_execute(ctx, name, arguments).await {
            Ok(output) => {
                let output = normalize(output);
                info!(
                    tool = name,
                    is_error = output.is_error,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool execution completed"
                );
                output
            }
            Err(e) => {
                warn!(
                    tool = name,
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool execution failed"
                );
                ToolOutput::error(e.to_string())
            }
        }
    }

    pub async fn execute_call(&self, ctx: &Context, call: &ToolCallRequest) -> ToolResult {
        self.execute_timed(ctx, call).await.result
    }

    /// Executes every call of one assistant turn. Outcomes come back in
    /// request order whether or not the calls ran concurrently.
    pub async fn execute_all(
        &self,
        ctx: &Context,
        calls: &[ToolCallRequest],
        parallel: bool,
    ) -> Vec<CallOutcome> {
        if parallel && calls.len() > 1 {
            join_all(calls.iter().map(|call| self.execute_timed(ctx, call))).await
        } else {
            let mut outcomes = Vec::with_capacity(calls.len());
            for call in calls {
                outcomes.push(self.execute_timed(ctx, call).await);
            }
            outcomes
        }
    }

    async fn execute_timed(&self, ctx: &Context, call: &ToolCallRequest) -> CallOutcome {
        debug!(id = %call.id, tool = %call.name, "Dispatching tool call");
        let started = Instant::now();
        let output = self.execute(ctx, &call.name, &call.arguments).await;

        CallOutcome {
            result: ToolResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                content: output.content,
                is_error: output.is_error,
            },
            duration: started.elapsed(),
        }
    }

    async fn try_execute(&self, ctx: &Context, name: &str, arguments: &str) -> Result<ToolOutput> {
        if ctx.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        let call = ToolCallRequest::new("", name, arguments);
        let input = call.decode_arguments()?;

        tool.definition()
            .validate_arguments(&input)
            .map_err(ToolError::InvalidInput)?;

        let execute_timeout = ctx
            .remaining()
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        tokio::select! {
            result = timeout(execute_timeout, tool.execute(ctx, Value::Object(input))) => {
                match result {
                    Ok(output) => output,
                    Err(_) => {
                        warn!(tool = name, timeout_ms = execute_timeout.as_millis() as u64, "Tool execution timed out");
                        Err(ToolError::Timeout(execute_timeout.as_millis() as u64))
                    }
                }
            }
            _ = ctx.cancelled() => Err(ToolError::Cancelled),
        }
    }
}

// Error outputs built by hand may hold plain text; rewrap it as a payload.
fn normalize(output: ToolOutput) -> ToolOutput {
    if !output.is_error {
        return output;
    }

    let is_payload = serde_json::from_str::<Value>(&output.content)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(|s| !s.is_empty()))
        .unwrap_or(false);

    if is_payload {
        output
    } else {
        ToolOutput {
            content: error_payload(&output.content),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Tool;
    use async_trait::async_trait;
    use sift_core::ToolParameter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTool {
        def: ToolDefinition,
        calls: AtomicUsize,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                def: ToolDefinition::new("echo", "Echoes input")
                    .with_required_param("message", ToolParameter::string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutput::text(input["message"].as_str().unwrap_or_default()))
        }
    }

    struct SlowTool {
        def: ToolDefinition,
        delay: Duration,
    }

    impl SlowTool {
        fn new(name: &str, delay: Duration) -> Self {
            Self {
                def: ToolDefinition::new(name, "A slow tool"),
                delay,
            }
        }
    }

    #[async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
            tokio::time::sleep(self.delay).await;
            Ok(ToolOutput::text(self.def.name.clone()))
        }
    }

    struct FailingTool {
        def: ToolDefinition,
    }

    #[async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
            Err(ToolError::execution_failed("fail", "backend unavailable"))
        }
    }

    struct PlainErrorTool {
        def: ToolDefinition,
    }

    #[async_trait]
    impl Tool for PlainErrorTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
            Ok(ToolOutput {
                content: String::new(),
                is_error: true,
            })
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new())).unwrap();
        registry
            .register(Arc::new(SlowTool::new("slow", Duration::from_secs(10))))
            .unwrap();
        registry
            .register(Arc::new(FailingTool {
                def: ToolDefinition::new("fail", "Always fails"),
            }))
            .unwrap();
        registry
            .register(Arc::new(PlainErrorTool {
                def: ToolDefinition::new("plain_error", "Reports an empty error"),
            }))
            .unwrap();
        ToolExecutor::new(Arc::new(registry)).with_timeout(Duration::from_millis(100))
    }

    fn error_message(output: &ToolOutput) -> String {
        let value: Value = serde_json::from_str(&output.content).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_executor_execute() {
        let output = executor()
            .execute(&Context::new(), "echo", r#"{"message": "hello"}"#)
            .await;

        assert!(!output.is_error);
        assert_eq!(output.content, "hello");
    }

    #[tokio::test]
    async fn test_executor_not_found() {
        let output = executor().execute(&Context::new(), "nonexistent", "{}").await;

        assert!(output.is_error);
        assert!(error_message(&output).contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_executor_malformed_arguments() {
        let output = executor()
            .execute(&Context::new(), "echo", "{'message': 'hello'}")
            .await;

        assert!(output.is_error);
        assert!(!error_message(&output).is_empty());
    }

    #[tokio::test]
    async fn test_executor_missing_required() {
        let output = executor().execute(&Context::new(), "echo", "{}").await;

        assert!(output.is_error);
        assert!(error_message(&output).contains("message"));
    }

    #[tokio::test]
    async fn test_executor_timeout() {
        let output = executor().execute(&Context::new(), "slow", "").await;

        assert!(output.is_error);
        assert!(error_message(&output).contains("Timeout"));
    }

    #[tokio::test]
    async fn test_executor_tool_error() {
        let output = executor().execute(&Context::new(), "fail", "{}").await;

        assert!(output.is_error);
        assert!(error_message(&output).contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_executor_wraps_plain_error() {
        let output = executor().execute(&Context::new(), "plain_error", "{}").await;

        assert!(output.is_error);
        assert_eq!(error_message(&output), "unknown error");
    }

    #[tokio::test]
    async fn test_executor_cancelled() {
        let ctx = Context::new();
        ctx.cancel();

        let output = executor()
            .execute(&ctx, "echo", r#"{"message": "hello"}"#)
            .await;
        assert!(output.is_error);
        assert!(error_message(&output).contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_execute_call_correlates_id() {
        let call = ToolCallRequest::new("call_9", "echo", r#"{"message": "hi"}"#);
        let result = executor().execute_call(&Context::new(), &call).await;

        assert_eq!(result.tool_call_id, "call_9");
        assert_eq!(result.name, "echo");
        assert_eq!(result.content, "hi");
    }

    #[tokio::test]
    async fn test_execute_all_preserves_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(SlowTool::new("first", Duration::from_millis(80))))
            .unwrap();
        registry
            .register(Arc::new(SlowTool::new("second", Duration::from_millis(5))))
            .unwrap();
        let executor = ToolExecutor::new(Arc::new(registry));

        let calls = vec![
            ToolCallRequest::new("a", "first", "{}"),
            ToolCallRequest::new("b", "second", "{}"),
            ToolCallRequest::new("c", "missing", "{}"),
        ];

        for parallel in [true, false] {
            let results: Vec<ToolResult> = executor
                .execute_all(&Context::new(), &calls, parallel)
                .await
                .into_iter()
                .map(|o| o.result)
                .collect();
            let ids: Vec<&str> = results.iter().map(|r| r.tool_call_id.as_str()).collect();

            assert_eq!(ids, vec!["a", "b", "c"]);
            assert_eq!(results[0].content, "first");
            assert_eq!(results[1].content, "second");
            assert!(results[2].is_error);
            assert!(results[2].error_message().is_some());
        }
    }
}
