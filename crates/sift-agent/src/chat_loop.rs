use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::event::AgentEvent;
use crate::response::{AgentResponse, ToolCallRecord};
use crate::state::LoopState;
use sift_core::{Context, Conversation, Message, ToolCallRequest, ToolDefinition};
use sift_llm::{ChatTransport, CompletionRequest, Pricing, TokenUsage};
use sift_tools::ToolExecutor;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drives one run: alternate model turns and tool execution until the model
/// answers without tool calls or the iteration budget is spent.
///
/// An iteration is one transport call. The budget is checked before each call,
/// so `max_iterations = 1` allows a single model turn and the tool calls it
/// requests, then aborts.
pub struct ChatLoop {
    config: AgentConfig,
    transport: Arc<dyn ChatTransport>,
    tools: Arc<ToolExecutor>,
    pricing: Option<Pricing>,
}

impl ChatLoop {
    pub fn new(
        config: AgentConfig,
        transport: Arc<dyn ChatTransport>,
        tools: Arc<ToolExecutor>,
    ) -> Self {
        Self {
            config,
            transport,
            tools,
            pricing: None,
        }
    }

    pub fn with_pricing(mut self, pricing: Option<Pricing>) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    pub fn tools(&self) -> &Arc<ToolExecutor> {
        &self.tools
    }

    pub fn model(&self) -> &str {
        if self.config.model.is_empty() {
            self.transport.default_model()
        } else {
            &self.config.model
        }
    }

    pub async fn run(&self, ctx: &Context, conversation: &mut Conversation) -> Result<AgentResponse> {
        self.run_with_events(ctx, conversation, None).await
    }

    pub async fn run_with_events(
        &self,
        ctx: &Context,
        conversation: &mut Conversation,
        events: Option<&mpsc::Sender<AgentEvent>>,
    ) -> Result<AgentResponse> {
        let max_iterations = self.config.max_iterations;
        if max_iterations == 0 {
            return Err(AgentError::config("max_iterations must be at least 1"));
        }
        conversation.validate_for_run()?;

        let tools = if self.config.tools_enabled {
            self.tools.definitions()
        } else {
            Vec::new()
        };

        let mut machine = Machine::new(events);
        let mut iterations = 0usize;
        let mut usage = TokenUsage::default();
        let mut served_model = self.model().to_string();
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut partial: Option<String> = None;
        let mut pending: Vec<ToolCallRequest> = Vec::new();

        loop {
            match machine.state {
                LoopState::AwaitingModel => {
                    if ctx.is_cancelled() {
                        return Err(machine.abort(AgentError::Cancelled).await);
                    }
                    if iterations >= max_iterations {
                        warn!(max_iterations, tool_calls = records.len(), "Iteration budget exhausted");
                        let err = AgentError::IterationBudgetExceeded {
                            max_iterations,
                            partial: partial.take(),
                            usage,
                            tool_calls: std::mem::take(&mut records),
                            estimated_cost: self.pricing.map(|p| p.estimate(&usage)),
                        };
                        return Err(machine.abort(err).await);
                    }

                    iterations += 1;
                    info!(iteration = iterations, messages = conversation.len(), "Requesting completion");
                    machine.emit(AgentEvent::ModelRequest { iteration: iterations }).await;

                    let request = self.build_request(conversation, &tools);
                    let result = tokio::select! {
                        result = self.transport.complete(request) => result.map_err(AgentError::from),
                        _ = ctx.cancelled() => Err(AgentError::Cancelled),
                    };
                    let response = match result {
                        Ok(response) => response,
                        Err(e) => {
                            warn!(iteration = iterations, error = %e, "Completion failed");
                            return Err(machine.abort(e).await);
                        }
                    };

                    usage.accumulate(&response.usage);
                    if !response.model.is_empty() {
                        served_model = response.model;
                    }
                    let turn = response.turn;

                    if !turn.has_tool_calls() {
                        let text = turn.content.unwrap_or_default();
                        if text.is_empty() {
                            warn!(iteration = iterations, "Model returned an empty answer");
                        }
                        conversation.push(Message::assistant(text.clone()));
                        machine.transition(LoopState::Done).await?;
                        machine.emit(AgentEvent::FinalAnswer { text: text.clone() }).await;

                        info!(
                            iterations,
                            tool_calls = records.len(),
                            prompt_tokens = usage.prompt_tokens,
                            completion_tokens = usage.completion_tokens,
                            "Run finished"
                        );
                        let cost = self.pricing.map(|p| p.estimate(&usage));
                        return Ok(AgentResponse::new(text, served_model)
                            .with_tool_calls(records)
                            .with_iterations(iterations)
                            .with_usage(usage)
                            .with_estimated_cost(cost));
                    }

                    if !turn.text().is_empty() {
                        partial = Some(turn.text().to_string());
                    }
                    debug!(iteration = iterations, count = turn.tool_calls.len(), "Model requested tools");
                    pending = turn.tool_calls.clone();
                    conversation.push(turn.into_message());
                    machine.transition(LoopState::ExecutingTools).await?;
                }

                LoopState::ExecutingTools => {
                    let calls = std::mem::take(&mut pending);
                    for call in &calls {
                        machine
                            .emit(AgentEvent::tool_call_started(&call.id, &call.name, &call.arguments))
                            .await;
                    }

                    let outcomes = self
                        .tools
                        .execute_all(ctx, &calls, self.config.parallel_tool_calls)
                        .await;

                    for (call, outcome) in calls.iter().zip(outcomes) {
                        let record =
                            ToolCallRecord::new(call.arguments.clone(), &outcome.result, outcome.duration);
                        let status = if record.is_error { "error" } else { "ok" };
                        info!(
                            iteration = iterations,
                            tool = %record.name,
                            id = %record.id,
                            duration_ms = record.duration_ms,
                            status,
                            "Tool call finished"
                        );
                        conversation.push(Message::tool_result(&outcome.result));
                        machine
                            .emit(AgentEvent::ToolCallFinished {
                                id: record.id.clone(),
                                name: record.name.clone(),
                                output: record.output.clone(),
                                is_error: record.is_error,
                                duration_ms: record.duration_ms,
                            })
                            .await;
                        records.push(record);
                    }

                    machine.transition(LoopState::AwaitingModel).await?;
                }

                LoopState::Done | LoopState::Aborted => {
                    return Err(AgentError::internal(format!(
                        "chat loop resumed from terminal state {}",
                        machine.state
                    )));
                }
            }
        }
    }

    fn build_request(&self, conversation: &Conversation, tools: &[ToolDefinition]) -> CompletionRequest {
        let mut request = CompletionRequest::from_conversation(self.model(), conversation)
            .with_tools(tools.to_vec());

        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(top_p) = self.config.top_p {
            request = request.with_top_p(top_p);
        }
        if let Some(penalty) = self.config.frequency_penalty {
            request = request.with_frequency_penalty(penalty);
        }
        if let Some(penalty) = self.config.presence_penalty {
            request = request.with_presence_penalty(penalty);
        }
        if !tools.is_empty() {
            request = request.with_tool_choice(self.config.tool_choice.clone());
        }

        request
    }
}

struct Machine<'a> {
    state: LoopState,
    events: Option<&'a mpsc::Sender<AgentEvent>>,
}

impl<'a> Machine<'a> {
    fn new(events: Option<&'a mpsc::Sender<AgentEvent>>) -> Self {
        Self {
            state: LoopState::initial(),
            events,
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Some(tx) = self.events {
            let _ = tx.send(event).await;
        }
    }

    async fn transition(&mut self, next: LoopState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(AgentError::internal(format!(
                "invalid loop transition {} -> {}",
                self.state, next
            )));
        }
        debug!(from = %self.state, to = %next, "Loop state changed");
        let from = std::mem::replace(&mut self.state, next);
        self.emit(AgentEvent::state_changed(from, next)).await;
        Ok(())
    }

    async fn abort(&mut self, err: AgentError) -> AgentError {
        if let Err(e) = self.transition(LoopState::Aborted).await {
            return e;
        }
        self.emit(AgentEvent::aborted(err.to_string())).await;
        err
    }
}
