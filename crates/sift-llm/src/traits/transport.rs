use crate::error::Result;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

/// The one network call the chat loop makes: send the whole conversation and
/// the declared tool schemas, get back one assistant turn.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
