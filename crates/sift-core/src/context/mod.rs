use crate::types::{RequestId, SessionId};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Per-run context handed to the loop and every tool invocation.
///
/// Cloning shares the cancellation token; `child()` derives a token that is
/// cancelled with its parent but can also be cancelled on its own.
#[derive(Clone)]
pub struct Context {
    pub request_id: RequestId,
    pub session_id: Option<SessionId>,
    started_at: Instant,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            session_id: None,
            started_at: Instant::now(),
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn child(&self) -> Self {
        Self {
            request_id: RequestId::new(),
            session_id: self.session_id,
            started_at: Instant::now(),
            deadline: self.deadline,
            cancellation: self.cancellation.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancellation.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("session_id", &self.session_id)
            .field("remaining", &self.remaining())
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}
