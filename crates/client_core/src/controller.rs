//! Question/answer cycle state machine and the async session that drives it.

use std::sync::Arc;

use shared::protocol::{ChatRequest, ChatResponse};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    history::build_chat_request,
    transcript::{Transcript, Turn},
    ChatBackend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("message is empty")]
    EmptyInput,
    #[error("previous question is still awaiting an answer")]
    Pending,
}

/// A cycle that has been started: the user turn is already in the transcript and
/// `request` is what goes out on the wire.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub user_turn: Turn,
    pub request: ChatRequest,
}

/// Owns the transcript and the input buffer. Every cycle touches the transcript
/// exactly twice: [`TurnController::begin`] appends the question,
/// [`TurnController::resolve`] appends the answer or the error turn.
#[derive(Debug, Default)]
pub struct TurnController {
    transcript: Transcript,
    state: TurnState,
    input: String,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn can_send(&self) -> bool {
        self.state == TurnState::Idle
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn begin(&mut self, text: &str) -> Result<PendingTurn, SubmitRejected> {
        if self.state == TurnState::Pending {
            return Err(SubmitRejected::Pending);
        }
        if text.trim().is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }

        let user_turn = Turn::user(text);
        self.transcript.push(user_turn.clone());
        let request = build_chat_request(&self.transcript).ok_or(SubmitRejected::EmptyInput)?;
        self.state = TurnState::Pending;
        self.input.clear();

        Ok(PendingTurn { user_turn, request })
    }

    /// Records the outcome of the outstanding request and returns to `Idle`.
    /// Failures of any kind become an error turn.
    pub fn resolve(&mut self, outcome: Result<ChatResponse, ClientError>) -> Turn {
        if self.state != TurnState::Pending {
            warn!("resolving a chat cycle that was never started");
        }

        let turn = match outcome {
            Ok(response) => Turn::assistant(response.answer, response.sources.unwrap_or_default()),
            Err(_) => Turn::error(),
        };
        self.transcript.push(turn.clone());
        self.state = TurnState::Idle;
        turn
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    TurnAppended(Turn),
    StateChanged(TurnState),
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Answered(Turn),
    Failed(Turn),
    Ignored(SubmitRejected),
}

impl SubmitOutcome {
    pub fn turn(&self) -> Option<&Turn> {
        match self {
            SubmitOutcome::Answered(turn) | SubmitOutcome::Failed(turn) => Some(turn),
            SubmitOutcome::Ignored(_) => None,
        }
    }
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    inner: Mutex<TurnController>,
    events: broadcast::Sender<SessionEvent>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            inner: Mutex::new(TurnController::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn can_send(&self) -> bool {
        self.inner.lock().await.can_send()
    }

    pub async fn state(&self) -> TurnState {
        self.inner.lock().await.state()
    }

    pub async fn transcript(&self) -> Transcript {
        self.inner.lock().await.transcript().clone()
    }

    pub async fn set_input(&self, input: impl Into<String>) {
        self.inner.lock().await.set_input(input);
    }

    pub async fn input(&self) -> String {
        self.inner.lock().await.input().to_string()
    }

    /// Sends whatever is in the input buffer.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.input().await;
        self.submit(&text).await
    }

    /// Runs one question/answer cycle. The lock is released while the request is
    /// in flight, so a concurrent call sees `Pending` and is ignored.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let pending = {
            let mut guard = self.inner.lock().await;
            match guard.begin(text) {
                Ok(pending) => pending,
                Err(rejected) => {
                    debug!(reason = %rejected, "submit ignored");
                    return SubmitOutcome::Ignored(rejected);
                }
            }
        };

        self.emit(SessionEvent::TurnAppended(pending.user_turn));
        self.emit(SessionEvent::StateChanged(TurnState::Pending));

        info!(
            history_len = pending.request.chat_history.len(),
            "sending chat request"
        );
        let outcome = self.backend.chat(&pending.request).await;
        match &outcome {
            Ok(response) => info!(
                sources = response.sources.as_ref().map_or(0, Vec::len),
                "chat answer received"
            ),
            Err(error) => warn!(%error, timeout = error.is_timeout(), "chat request failed"),
        }

        let turn = self.inner.lock().await.resolve(outcome);

        self.emit(SessionEvent::TurnAppended(turn.clone()));
        self.emit(SessionEvent::StateChanged(TurnState::Idle));

        if turn.is_error() {
            SubmitOutcome::Failed(turn)
        } else {
            SubmitOutcome::Answered(turn)
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
