#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::domain::models::BackendBox;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatSessionState;
use crate::domain::models::ChatStatus;
use crate::domain::models::Message;
use crate::domain::models::MessageIds;
use crate::domain::models::SendError;
use crate::domain::models::SendOutcome;
use crate::domain::models::Sender;
use crate::domain::models::SessionOptions;
use crate::domain::models::ValidationError;

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const CLEARED_GREETING: &str = "Chat history cleared. How can I help you?";
pub const FAILURE_APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

/// A send that has been accepted but not yet run. Awaiting `wait` makes
/// exactly one call to the backend.
pub struct PendingReply {
    seq: u64,
    future: BoxFuture<'static, Result<ChatReply, SendError>>,
}

impl PendingReply {
    pub fn seq(&self) -> u64 {
        return self.seq;
    }

    pub async fn wait(self) -> SendOutcome {
        let result = self.future.await;
        return SendOutcome {
            seq: self.seq,
            result,
        };
    }
}

pub struct ChatSession {
    backend: Arc<BackendBox>,
    ids: MessageIds,
    messages: Vec<Message>,
    last_error: Option<String>,
    in_flight: Option<u64>,
    send_seq: u64,
    max_length: usize,
    disabled: bool,
}

impl ChatSession {
    pub fn new(backend: Arc<BackendBox>, options: SessionOptions) -> ChatSession {
        let mut session = ChatSession {
            backend,
            ids: MessageIds::default(),
            messages: options.initial_messages,
            last_error: None,
            in_flight: None,
            send_seq: 0,
            max_length: options.max_length,
            disabled: options.disabled,
        };

        if session.messages.is_empty() {
            session.push(Sender::Ai, GREETING);
        }

        return session;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn is_pending(&self) -> bool {
        return self.in_flight.is_some();
    }

    pub fn last_error(&self) -> Option<&str> {
        return self.last_error.as_deref();
    }

    pub fn max_length(&self) -> usize {
        return self.max_length;
    }

    pub fn is_disabled(&self) -> bool {
        return self.disabled;
    }

    pub fn status(&self) -> ChatStatus {
        if self.is_pending() {
            return ChatStatus::Pending;
        }
        if self.last_error.is_some() {
            return ChatStatus::IdleWithError;
        }

        return ChatStatus::Idle;
    }

    pub fn snapshot(&self) -> ChatSessionState {
        return ChatSessionState {
            messages: self.messages.clone(),
            is_pending: self.is_pending(),
            last_error: self.last_error.clone(),
        };
    }

    /// Checks `text` against the current state without touching it. Returns
    /// the trimmed text that would be sent.
    pub fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ValidationError> {
        if self.disabled {
            return Err(ValidationError::Disabled);
        }
        if self.is_pending() {
            return Err(ValidationError::Pending);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let length = trimmed.chars().count();
        if length > self.max_length {
            return Err(ValidationError::TooLong {
                length,
                max: self.max_length,
            });
        }

        return Ok(trimmed);
    }

    /// Appends the user's message and hands back the pending send. Rejected
    /// submissions leave the session untouched and never reach the backend.
    pub fn submit(&mut self, text: &str, model: &str) -> Result<PendingReply, ValidationError> {
        let content = self.validate(text)?.to_string();

        self.push(Sender::User, &content);
        self.send_seq += 1;
        self.in_flight = Some(self.send_seq);
        self.last_error = None;

        tracing::debug!(
            seq = self.send_seq,
            model = %model,
            length = content.chars().count(),
            "Submitted message"
        );

        let backend = Arc::clone(&self.backend);
        let request = ChatRequest::new(&content, model);
        let future = async move {
            return backend.send(request).await;
        }
        .boxed();

        return Ok(PendingReply {
            seq: self.send_seq,
            future,
        });
    }

    /// Records the result of a send. Outcomes that don't belong to the send
    /// currently in flight, such as one started before a `reset`, are dropped
    /// and `false` is returned.
    pub fn apply(&mut self, outcome: SendOutcome) -> bool {
        if self.in_flight != Some(outcome.seq) {
            tracing::debug!(seq = outcome.seq, "Discarding stale reply");
            return false;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(reply) => {
                tracing::debug!(seq = outcome.seq, usage = ?reply.usage, "Reply received");
                self.push(Sender::Ai, &reply.text);
            }
            Err(err) => {
                tracing::error!(seq = outcome.seq, error = ?err, "Send failed");
                self.push(Sender::Ai, FAILURE_APOLOGY);
                self.last_error = Some(err.to_string());
            }
        }

        return true;
    }

    /// Submits, waits for the reply, and applies it.
    pub async fn send(&mut self, text: &str, model: &str) -> Result<bool, ValidationError> {
        let pending = self.submit(text, model)?;
        let outcome = pending.wait().await;

        return Ok(self.apply(outcome));
    }

    /// Drops the history for a fresh greeting. A send still in flight keeps
    /// running, but its outcome will no longer apply.
    pub fn reset(&mut self) {
        if let Some(seq) = self.in_flight {
            tracing::debug!(seq = seq, "Reset while a send was in flight");
        }

        self.messages.clear();
        self.in_flight = None;
        self.last_error = None;
        self.push(Sender::Ai, CLEARED_GREETING);
    }

    fn push(&mut self, sender: Sender, content: &str) {
        let id = self.ids.next_id();
        self.messages.push(Message::new(id, sender, content));
    }
}
