#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::AIModelDescriptor;
use super::SendError;
use super::Tuning;
use super::TuningProfile;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum::EnumIter,
    strum::EnumString,
    strum::EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    GraphQL,
    Rest,
    Mock,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return text.parse::<BackendName>().ok();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(message: &str, model: &str) -> ChatRequest {
        return ChatRequest {
            message: message.to_string(),
            model: model.to_string(),
            temperature: None,
            max_tokens: None,
        };
    }

    /// Fills whatever the caller left out with the model's tuning profile.
    pub fn tuned(&self) -> Tuning {
        let defaults = TuningProfile::for_model(&self.model).tuning;
        return Tuning {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub usage: Option<Usage>,
}

impl ChatReply {
    pub fn new(text: &str) -> ChatReply {
        return ChatReply {
            text: text.to_string(),
            usage: None,
        };
    }
}

/// Reply used when a backend reports success but hands back no text.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, no valid reply was received.";

/// Result of one send, tagged with the sequence number of the submission that
/// started it.
#[derive(Debug)]
pub struct SendOutcome {
    pub seq: u64,
    pub result: Result<ChatReply, SendError>,
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to warn early when the chat service can't be reached.
    async fn health_check(&self) -> Result<()>;

    /// All models the service offers. Callers that need a list no matter what
    /// should go through `ModelRegistry`, which falls back to defaults.
    async fn list_models(&self) -> Result<Vec<AIModelDescriptor>>;

    /// Sends a single user message and waits for the whole reply. There are no
    /// retries, and no timeout beyond what the HTTP client has by default.
    async fn send(&self, request: ChatRequest) -> Result<ChatReply, SendError>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
