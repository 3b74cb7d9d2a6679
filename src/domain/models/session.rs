use super::Message;

pub const DEFAULT_MAX_LENGTH: usize = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChatStatus {
    Idle,
    Pending,
    IdleWithError,
}

/// Owned copy of everything a chat box renders.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatSessionState {
    pub messages: Vec<Message>,
    pub is_pending: bool,
    pub last_error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub max_length: usize,
    pub disabled: bool,
    /// Replaces the greeting when non-empty.
    pub initial_messages: Vec<Message>,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        return SessionOptions {
            max_length: DEFAULT_MAX_LENGTH,
            disabled: false,
            initial_messages: vec![],
        };
    }
}
