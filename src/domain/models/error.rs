use thiserror::Error;

/// Why a submission was refused before anything was sent. These never leave
/// the chat box; they only drive whether the send affordance is enabled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message is empty")]
    Empty,
    #[error("message is {length} characters, the limit is {max}")]
    TooLong { length: usize, max: usize },
    #[error("waiting on a reply")]
    Pending,
    #[error("chat is disabled")]
    Disabled,
}

/// Failures a backend can report for a single send.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Network request failed, please check your connection.")]
    Transport { reason: String },
    #[error("{0}")]
    Remote(String),
    #[error("Unexpected response from the chat service: {0}")]
    MalformedResponse(String),
}

impl SendError {
    pub fn transport(reason: impl ToString) -> SendError {
        return SendError::Transport {
            reason: reason.to_string(),
        };
    }
}
