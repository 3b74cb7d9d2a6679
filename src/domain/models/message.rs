#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[strum(serialize = "You")]
    User,
    #[strum(serialize = "AI")]
    Ai,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(id: String, sender: Sender, content: &str) -> Message {
        return Message {
            id,
            content: content.to_string(),
            sender,
            timestamp: Local::now(),
        };
    }

    pub fn is_user(&self) -> bool {
        return self.sender == Sender::User;
    }

    /// Hour and minute the message was created at, in local time.
    pub fn format_time(&self) -> String {
        return self.timestamp.format("%H:%M").to_string();
    }
}

/// Hands out message ids as `{unix_millis}-{seq}`. The sequence is owned by a
/// single session and only ever grows, so ids stay unique even when several
/// messages land in the same millisecond.
#[derive(Default, Debug)]
pub struct MessageIds {
    seq: u64,
}

impl MessageIds {
    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        return format!("{}-{}", Local::now().timestamp_millis(), self.seq);
    }
}
