#[cfg(test)]
#[path = "ai_model_test.rs"]
mod tests;

use std::fmt;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Model family a descriptor belongs to. The set is open; anything the API
/// returns that isn't known is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    OpenAI,
    DeepSeek,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::OpenAI => return "openai",
            Provider::DeepSeek => return "deepseek",
            Provider::Other(name) => return name,
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Provider {
        match value.as_str() {
            "openai" => return Provider::OpenAI,
            "deepseek" => return Provider::DeepSeek,
            _ => return Provider::Other(value),
        }
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> String {
        return value.as_str().to_string();
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.as_str());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AIModelDescriptor {
    pub fn new(id: &str, name: &str, provider: Provider, description: &str) -> AIModelDescriptor {
        let mut desc = None;
        if !description.is_empty() {
            desc = Some(description.to_string());
        }

        return AIModelDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            provider,
            description: desc,
        };
    }
}
