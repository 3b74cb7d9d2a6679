#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;

use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::Provider;
use crate::domain::models::SendError;
use crate::domain::models::Usage;

const GPT_35_REPLIES: &[&str] = &[
    "As GPT-3.5, I understand your question: \"{message}\". It's an interesting topic, let me walk through it in detail...",
    "Based on your question, I think a few key points are involved. First...",
    "That's a great question! From my understanding, I'd suggest looking at it from the following angles...",
];

const GPT_4_REPLIES: &[&str] = &[
    "As GPT-4, I can offer a deeper analysis. What you mentioned, \"{message}\", is worth exploring in depth...",
    "From GPT-4's point of view, this question has several layers of complexity. Let me go through them one by one...",
    "Your question has real depth. As a more advanced model, I think it should be answered systematically...",
];

const DEEPSEEK_CHAT_REPLIES: &[&str] = &[
    "Hello! About \"{message}\", let me answer that in detail.",
    "I understand what you're asking. Let me give you a complete yet concise answer.",
    "Good question! I'll give you accurate and useful information.",
    "Got it! This is worth discussing in depth, let me break it down for you.",
    "Received your question. I'll give you a clear and simple answer.",
];

const DEEPSEEK_CODER_REPLIES: &[&str] = &[
    "About this programming question, let me give you a detailed technical answer.",
    "Let me help you solve this code related problem.",
    "This is a good technical question, let me analyze it in detail.",
    "From a technical point of view, this problem can be solved like this.",
];

const DEEPSEEK_SUFFIX: &str =
    "This is an example of a balanced reply, keeping responses fast while staying complete and useful.";
const SIMULATED_SUFFIX: &str = "Note: this is a simulated reply used to demonstrate the response style of different AI models. Real usage calls the actual API.";

fn templates(model: &str) -> &'static [&'static str] {
    match model {
        "gpt-3.5-turbo" => return GPT_35_REPLIES,
        "gpt-4" => return GPT_4_REPLIES,
        "deepseek-coder" => return DEEPSEEK_CODER_REPLIES,
        _ => return DEEPSEEK_CHAT_REPLIES,
    }
}

fn is_deepseek(model: &str) -> bool {
    return model.contains("deepseek");
}

pub fn generate_reply(message: &str, model: &str) -> String {
    let template = templates(model)
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default();
    let reply = template.replace("{message}", message);

    if is_deepseek(model) {
        return format!("{reply}\n\n{DEEPSEEK_SUFFIX}");
    }

    return format!("{reply}\n\n{SIMULATED_SUFFIX}");
}

pub fn mock_models() -> Vec<AIModelDescriptor> {
    return vec![
        AIModelDescriptor::new(
            "deepseek-chat",
            "DeepSeek Chat",
            Provider::DeepSeek,
            "DeepSeek conversation model (speed optimized)",
        ),
        AIModelDescriptor::new(
            "deepseek-coder",
            "DeepSeek Coder",
            Provider::DeepSeek,
            "DeepSeek code generation model (speed optimized)",
        ),
        AIModelDescriptor::new(
            "gpt-3.5-turbo",
            "GPT-3.5 Turbo",
            Provider::OpenAI,
            "OpenAI's fast response model",
        ),
        AIModelDescriptor::new(
            "gpt-4",
            "GPT-4",
            Provider::OpenAI,
            "OpenAI's most capable model",
        ),
    ];
}

/// Answers locally with canned replies after an artificial delay. Nothing
/// touches the network.
pub struct Mock {
    deepseek_delay_ms: RangeInclusive<u64>,
    default_delay_ms: RangeInclusive<u64>,
}

impl Default for Mock {
    fn default() -> Mock {
        return Mock {
            deepseek_delay_ms: 800..=2000,
            default_delay_ms: 1000..=3000,
        };
    }
}

impl Mock {
    #[cfg(test)]
    pub fn without_delay() -> Mock {
        return Mock {
            deepseek_delay_ms: 0..=0,
            default_delay_ms: 0..=0,
        };
    }

    fn delay_for(&self, model: &str) -> Duration {
        let mut range = self.default_delay_ms.clone();
        if is_deepseek(model) {
            range = self.deepseek_delay_ms.clone();
        }

        return Duration::from_millis(rand::thread_rng().gen_range(range));
    }
}

#[async_trait]
impl Backend for Mock {
    fn name(&self) -> BackendName {
        return BackendName::Mock;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<AIModelDescriptor>> {
        tokio::time::sleep(self.delay_for("")).await;
        return Ok(mock_models());
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: ChatRequest) -> Result<ChatReply, SendError> {
        let delay = self.delay_for(&request.model);
        tracing::debug!(
            model = %request.model,
            delay_ms = delay.as_millis() as u64,
            "Generating mock reply"
        );
        tokio::time::sleep(delay).await;

        let prompt_tokens = (request.message.chars().count() / 4) as u32;
        let mut completion_tokens = 150;
        if is_deepseek(&request.model) {
            completion_tokens = 120;
        }

        return Ok(ChatReply {
            text: generate_reply(&request.message, &request.model),
            usage: Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        });
    }
}
