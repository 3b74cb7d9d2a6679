#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::SendError;
use crate::domain::models::TuningProfile;
use crate::domain::models::EMPTY_REPLY_FALLBACK;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestChatRequest {
    message: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RestChatResponse {
    reply: Option<String>,
    message: Option<String>,
}

/// Plain JSON chat API: `POST {url}/chat` with a bearer token. It has no model
/// listing, so model selection falls back to the built-in list.
pub struct Rest {
    url: String,
    token: String,
    client: reqwest::Client,
}

impl Rest {
    pub fn new(url: &str, token: &str) -> Rest {
        return Rest {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client: reqwest::Client::new(),
        };
    }
}

#[async_trait]
impl Backend for Rest {
    fn name(&self) -> BackendName {
        return BackendName::Rest;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("REST URL is not defined");
        }

        let res = self
            .client
            .get(&self.url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        if let Err(err) = res {
            tracing::error!(error = ?err, "REST chat API is not reachable");
            bail!("REST chat API {} is not reachable", self.url);
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<AIModelDescriptor>> {
        bail!("The REST chat API does not list models");
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: ChatRequest) -> Result<ChatReply, SendError> {
        let tuning = request.tuned();
        tracing::debug!(
            model = %request.model,
            profile = TuningProfile::for_model(&request.model).name,
            temperature = tuning.temperature,
            max_tokens = tuning.max_tokens,
            "Sending REST message"
        );

        let req = RestChatRequest {
            message: request.message,
            model: request.model,
            temperature: tuning.temperature,
            max_tokens: tuning.max_tokens,
        };

        let mut builder = self.client.post(format!("{url}/chat", url = self.url));
        if !self.token.is_empty() {
            builder = builder.bearer_auth(&self.token);
        }

        let res = builder.json(&req).send().await.map_err(|err| {
            tracing::error!(error = ?err, "REST chat request failed");
            return SendError::transport(err);
        })?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "REST chat request returned an error status"
            );
            return Err(SendError::transport(format!(
                "HTTP error status {}",
                res.status()
            )));
        }

        let body = res.text().await.map_err(SendError::transport)?;
        tracing::debug!(body = %body, "REST chat response");

        let parsed: RestChatResponse = serde_json::from_str(&body).map_err(|err| {
            return SendError::MalformedResponse(err.to_string());
        })?;

        let text = parsed
            .reply
            .filter(|text| return !text.is_empty())
            .or(parsed.message.filter(|text| return !text.is_empty()))
            .unwrap_or_else(|| return EMPTY_REPLY_FALLBACK.to_string());

        return Ok(ChatReply::new(&text));
    }
}
