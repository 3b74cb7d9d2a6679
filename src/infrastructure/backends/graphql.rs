#[cfg(test)]
#[path = "graphql_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::SendError;
use crate::domain::models::TuningProfile;
use crate::domain::models::Usage;
use crate::domain::models::EMPTY_REPLY_FALLBACK;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_millis(1000);

pub const CHAT_MUTATION: &str = r#"
  mutation SendMessage($input: ChatInput!) {
    sendMessage(input: $input) {
      success
      reply
      error
      usage {
        promptTokens
        completionTokens
        totalTokens
      }
    }
  }
"#;

pub const MODELS_QUERY: &str = r#"
  query GetModels {
    models {
      id
      name
      provider
      description
    }
  }
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GraphQLRequest<V> {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<V>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatInput {
    message: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SendMessageVariables {
    input: ChatInput,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GraphQLError {
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// Token counts may be fractional estimates.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageResponse {
    #[serde(default)]
    prompt_tokens: f64,
    #[serde(default)]
    completion_tokens: f64,
    #[serde(default)]
    total_tokens: f64,
}

impl UsageResponse {
    fn to_usage(&self) -> Usage {
        return Usage {
            prompt_tokens: self.prompt_tokens.round() as u32,
            completion_tokens: self.completion_tokens.round() as u32,
            total_tokens: self.total_tokens.round() as u32,
        };
    }
}

/// Usage is optional metadata. A block that doesn't parse is dropped rather
/// than failing the reply.
fn lenient_usage<'de, D>(deserializer: D) -> Result<Option<UsageResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let usage = value.and_then(|value| {
        return serde_json::from_value::<UsageResponse>(value)
            .map_err(|err| {
                tracing::warn!(error = ?err, "Ignoring unreadable usage");
                return err;
            })
            .ok();
    });

    return Ok(usage);
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    success: bool,
    reply: Option<String>,
    error: Option<String>,
    #[serde(default, deserialize_with = "lenient_usage")]
    usage: Option<UsageResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageData {
    send_message: Option<SendMessageResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelsData {
    models: Option<Vec<AIModelDescriptor>>,
}

/// Talks to the chat service's GraphQL endpoint. Every call is a single POST
/// to the same URL.
pub struct GraphQL {
    url: String,
    client: reqwest::Client,
}

impl GraphQL {
    pub fn new(url: &str) -> GraphQL {
        return GraphQL {
            url: url.to_string(),
            client: reqwest::Client::new(),
        };
    }

    async fn execute<V, T>(&self, query: &str, variables: Option<V>) -> Result<T, SendError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let req = GraphQLRequest {
            query: query.to_string(),
            variables,
        };

        let res = self
            .client
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, url = %self.url, "GraphQL request failed");
                return SendError::transport(err);
            })?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "GraphQL request returned an error status");
            return Err(SendError::transport(format!("HTTP error status {status}")));
        }

        let body = res.text().await.map_err(SendError::transport)?;
        tracing::debug!(body = %body, "GraphQL response");

        let parsed: GraphQLResponse<T> = serde_json::from_str(&body).map_err(|err| {
            return SendError::MalformedResponse(err.to_string());
        })?;

        if let Some(first) = parsed.errors.unwrap_or_default().into_iter().next() {
            let message = first.message.unwrap_or_else(|| return "GraphQL error".to_string());
            return Err(SendError::Remote(message));
        }

        return parsed
            .data
            .ok_or_else(|| return SendError::MalformedResponse("missing data".to_string()));
    }
}

#[async_trait]
impl Backend for GraphQL {
    fn name(&self) -> BackendName {
        return BackendName::GraphQL;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("GraphQL URL is not defined");
        }

        // GraphQL servers commonly reject a bare GET, so any response at all
        // counts as reachable.
        let res = self
            .client
            .get(&self.url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        if let Err(err) = res {
            tracing::error!(error = ?err, "GraphQL endpoint is not reachable");
            bail!("GraphQL endpoint {} is not reachable", self.url);
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<AIModelDescriptor>> {
        let data: ModelsData = self.execute::<(), _>(MODELS_QUERY, None).await?;
        if let Some(models) = data.models {
            return Ok(models);
        }

        bail!("GraphQL response is missing models");
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: ChatRequest) -> Result<ChatReply, SendError> {
        let tuning = request.tuned();
        tracing::debug!(
            model = %request.model,
            profile = TuningProfile::for_model(&request.model).name,
            temperature = tuning.temperature,
            max_tokens = tuning.max_tokens,
            length = request.message.chars().count(),
            "Sending message"
        );

        let variables = SendMessageVariables {
            input: ChatInput {
                message: request.message,
                model: request.model,
                temperature: tuning.temperature,
                max_tokens: tuning.max_tokens,
            },
        };

        let data: SendMessageData = self.execute(CHAT_MUTATION, Some(variables)).await?;
        let payload = data.send_message.ok_or_else(|| {
            return SendError::MalformedResponse("missing sendMessage".to_string());
        })?;

        if !payload.success {
            let message = payload
                .error
                .filter(|err| return !err.is_empty())
                .unwrap_or_else(|| return "Unknown error".to_string());
            return Err(SendError::Remote(message));
        }

        let mut text = payload.reply.unwrap_or_default();
        if text.is_empty() {
            text = EMPTY_REPLY_FALLBACK.to_string();
        }

        return Ok(ChatReply {
            text,
            usage: payload.usage.map(|usage| return usage.to_usage()),
        });
    }
}
