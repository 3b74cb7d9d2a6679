use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::ModelRegistry;
use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::Provider;
use crate::domain::models::SendError;

struct ListingBackend {
    models: Option<Vec<AIModelDescriptor>>,
}

#[async_trait]
impl Backend for ListingBackend {
    fn name(&self) -> BackendName {
        return BackendName::GraphQL;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<AIModelDescriptor>> {
        if let Some(models) = &self.models {
            return Ok(models.clone());
        }

        bail!("connection refused");
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, _request: ChatRequest) -> Result<ChatReply, SendError> {
        return Err(SendError::transport("unused"));
    }
}

fn registry(models: Option<Vec<AIModelDescriptor>>) -> ModelRegistry {
    let backend: BackendBox = Box::new(ListingBackend { models });
    return ModelRegistry::new(Arc::new(backend));
}

#[tokio::test]
async fn it_lists_remote_models() {
    let remote = vec![AIModelDescriptor::new(
        "qwen-max",
        "Qwen Max",
        Provider::Other("alibaba".to_string()),
        "",
    )];

    let res = registry(Some(remote.clone())).list_models().await;
    assert_eq!(res, remote);
}

#[tokio::test]
async fn it_falls_back_when_listing_fails() {
    let res = registry(None).list_models().await;

    assert!(!res.is_empty());
    assert_eq!(res, ModelRegistry::default_models());
}

#[tokio::test]
async fn it_falls_back_when_listing_is_empty() {
    let res = registry(Some(vec![])).list_models().await;
    assert_eq!(res, ModelRegistry::default_models());
}

#[test]
fn it_has_default_models() {
    let ids = ModelRegistry::default_models()
        .iter()
        .map(|model| return model.id.to_string())
        .collect::<Vec<String>>();

    assert_eq!(ids, vec!["deepseek-chat", "deepseek-coder", "gpt-3.5-turbo"]);
}

#[test]
fn it_finds_models_by_id() {
    let models = ModelRegistry::default_models();

    let found = ModelRegistry::find(&models, "gpt-3.5-turbo").unwrap();
    assert_eq!(found.name, "GPT-3.5 Turbo");
    assert!(ModelRegistry::find(&models, "gpt-5").is_none());
}
