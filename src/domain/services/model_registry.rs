#[cfg(test)]
#[path = "model_registry_test.rs"]
mod tests;

use std::sync::Arc;

use crate::domain::models::AIModelDescriptor;
use crate::domain::models::BackendBox;
use crate::domain::models::Provider;

/// Lists the models a chat box can pick from. Model selection isn't critical,
/// so failures are logged and replaced with a built-in list.
#[derive(Clone)]
pub struct ModelRegistry {
    backend: Arc<BackendBox>,
}

impl ModelRegistry {
    pub fn new(backend: Arc<BackendBox>) -> ModelRegistry {
        return ModelRegistry { backend };
    }

    pub fn default_models() -> Vec<AIModelDescriptor> {
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
        ];
    }

    pub async fn list_models(&self) -> Vec<AIModelDescriptor> {
        match self.backend.list_models().await {
            Ok(models) if !models.is_empty() => {
                return models;
            }
            Ok(_) => {
                tracing::warn!(
                    backend = %self.backend.name(),
                    "Model list was empty, using defaults"
                );
            }
            Err(err) => {
                tracing::warn!(
                    backend = %self.backend.name(),
                    error = ?err,
                    "Failed to list models, using defaults"
                );
            }
        }

        return ModelRegistry::default_models();
    }

    pub fn find<'a>(models: &'a [AIModelDescriptor], id: &str) -> Option<&'a AIModelDescriptor> {
        return models.iter().find(|model| return model.id == id);
    }
}
