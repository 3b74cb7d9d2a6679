use anyhow::Result;

use super::AIModelDescriptor;
use super::Provider;

#[test]
fn it_parses_known_providers() {
    assert_eq!(Provider::from("openai".to_string()), Provider::OpenAI);
    assert_eq!(Provider::from("deepseek".to_string()), Provider::DeepSeek);
}

#[test]
fn it_keeps_unknown_providers() {
    let provider = Provider::from("alibaba".to_string());
    assert_eq!(provider, Provider::Other("alibaba".to_string()));
    assert_eq!(provider.to_string(), "alibaba");
}

#[test]
fn it_deserializes_descriptors() -> Result<()> {
    let models: Vec<AIModelDescriptor> = serde_json::from_str(
        r#"[
            {"id": "gpt-4", "name": "GPT-4", "provider": "openai"},
            {"id": "deepseek-coder", "name": "DeepSeek Coder", "provider": "deepseek", "description": "Code model"}
        ]"#,
    )?;

    assert_eq!(models[0].provider, Provider::OpenAI);
    assert_eq!(models[0].description, None);
    assert_eq!(models[1].provider, Provider::DeepSeek);
    assert_eq!(models[1].description, Some("Code model".to_string()));

    return Ok(());
}

#[test]
fn it_serializes_provider_as_string() -> Result<()> {
    let model = AIModelDescriptor::new("gpt-4", "GPT-4", Provider::OpenAI, "");
    let json = serde_json::to_string(&model)?;
    assert_eq!(json, r#"{"id":"gpt-4","name":"GPT-4","provider":"openai"}"#);

    return Ok(());
}
