use anyhow::Result;

use super::generate_reply;
use super::Mock;
use super::DEEPSEEK_SUFFIX;
use super::SIMULATED_SUFFIX;
use crate::domain::models::Backend;
use crate::domain::models::ChatRequest;
use crate::domain::models::Usage;

#[test]
fn it_marks_deepseek_replies_as_balanced() {
    let reply = generate_reply("How do I sort?", "deepseek-coder");
    assert!(reply.ends_with(DEEPSEEK_SUFFIX));
}

#[test]
fn it_marks_other_replies_as_simulated() {
    let reply = generate_reply("How do I sort?", "gpt-4");
    assert!(reply.ends_with(SIMULATED_SUFFIX));
}

#[test]
fn it_uses_deepseek_chat_replies_for_unknown_models() {
    let reply = generate_reply("hello", "mystery-model");
    assert!(reply.ends_with(SIMULATED_SUFFIX));
    assert!(!reply.contains("GPT"));
}

#[tokio::test]
async fn it_replies_without_network() -> Result<()> {
    let backend = Mock::without_delay();
    let res = backend
        .send(ChatRequest::new("12345678", "deepseek-chat"))
        .await?;

    assert!(!res.text.is_empty());
    assert_eq!(
        res.usage,
        Some(Usage {
            prompt_tokens: 2,
            completion_tokens: 120,
            total_tokens: 122,
        })
    );

    return Ok(());
}

#[tokio::test]
async fn it_counts_other_completions() -> Result<()> {
    let backend = Mock::without_delay();
    let res = backend.send(ChatRequest::new("hi", "gpt-4")).await?;

    assert_eq!(res.usage.unwrap().completion_tokens, 150);

    return Ok(());
}

#[tokio::test]
async fn it_lists_mock_models() -> Result<()> {
    let backend = Mock::without_delay();
    let models = backend.list_models().await?;

    let ids = models
        .iter()
        .map(|model| return model.id.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(
        ids,
        vec!["deepseek-chat", "deepseek-coder", "gpt-3.5-turbo", "gpt-4"]
    );
    assert!(backend.health_check().await.is_ok());

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_delays_replies() -> Result<()> {
    let backend = Mock::default();
    let started = tokio::time::Instant::now();

    backend.send(ChatRequest::new("hi", "deepseek-chat")).await?;

    let elapsed = started.elapsed().as_millis();
    assert!((800..=2000).contains(&elapsed));

    return Ok(());
}
