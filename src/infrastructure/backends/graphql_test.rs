use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::models_fixture;
use test_utils::send_message_failure_fixture;
use test_utils::send_message_fixture;

use super::GraphQL;
use crate::domain::models::Backend;
use crate::domain::models::ChatRequest;
use crate::domain::models::Provider;
use crate::domain::models::SendError;
use crate::domain::models::Usage;
use crate::domain::models::EMPTY_REPLY_FALLBACK;

async fn server() -> (mockito::ServerGuard, GraphQL) {
    let server = mockito::Server::new_async().await;
    let backend = GraphQL::new(&format!("{}/graphql", server.url()));
    return (server, backend);
}

#[tokio::test]
async fn it_sends_messages() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "variables": {
                "input": {
                    "message": "Hi there",
                    "model": "deepseek-chat",
                    "temperature": 0.4,
                    "maxTokens": 800
                }
            }
        })))
        .with_status(200)
        .with_body(send_message_fixture())
        .create_async()
        .await;

    let res = backend
        .send(ChatRequest::new("Hi there", "deepseek-chat"))
        .await?;
    mock.assert_async().await;

    assert_eq!(res.text, "Hello! DeepSeek here, how can I help?");
    assert_eq!(
        res.usage,
        Some(Usage {
            prompt_tokens: 12,
            completion_tokens: 9,
            total_tokens: 21,
        })
    );

    return Ok(());
}

#[tokio::test]
async fn it_sends_the_chat_mutation() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex("mutation SendMessage".to_string()))
        .with_status(200)
        .with_body(send_message_fixture())
        .create_async()
        .await;

    backend
        .send(ChatRequest {
            temperature: Some(0.5),
            max_tokens: Some(10),
            ..ChatRequest::new("Hi there", "gpt-4")
        })
        .await?;
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_on_empty_replies() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":{"sendMessage":{"success":true,"reply":"","error":null}}}"#)
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await?;
    mock.assert_async().await;

    assert_eq!(res.text, EMPTY_REPLY_FALLBACK);
    assert_eq!(res.usage, None);

    return Ok(());
}

#[tokio::test]
async fn it_accepts_null_errors() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(
            r#"{"data":{"sendMessage":{"success":true,"reply":"hi","error":null,"usage":null}},"errors":null}"#,
        )
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await?;
    mock.assert_async().await;

    assert_eq!(res.text, "hi");
    assert_eq!(res.usage, None);

    return Ok(());
}

#[tokio::test]
async fn it_rounds_fractional_usage() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(
            r#"{"data":{"sendMessage":{"success":true,"reply":"hi","error":null,"usage":{"promptTokens":0.25,"completionTokens":3.6,"totalTokens":3.85}}}}"#,
        )
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await?;
    mock.assert_async().await;

    assert_eq!(res.text, "hi");
    assert_eq!(
        res.usage,
        Some(Usage {
            prompt_tokens: 0,
            completion_tokens: 4,
            total_tokens: 4,
        })
    );

    return Ok(());
}

#[tokio::test]
async fn it_ignores_unreadable_usage() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(
            r#"{"data":{"sendMessage":{"success":true,"reply":"hi","error":null,"usage":{"promptTokens":"lots"}}}}"#,
        )
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await?;
    mock.assert_async().await;

    assert_eq!(res.text, "hi");
    assert_eq!(res.usage, None);

    return Ok(());
}

#[tokio::test]
async fn it_reports_remote_failures() {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(send_message_failure_fixture())
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    mock.assert_async().await;

    assert_eq!(res, Err(SendError::Remote("rate limited".to_string())));
}

#[tokio::test]
async fn it_reports_unknown_remote_failures() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":{"sendMessage":{"success":false}}}"#)
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    assert_eq!(res, Err(SendError::Remote("Unknown error".to_string())));
}

#[tokio::test]
async fn it_reports_graphql_errors() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":null,"errors":[{"message":"Unknown model"}]}"#)
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-9")).await;
    assert_eq!(res, Err(SendError::Remote("Unknown model".to_string())));
}

#[tokio::test]
async fn it_reports_http_errors_as_transport_failures() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(502)
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    assert!(matches!(res, Err(SendError::Transport { .. })));
    assert_eq!(
        res.unwrap_err().to_string(),
        "Network request failed, please check your connection."
    );
}

#[tokio::test]
async fn it_reports_unreachable_servers_as_transport_failures() {
    let backend = GraphQL::new("http://127.0.0.1:1/graphql");

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    assert!(matches!(res, Err(SendError::Transport { .. })));
}

#[tokio::test]
async fn it_reports_malformed_payloads() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    assert!(matches!(res, Err(SendError::MalformedResponse(_))));
}

#[tokio::test]
async fn it_reports_missing_payloads() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":{}}"#)
        .create_async()
        .await;

    let res = backend.send(ChatRequest::new("Hi", "gpt-4")).await;
    assert_eq!(
        res,
        Err(SendError::MalformedResponse(
            "missing sendMessage".to_string()
        ))
    );
}

#[tokio::test]
async fn it_lists_models() -> Result<()> {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex("query GetModels".to_string()))
        .with_status(200)
        .with_body(models_fixture())
        .create_async()
        .await;

    let res = backend.list_models().await?;
    mock.assert_async().await;

    assert_eq!(res.len(), 3);
    assert_eq!(res[0].id, "deepseek-chat");
    assert_eq!(res[0].provider, Provider::DeepSeek);
    assert_eq!(res[1].description, None);
    assert_eq!(res[2].provider, Provider::Other("alibaba".to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_fails_listing_models_without_models() {
    let (mut server, backend) = server().await;
    server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":{"models":null}}"#)
        .create_async()
        .await;

    assert!(backend.list_models().await.is_err());
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let (mut server, backend) = server().await;
    let mock = server
        .mock("GET", "/graphql")
        .with_status(405)
        .create_async()
        .await;

    assert!(backend.health_check().await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks_without_url() {
    let backend = GraphQL::new("");
    assert!(backend.health_check().await.is_err());
}
