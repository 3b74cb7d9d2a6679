pub fn send_message_fixture() -> &'static str {
    return r#"
{
  "data": {
    "sendMessage": {
      "success": true,
      "reply": "Hello! DeepSeek here, how can I help?",
      "error": null,
      "usage": {
        "promptTokens": 12,
        "completionTokens": 9,
        "totalTokens": 21
      }
    }
  }
}
"#
    .trim();
}

pub fn send_message_failure_fixture() -> &'static str {
    return r#"
{
  "data": {
    "sendMessage": {
      "success": false,
      "reply": null,
      "error": "rate limited",
      "usage": null
    }
  }
}
"#
    .trim();
}

pub fn models_fixture() -> &'static str {
    return r#"
{
  "data": {
    "models": [
      { "id": "deepseek-chat", "name": "DeepSeek Chat", "provider": "deepseek", "description": "DeepSeek conversation model" },
      { "id": "gpt-4", "name": "GPT-4", "provider": "openai" },
      { "id": "qwen-max", "name": "Qwen Max", "provider": "alibaba", "description": null }
    ]
  }
}
"#
    .trim();
}
