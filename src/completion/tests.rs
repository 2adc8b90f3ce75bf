use super::*;
use crate::config::MarkerConfig;
use crate::MessageRole;
use serde_json::json;

#[test]
fn test_request_starts_with_system_prompt() {
    let config = ChatConfig::default();
    let request = CompletionRequest::new(&config);

    assert_eq!(request.model, "gpt-4");
    assert!(request.stream);
    assert_eq!(request.messages().len(), 1);
    assert_eq!(request.messages()[0].role, MessageRole::System);
    assert!(request.messages()[0].content.contains("Reasoning: [your step-by-step thinking]"));
    assert!(request.messages()[0].content.contains("Answer: [your final answer]"));
}

#[test]
fn test_history_is_normalized_and_activity_dropped() {
    let history = vec![
        InboundMessage::new("user", "What is 2+2?"),
        InboundMessage::new("activity", "typing..."),
        InboundMessage::new("assistant", "4"),
        InboundMessage::new("developer", "Answer in French."),
    ];
    let request = CompletionRequest::new(&ChatConfig::default()).with_history(&history);

    let roles: Vec<MessageRole> = request.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::System,
        ]
    );
    assert_eq!(request.messages()[3].content, "Answer in French.");
}

#[test]
fn test_request_json_body() {
    let mut request = CompletionRequest::new(&ChatConfig {
        model: "gpt-4o-mini".to_string(),
        markers: MarkerConfig::new("Thinking:", "Final:"),
        system_prompt: None,
    });
    request.push(CompletionMessage::user("hello"));

    let body = request.to_json().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["stream"], true);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("Final:"));
    assert_eq!(body["messages"][1], json!({"role": "user", "content": "hello"}));
}

#[test]
fn test_chatml_rendering() {
    let mut request = CompletionRequest::new(&ChatConfig {
        system_prompt: Some("Be brief.".to_string()),
        ..ChatConfig::default()
    });
    request.push(CompletionMessage::user("Hi"));

    assert_eq!(
        request.to_chatml_string(),
        "<|im_start|>system\nBe brief.\n<|im_end|>\n<|im_start|>user\nHi\n<|im_end|>"
    );
}

#[test]
fn test_token_estimate_grows_with_history() {
    let base = CompletionRequest::new(&ChatConfig::default());
    let longer = base
        .clone()
        .with_history(&[InboundMessage::new("user", "Tell me about the weather in Paris today.")]);

    let base_tokens = base.estimate_prompt_tokens().unwrap();
    let longer_tokens = longer.estimate_prompt_tokens().unwrap();
    assert!(base_tokens > 0);
    assert!(longer_tokens > base_tokens);
}

#[test]
fn test_parse_content_line() {
    let line = r#"data: {"choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
    assert_eq!(
        parse_sse_line(line).unwrap(),
        Some(ChunkDelta::Content("Hello".to_string()))
    );
}

#[test]
fn test_parse_done_line() {
    assert_eq!(parse_sse_line("data: [DONE]").unwrap(), Some(ChunkDelta::Done));
    assert_eq!(parse_sse_line("data:[DONE]\n").unwrap(), Some(ChunkDelta::Done));
}

#[test]
fn test_lines_without_text_are_skipped() {
    assert_eq!(parse_sse_line("").unwrap(), None);
    assert_eq!(parse_sse_line(": keep-alive").unwrap(), None);
    assert_eq!(parse_sse_line("event: message").unwrap(), None);
    assert_eq!(
        parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
        None
    );
    assert_eq!(
        parse_sse_line(r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap(),
        None
    );
    assert_eq!(
        parse_sse_line(r#"data: {"choices":[{"delta":{"content":""}}]}"#).unwrap(),
        None
    );
}

#[test]
fn test_malformed_chunk_is_an_error() {
    assert!(matches!(
        parse_sse_line("data: {not json"),
        Err(Error::MalformedChunk(_))
    ));
}

#[test]
fn test_chunk_content_ignores_missing_choices() {
    assert_eq!(chunk_content(&json!({"id": "x"})), None);
    assert_eq!(chunk_content(&json!({"choices": []})), None);
}

#[cfg(feature = "streaming")]
mod async_stream {
    use super::*;
    use crate::streaming::{classify_stream, LifecycleEvent};
    use futures_util::stream::{self, StreamExt};

    fn line(content: &str) -> std::result::Result<String, Error> {
        Ok(format!(
            "data: {}",
            json!({"choices": [{"index": 0, "delta": {"content": content}}]})
        ))
    }

    #[tokio::test]
    async fn test_content_deltas_stop_at_done() {
        let lines = stream::iter(vec![
            Ok(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#.to_string()),
            line("Reasoning: "),
            Ok(String::new()),
            line("yes. Answer: "),
            line("ok"),
            Ok("data: [DONE]".to_string()),
            line("ignored"),
        ]);

        let deltas: Vec<String> = content_deltas(lines).map(|d| d.unwrap()).collect().await;
        assert_eq!(deltas, vec!["Reasoning: ", "yes. Answer: ", "ok"]);
    }

    #[tokio::test]
    async fn test_malformed_chunk_ends_stream() {
        let lines = stream::iter(vec![line("a"), Ok("data: {oops".to_string()), line("b")]);

        let items: Vec<_> = content_deltas(lines).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().ok(), Some("a"));
        assert!(matches!(items[1], Err(Error::MalformedChunk(_))));
    }

    #[tokio::test]
    async fn test_sse_lines_through_classifier() {
        let lines = stream::iter(vec![
            line("Reason"),
            line("ing: carry the one."),
            line(" Answ"),
            line("er: 12"),
            Ok("data: [DONE]".to_string()),
        ]);

        let deltas = content_deltas(lines);
        futures_util::pin_mut!(deltas);
        let events: Vec<LifecycleEvent> = classify_stream(deltas, MarkerConfig::default())
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert!(events.contains(&LifecycleEvent::ReasoningDelta("carry the one.".to_string())));
        assert!(events.contains(&LifecycleEvent::AnswerDelta("12".to_string())));
        assert_eq!(events.last(), Some(&LifecycleEvent::ResponseComplete));
    }
}
