use brock_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient, StreamEvent};
use futures::StreamExt;

fn client_for(server: &mockito::Server) -> OpenAIClient {
    OpenAIClient::new("sk-test").unwrap().with_base_url(server.url())
}

#[tokio::test]
async fn test_chat_stream_yields_text_and_tool_fragments() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"On it\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_a\",\"type\":\"function\",\"function\":{\"name\":\"fetch_goals\",\"arguments\":\"\"}}]},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{}\"}}]},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let request = ChatRequest::new("gpt-4o", vec![Message::human("goals?")]);
    let stream = client.chat_stream(request).await.unwrap();
    let events: Vec<StreamEvent> = stream.map(|e| e.unwrap()).collect().await;

    mock.assert_async().await;
    assert_eq!(events[0], StreamEvent::Message { content: "On it".to_string() });
    assert_eq!(
        events[1],
        StreamEvent::ToolCall {
            index: 0,
            id: Some("call_a".to_string()),
            name: Some("fetch_goals".to_string()),
            arguments: Some(String::new()),
        }
    );
    assert!(events[3].is_tool_calls_finish());
    assert_eq!(events.last(), Some(&StreamEvent::Done { finish_reason: None }));
}

#[tokio::test]
async fn test_chat_one_shot() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "max_tokens": 15
        })))
        .with_status(200)
        .with_body(r#"{
            "id": "c2",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "\"Leg Day Plan\""}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24}
        }"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let request = ChatRequest::new("gpt-4o-mini", vec![Message::human("title this")])
        .with_options(ChatOptions::new().max_tokens(15).temperature(0.2));
    let response = client.chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("\"Leg Day Plan\""));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 24);
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"rate limited"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let request = ChatRequest::new("gpt-4o", vec![Message::human("hi")]);

    let err = match client.chat_stream(request).await {
        Ok(_) => panic!("expected an error"),
        Err(e) => e,
    };
    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("rate limited"));
}
