//! Integration tests for the thinkstream client and chat session.
//! These tests run the real HTTP client against a local mock server.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use thinkstream::chat::{ChatConfig, ChatSession, LineOutcome};
    use thinkstream::{
        ChatCompletionRequest, ChatMessage, ChunkStream, Error, OpenAi, PlainTextRenderer,
    };

    fn sse(frames: &[serde_json::Value]) -> String {
        let mut body = String::new();
        for frame in frames {
            body.push_str(&format!("data: {frame}\n\n"));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn reasoning(text: &str) -> serde_json::Value {
        json!({"id": "c1", "choices": [{"index": 0, "delta": {"reasoning_content": text}}]})
    }

    fn content(text: &str) -> serde_json::Value {
        json!({"id": "c1", "choices": [{"index": 0, "delta": {"content": text}}]})
    }

    fn streaming(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
    }

    async fn chat(server: &MockServer, config: ChatConfig, line: &str) -> (LineOutcome, String) {
        let client = OpenAi::new("sk-test", format!("{}/v1", server.uri())).unwrap();
        let mut session = ChatSession::new(client, config);
        let mut renderer = PlainTextRenderer::with_writer(Vec::new());
        let outcome = session.handle_line(line, &mut renderer).await;
        (outcome, String::from_utf8(renderer.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn reasoning_then_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "deepseek-r1", "stream": true})))
            .respond_with(streaming(sse(&[
                reasoning("Let me "),
                reasoning("think."),
                json!({"choices": [{"index": 0, "delta": {"content": "", "reasoning_content": ""}}]}),
                content("Hello"),
                content(" there."),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (outcome, out) = chat(&server, ChatConfig::new(), "hi").await;
        assert_eq!(outcome, LineOutcome::Answered);
        assert_eq!(
            out,
            "====thinking===\nLet me think.\n====result content===\nHello there.\n"
        );
    }

    #[tokio::test]
    async fn answer_only_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(streaming(sse(&[content("hello")])))
            .mount(&server)
            .await;

        let (_, out) = chat(&server, ChatConfig::new(), "hi").await;
        assert_eq!(out, "hello\n");
    }

    #[tokio::test]
    async fn verbose_requests_and_prints_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(
                json!({"stream_options": {"include_usage": true}}),
            ))
            .respond_with(streaming(sse(&[
                content("x"),
                json!({"choices": [], "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}}),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let config = ChatConfig::new().with_verbose(true);
        let (_, out) = chat(&server, config, "hi").await;
        assert_eq!(
            out,
            "x\n\nPromptTokens: 10, CompletionTokens: 20, Total: 30\n"
        );
    }

    #[tokio::test]
    async fn empty_key_sends_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(streaming(sse(&[content("ok")])))
            .mount(&server)
            .await;

        let client = OpenAi::new("", format!("{}/v1/", server.uri())).unwrap();
        let request = ChatCompletionRequest::new("m", vec![ChatMessage::user("hi")]);
        let mut stream = client.stream_chat(&request).await.unwrap();
        while stream.recv().await.unwrap().is_some() {}
        stream.close();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
        assert_eq!(
            requests[0].headers.get("accept").unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn open_error_is_reported_and_turn_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let (outcome, out) = chat(&server, ChatConfig::new(), "hi").await;
        assert_eq!(outcome, LineOutcome::Failed);
        assert_eq!(
            out,
            "ChatCompletionStream error: Authentication error: Incorrect API key provided\n"
        );
    }

    #[tokio::test]
    async fn in_band_error_ends_the_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(streaming(sse(&[
                content("par"),
                json!({"error": {"message": "overloaded", "type": "server_error"}}),
            ])))
            .mount(&server)
            .await;

        let (outcome, out) = chat(&server, ChatConfig::new(), "hi").await;
        assert_eq!(outcome, LineOutcome::Failed);
        assert_eq!(out, "par\nStream error: server_error: overloaded\n");
    }

    #[tokio::test]
    async fn json_error_body_with_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "model not available", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let (outcome, out) = chat(&server, ChatConfig::new(), "hi").await;
        assert_eq!(outcome, LineOutcome::Failed);
        assert_eq!(
            out,
            "\nStream error: invalid_request_error: model not available\n"
        );
    }

    async fn open_error(response: ResponseTemplate) -> Error {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(response)
            .mount(&server)
            .await;

        let client = OpenAi::new("sk-test", format!("{}/v1", server.uri())).unwrap();
        let request = ChatCompletionRequest::new("m", vec![ChatMessage::user("hi")]);
        client.stream_chat(&request).await.unwrap_err()
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let err = open_error(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "bad model", "param": "model"}
        })))
        .await;
        assert!(matches!(err, Error::BadRequest { ref param, .. } if param.as_deref() == Some("model")));

        let err = open_error(ResponseTemplate::new(404).set_body_string("no such route")).await;
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Resource not found: no such route");

        let err = open_error(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .await;
        assert!(matches!(err, Error::RateLimit { retry_after: Some(7), .. }));

        let err = open_error(
            ResponseTemplate::new(500)
                .insert_header("x-request-id", "req-1")
                .set_body_string("boom"),
        )
        .await;
        assert_eq!(err.request_id(), Some("req-1"));

        let err = open_error(ResponseTemplate::new(503).set_body_string("busy")).await;
        assert!(matches!(err, Error::ServiceUnavailable { .. }));
        assert!(err.is_server_error());

        let err = open_error(ResponseTemplate::new(418).set_body_json(json!({
            "error": {"message": "short and stout", "type": "teapot"}
        })))
        .await;
        assert_eq!(err.status_code(), Some(418));
        assert_eq!(err.to_string(), "teapot: short and stout");
    }

    #[tokio::test]
    async fn connection_refused() {
        // Nothing listens on port 1.
        let client = OpenAi::new("", "http://127.0.0.1:1/v1").unwrap();
        let request = ChatCompletionRequest::new("m", vec![ChatMessage::user("hi")]);
        let err = client.stream_chat(&request).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {"id": "deepseek-r1", "object": "model", "created": 1700000000, "owned_by": "deepseek", "context_window": 65536},
                    {"id": "tiny", "object": "model", "created": 1, "owned_by": "me"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAi::new("sk-test", format!("{}/v1", server.uri())).unwrap();
        let models = client.list_models().await.unwrap();
        let lines: Vec<String> = models.models().iter().map(|m| m.summary()).collect();
        assert_eq!(
            lines,
            vec![
                "deepseek-r1 (model) created 1700000000 owner(deepseek) Window(65536)",
                "tiny (model) created 1 owner(me) Window(0)",
            ]
        );
    }

    #[tokio::test]
    async fn list_models_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"message": "forbidden"}
            })))
            .mount(&server)
            .await;

        let client = OpenAi::new("sk-test", format!("{}/v1", server.uri())).unwrap();
        let err = client.list_models().await.unwrap_err();
        assert_eq!(err.to_string(), "Permission error: forbidden");
    }
}
