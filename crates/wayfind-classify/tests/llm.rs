//! Integration tests for `LlmClient` against a wiremock chat-completions
//! endpoint.

use wayfind_classify::{ClassifyError, GenerateOptions, LlmClient, TextGenerator};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options() -> GenerateOptions {
    GenerateOptions {
        temperature: 0.1,
        max_tokens: 256,
        json_format: true,
    }
}

#[tokio::test]
async fn generate_returns_message_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": "{\"intent\":\"find-nearest\"}" }
            }]
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), None, "test-model", 5).expect("client");
    let reply = client
        .generate("classify this", &options())
        .await
        .expect("should return content");
    assert!(reply.contains("find-nearest"));
}

#[tokio::test]
async fn generate_sends_bearer_auth_when_key_present() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), Some("sk-test"), "test-model", 5).expect("client");
    let reply = client.generate("hi", &options()).await.expect("authorized");
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn empty_content_is_unusable_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), None, "test-model", 5).expect("client");
    let err = client.generate("hi", &options()).await.unwrap_err();
    assert!(matches!(err, ClassifyError::UnusableReply(_)));
}

#[tokio::test]
async fn http_error_surfaces_as_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), None, "test-model", 5).expect("client");
    let err = client.generate("hi", &options()).await.unwrap_err();
    match err {
        ClassifyError::ApiError(message) => assert!(message.contains("429"), "got: {message}"),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}
