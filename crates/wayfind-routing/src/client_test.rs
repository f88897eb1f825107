use super::*;

#[test]
fn with_base_url_rejects_garbage() {
    let result = RoutingClient::with_base_url(None, 30, "wayfind/test", "not a url");
    assert!(matches!(result, Err(RoutingError::ApiError(_))));
}

#[test]
fn extract_error_message_reads_nested_envelope() {
    let status = reqwest::StatusCode::NOT_FOUND;
    let message = extract_error_message(
        r#"{"error":{"code":2010,"message":"Could not find point"}}"#,
        status,
    );
    assert!(message.contains("Could not find point"), "got: {message}");
}

#[test]
fn extract_error_message_reads_flat_error_string() {
    let status = reqwest::StatusCode::BAD_REQUEST;
    let message = extract_error_message(r#"{"error":"bad profile"}"#, status);
    assert!(message.contains("bad profile"));
}

#[test]
fn extract_error_message_falls_back_to_body() {
    let status = reqwest::StatusCode::BAD_REQUEST;
    let message = extract_error_message("plain text failure", status);
    assert!(message.contains("plain text failure"));
}

#[test]
fn extract_error_message_falls_back_to_status() {
    let status = reqwest::StatusCode::FORBIDDEN;
    let message = extract_error_message("", status);
    assert!(message.contains("403"));
}
