//! Integration tests for the Anthropic extraction backend.

use alps_adapters::{AnthropicExtractor, RECORD_TOOL_NAME};
use alps_core::{ExtractionError, StructuredExtractor};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOCK: &str = "6.1 Trail Check-in\nAs a hiker, I want to check in.";

fn extractor(server: &MockServer) -> AnthropicExtractor {
    AnthropicExtractor::builder()
        .base_url(server.uri())
        .api_key("sk-test")
        .model("claude-test")
        .read_timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

fn tool_response(input: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "stop_reason": "tool_use",
        "content": [
            { "type": "text", "text": "Recording the subsection." },
            { "type": "tool_use", "id": "toolu_01", "name": RECORD_TOOL_NAME, "input": input }
        ]
    }))
}

// ==================== Success Tests ====================

#[tokio::test]
async fn test_extract_reads_tool_input() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "tool_choice": { "type": "tool", "name": RECORD_TOOL_NAME }
        })))
        .respond_with(tool_response(json!({
            "subsection_number": "6.1",
            "subsection_title": "Trail Check-in",
            "content": BLOCK,
            "user_story": "As a hiker, I want to check in.",
            "technical_description": "",
            "complexity": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = extractor(&server).extract(BLOCK).await.unwrap();

    assert_eq!(record.subsection_number, "6.1");
    assert_eq!(record.subsection_title, "Trail Check-in");
    assert_eq!(record.user_story, "As a hiker, I want to check in.");
    assert_eq!(record.complexity, None);
}

#[tokio::test]
async fn test_extract_tolerates_missing_optional_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(tool_response(json!({
            "subsection_number": "6.4",
            "subsection_title": "Sync"
        })))
        .mount(&server)
        .await;

    let record = extractor(&server).extract("6.4 Sync").await.unwrap();

    assert_eq!(record.subsection_number, "6.4");
    assert!(record.user_story.is_empty());
    assert!(record.technical_description.is_empty());
}

// ==================== Failure Tests ====================

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "type": "error",
            "error": { "type": "api_error", "message": "Internal server error" }
        })))
        .mount(&server)
        .await;

    let err = extractor(&server).extract(BLOCK).await.unwrap_err();

    assert_eq!(
        err,
        ExtractionError::Api {
            status: 500,
            message: "Internal server error".to_string()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_text_only_response_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stop_reason": "end_turn",
            "content": [{ "type": "text", "text": "Here is the data: ..." }]
        })))
        .mount(&server)
        .await;

    let err = extractor(&server).extract(BLOCK).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Malformed(_)));
}

#[tokio::test]
async fn test_tool_input_with_wrong_shape_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(tool_response(json!({ "subsection_number": 6.1 })))
        .mount(&server)
        .await;

    let err = extractor(&server).extract(BLOCK).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            tool_response(json!({ "subsection_number": "6.1", "subsection_title": "x" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = extractor(&server).extract(BLOCK).await.unwrap_err();
    assert_eq!(err, ExtractionError::Timeout(Duration::from_millis(500)));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let extractor = AnthropicExtractor::builder()
        .base_url("http://127.0.0.1:9")
        .api_key("sk-test")
        .connect_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = extractor.extract(BLOCK).await.unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::Transport(_) | ExtractionError::Timeout(_)
    ));
}
