use pretty_assertions::assert_eq;
use serde_json::json;
use waldo_core::SessionId;
use waldo_engine::{ClientSettings, FailureKind, JobSubmitter, ReqwestJobSubmitter};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submitter(server: &MockServer) -> ReqwestJobSubmitter {
    ReqwestJobSubmitter::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn submission_returns_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .and(body_json(json!({"input": "https://news.example.com/story"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "session_id": "abc",
            "status": "accepted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = submitter(&server)
        .submit("https://news.example.com/story")
        .await
        .unwrap();

    assert_eq!(session, SessionId::from("abc"));
}

#[tokio::test]
async fn http_429_is_rate_limited_with_header_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_json(json!({"error_code": "RATE_LIMIT_EXCEEDED", "retry_after": 60})),
        )
        .mount(&server)
        .await;

    let err = submitter(&server).submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::RateLimited { retry_after_secs: 30 });
    assert!(err.message.contains("30 seconds"));
}

#[tokio::test]
async fn rate_limit_error_code_uses_body_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error_code": "RATE_LIMIT_EXCEEDED",
            "message": "API rate limit exceeded.",
            "retry_after": 15
        })))
        .mount(&server)
        .await;

    let err = submitter(&server).submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::RateLimited { retry_after_secs: 15 });
}

#[tokio::test]
async fn structured_error_message_is_preferred() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error_code": "URL_EXTRACTION_FAILED",
            "message": "Failed to extract content from URL",
            "details": "dns error"
        })))
        .mount(&server)
        .await;

    let err = submitter(&server).submit("https://bad.example").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(422));
    assert_eq!(err.message, "Failed to extract content from URL");
}

#[tokio::test]
async fn missing_session_id_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = submitter(&server).submit("text").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}
