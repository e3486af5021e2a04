//! # Contract Tests for the Upstream HTTP Clients
//!
//! Runs [`HttpCompatibilityClient`] and [`ElevenLabsClient`] against
//! wiremock servers to pin request construction and failure
//! classification.
//!
//! | Client | Method | Path |
//! |--------|--------|------|
//! | compatibility | POST | `/api/v1/activity-compatibility/validate` |
//! | speech | POST | `/v1/text-to-speech/{voice_id}` |

use std::time::Duration;

use polaris_client::{
    CompatibilityConfig, CompatibilityService, ElevenLabsClient, HttpCompatibilityClient,
    SpeechConfig, SpeechSynthesizer, UpstreamError,
};
use polaris_core::{CompatibilityRequest, FromJsonPayload, NarrationDefaults, NarrationRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALIDATE: &str = "/api/v1/activity-compatibility/validate";

fn compatibility_client(server: &MockServer, timeout_secs: u64) -> HttpCompatibilityClient {
    let mut config = CompatibilityConfig::new(server.uri().parse().unwrap());
    config.timeout_secs = timeout_secs;
    HttpCompatibilityClient::new(config).expect("client build")
}

fn request() -> CompatibilityRequest {
    CompatibilityRequest::from_json(&json!({
        "trade_name": "Layla's Kitchen",
        "business_activities": ["Full-service restaurant", "Charcoal BBQ"],
        "language": "english",
        "threshold": 0.8
    }))
    .expect("valid request")
}

// ── Compatibility client ─────────────────────────────────────────────

#[tokio::test]
async fn compatibility_forwards_payload_and_returns_body_verbatim() {
    let server = MockServer::start().await;
    let upstream = json!({
        "trade_name": "Layla's Kitchen",
        "language": "english",
        "results": [],
        "total_activities": 0,
        "extra_field": {"kept": true}
    });

    Mock::given(method("POST"))
        .and(path(VALIDATE))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "trade_name": "Layla's Kitchen",
            "business_activities": ["Full-service restaurant", "Charcoal BBQ"],
            "language": "english",
            "threshold": 0.8
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let body = compatibility_client(&server, 5)
        .validate(&request())
        .await
        .expect("upstream ok");
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn compatibility_5xx_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VALIDATE))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = compatibility_client(&server, 5)
        .validate(&request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn compatibility_422_keeps_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VALIDATE))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "Unsupported embedding model"})),
        )
        .mount(&server)
        .await;

    let err = compatibility_client(&server, 5)
        .validate(&request())
        .await
        .unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(err.detail(), "Unsupported embedding model");
}

#[tokio::test]
async fn compatibility_non_json_success_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VALIDATE))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = compatibility_client(&server, 5)
        .validate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Malformed { .. }));
}

#[tokio::test]
async fn compatibility_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VALIDATE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = compatibility_client(&server, 1)
        .validate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout { elapsed_ms: 1000, .. }));
}

#[tokio::test]
async fn compatibility_unreachable_is_transport() {
    // Port 1 (tcpmux) is not served on test hosts.
    let client =
        HttpCompatibilityClient::new(CompatibilityConfig::new("http://127.0.0.1:1".parse().unwrap()))
            .expect("client build");

    let err = client.validate(&request()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { .. }));
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn compatibility_base_url_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scorer/api/v1/activity-compatibility/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/scorer/", server.uri());
    let client = HttpCompatibilityClient::new(CompatibilityConfig::new(base.parse().unwrap()))
        .expect("client build");
    assert_eq!(client.validate(&request()).await.unwrap(), json!({"ok": true}));
}

// ── Speech client ────────────────────────────────────────────────────

fn speech_client(server: &MockServer) -> ElevenLabsClient {
    let config = SpeechConfig::new(server.uri().parse().unwrap(), "test-xi-key");
    ElevenLabsClient::new(config).expect("client build")
}

fn narration(body: serde_json::Value) -> polaris_core::ResolvedNarration {
    NarrationRequest::from_json(&body)
        .expect("valid narration")
        .resolve(&NarrationDefaults::default())
}

#[tokio::test]
async fn speech_sends_provider_request_and_returns_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"))
        .and(header("xi-api-key", "test-xi-key"))
        .and(header("accept", "audio/mpeg"))
        .and(body_json(json!({
            "text": "Welcome to Abu Dhabi",
            "model_id": "eleven_multilingual_v2",
            "output_format": "mp3_44100_192",
            "voice_settings": {
                "stability": 0.32,
                "similarity_boost": 0.9,
                "style": 0.58,
                "use_speaker_boost": true
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let audio = speech_client(&server)
        .synthesize(&narration(json!({"text": "Welcome to Abu Dhabi"})))
        .await
        .expect("audio");
    assert_eq!(audio.bytes, vec![0xFF, 0xFB, 0x90, 0x00]);
    assert_eq!(audio.content_type, "audio/mpeg");
}

#[tokio::test]
async fn speech_voice_id_cannot_leave_synthesis_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1]))
        .mount(&server)
        .await;

    speech_client(&server)
        .synthesize(&narration(json!({
            "text": "hi",
            "voiceId": "../../v2/admin?x=1"
        })))
        .await
        .expect("audio");

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
    let url = &received[0].url;
    assert_eq!(url.path(), "/v1/text-to-speech/..%2F..%2Fv2%2Fadmin%3Fx=1");
    assert!(url.query().is_none());
    assert_eq!(received[0].headers["xi-api-key"], "test-xi-key");
}

#[tokio::test]
async fn speech_falls_back_to_accept_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-x"))
        .and(header("accept", "audio/ogg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let audio = speech_client(&server)
        .synthesize(&narration(json!({
            "text": "hi",
            "voiceId": "voice-x",
            "outputFormat": "ogg_48000"
        })))
        .await
        .expect("audio");
    assert_eq!(audio.content_type, "audio/ogg");
}

#[tokio::test]
async fn speech_error_keeps_status_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": {"status": "invalid_api_key", "message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let err = speech_client(&server)
        .synthesize(&narration(json!({"text": "hi"})))
        .await
        .unwrap_err();
    match err {
        UpstreamError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body.unwrap()["detail"]["status"], "invalid_api_key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn speech_error_with_text_body_has_no_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = speech_client(&server)
        .synthesize(&narration(json!({"text": "hi"})))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 500, body: None, .. }));
}
