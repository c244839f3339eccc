//! SDP relay tests against a mocked Realtime endpoint
//!
//! The upstream is a wiremock server; every test checks what the gateway
//! forwards and how it maps the upstream reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Router, body::Body, http::Request, http::StatusCode};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hotline_gateway::core::call::{
    CallError, HttpSignalingClient, OfferRequest, SignalingClient,
};
use hotline_gateway::core::realtime::{RealtimeRelay, SignalingError};
use hotline_gateway::{ServerConfig, routes, state::AppState};

const OFFER: &str = "v=0\r\no=- 46117317 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=sendrecv\r\n";
const ANSWER: &str = "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=sendrecv\r\n";

fn create_test_config(upstream: &MockServer) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tls: None,
        openai_api_key: Some("sk-test".to_string()),
        openai_realtime_model: None,
        openai_realtime_voice: None,
        realtime_url: format!("{}/v1/realtime", upstream.uri()),
        cors_allowed_origins: None,
        rate_limit_requests_per_second: 100000,
        rate_limit_burst_size: 100,
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    routes::realtime::create_realtime_router().with_state(state)
}

/// Serve the realtime routes on an ephemeral port and return the base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn sdp_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/sdp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_answer_returned_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/realtime"))
        .and(query_param("model", "gpt-4o-realtime-preview-2025-06-03"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("openai-beta", "realtime=v1"))
        .and(header("content-type", "application/sdp"))
        .and(header("accept", "application/sdp"))
        .and(body_string(OFFER))
        .respond_with(ResponseTemplate::new(201).set_body_string(ANSWER))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app.oneshot(sdp_request(json!({"sdp": OFFER}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/sdp"
    );
    assert_eq!(read_body(response).await, ANSWER.as_bytes());
}

#[tokio::test]
async fn test_offer_is_sanitized_before_forwarding() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/realtime"))
        .and(body_string(OFFER))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(1)
        .mount(&upstream)
        .await;

    // Quoted and LF-only: the upstream still receives the CRLF offer
    let mangled = format!("\"{}\"", OFFER.replace("\r\n", "\n"));
    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app
        .oneshot(sdp_request(json!({"sdp": mangled})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_allowed_client_model_is_forwarded() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("model", "gpt-realtime"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app
        .oneshot(sdp_request(
            json!({"sdp": OFFER, "model": "\"gpt-realtime\"", "voice": "ash"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_client_model_falls_back_to_env() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("model", "gpt-realtime-mini"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = create_test_config(&upstream);
    config.openai_realtime_model = Some("gpt-realtime-mini".to_string());
    let app = build_app(AppState::new(config).await);

    let response = app
        .oneshot(sdp_request(json!({"sdp": OFFER, "model": "GPT-REALTIME"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offer_without_audio_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app
        .oneshot(sdp_request(
            json!({"sdp": "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_json_error_is_wrapped() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid API key"}})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app.oneshot(sdp_request(json!({"sdp": OFFER}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(
        body,
        json!({"error": {"error": {"message": "Invalid API key"}}})
    );
}

#[tokio::test]
async fn test_upstream_text_error_is_wrapped() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let response = app.oneshot(sdp_request(json!({"sdp": OFFER}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body, json!({"error": "upstream overloaded"}));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let relay = RealtimeRelay::new(
        format!("http://127.0.0.1:{port}/v1/realtime"),
        Some("sk-test".to_string()),
        None,
        None,
    );
    let err = relay
        .negotiate(&json!(OFFER), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SignalingError::Transport(_)));
}

#[tokio::test]
async fn test_slow_upstream_answer_is_awaited() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/realtime"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(ANSWER)
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = build_app(AppState::new(create_test_config(&upstream)).await);
    let started = Instant::now();
    let response = app.oneshot(sdp_request(json!({"sdp": OFFER}))).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, ANSWER.as_bytes());
}

#[tokio::test]
async fn test_relay_reports_resolved_session() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ANSWER))
        .mount(&upstream)
        .await;

    let relay = RealtimeRelay::new(
        format!("{}/v1/realtime", upstream.uri()),
        Some("sk-test".to_string()),
        None,
        Some("verse".to_string()),
    );
    let answer = relay
        .negotiate(&json!(OFFER), Some("gpt-realtime"), None)
        .await
        .unwrap();

    assert_eq!(answer.model.as_str(), "gpt-realtime");
    assert_eq!(answer.voice, "verse");
    assert_eq!(&answer.sdp[..], ANSWER.as_bytes());
}

#[tokio::test]
async fn test_signaling_client_round_trip() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("model", "gpt-realtime"))
        .and(body_string(OFFER))
        .respond_with(ResponseTemplate::new(201).set_body_string(ANSWER))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = create_test_config(&upstream);
    config.openai_realtime_voice = Some("sage".to_string());
    let base_url = serve(build_app(AppState::new(config).await)).await;
    let client = HttpSignalingClient::new(&base_url).unwrap();

    let defaults = client.session_defaults().await.unwrap();
    assert_eq!(defaults.model, "gpt-4o-realtime-preview-2025-06-03");
    assert_eq!(defaults.voice, "sage");

    let answer = client
        .exchange(&OfferRequest {
            sdp: OFFER.to_string(),
            voice: Some("ash".to_string()),
            model: Some("gpt-realtime".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(answer, ANSWER);
}

#[tokio::test]
async fn test_signaling_client_surfaces_relay_error() {
    let upstream = MockServer::start().await;
    let base_url = serve(build_app(AppState::new(create_test_config(&upstream)).await)).await;
    let client = HttpSignalingClient::new(&base_url).unwrap();

    let err = client
        .exchange(&OfferRequest {
            sdp: "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n".to_string(),
            voice: None,
            model: None,
        })
        .await
        .unwrap_err();

    match err {
        CallError::SignalingRejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(
                body,
                json!({"error": "Offer did not have an audio media section."})
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
