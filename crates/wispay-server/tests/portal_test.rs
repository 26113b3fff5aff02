// End-to-end handler tests: the axum router wired to wiremock-backed
// collaborators and a tempdir-backed store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wispay_core::{
    AccessController, ApprovalNotifier, CredentialGenerator, NotifierConfig, Orchestrator,
    Package, PendingRequest, PendingStore, RequestStatus, RouterConfig, TlsVerification,
};
use wispay_server::auth::SessionSigner;
use wispay_server::{AppState, router};

const WEBHOOK_SECRET: &str = "whsec-0123456789abcdef";

// ── Helpers ─────────────────────────────────────────────────────────

async fn app(server: &MockServer, dir: &TempDir) -> (Router, Arc<AppState>) {
    let router_config = RouterConfig {
        url: server.uri().parse().expect("mock URI"),
        username: "api".into(),
        password: SecretString::from("s3cret".to_string()),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    };
    let notifier_config = NotifierConfig {
        api_url: server.uri().parse().expect("mock URI"),
        bot_token: SecretString::from("123:ABC".to_string()),
        admin_chat_id: 42,
        timeout: Duration::from_secs(5),
    };

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(
            PendingStore::open(dir.path()).await.expect("store opens"),
            AccessController::new(&router_config).expect("controller builds"),
            ApprovalNotifier::new(&notifier_config).expect("notifier builds"),
            CredentialGenerator::default(),
        ),
        sessions: SessionSigner::new("0123456789abcdef0123456789abcdef", 3600),
        webhook_secret: WEBHOOK_SECRET.into(),
    });

    (router(Arc::clone(&state)), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .extension(ConnectInfo::<SocketAddr>(
            "10.5.50.17:51234".parse().expect("addr"),
        ))
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn mock_telegram_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 900, "chat": { "id": 42 } }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/answerCallbackQuery"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/editMessageText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 900, "chat": { "id": 42 } }
        })))
        .mount(server)
        .await;
}

// ── Packages ────────────────────────────────────────────────────────

#[tokio::test]
async fn packages_lists_all_tiers() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _state) = app(&server, &dir).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/packages")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tiers = body.as_array().expect("array");
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[1]["id"], "7_days");
    assert_eq!(tiers[1]["price_bdt"], 30);
}

// ── Purchase ────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_returns_credentials_once() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("PUT"))
        .and(path("/rest/ip/hotspot/user"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            ".id": "*5", "name": "user0001", "disabled": "true"
        })))
        .mount(&server)
        .await;
    mock_telegram_ok(&server).await;

    let (app, state) = app(&server, &dir).await;
    let response = app
        .oneshot(post_json(
            "/api/v1/purchase",
            json!({
                "package": "7_days",
                "contact_number": "01712345678",
                "proof_reference": "trx-8891"
            }),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["package"], "7_days");
    assert_eq!(body["price_bdt"], 30);
    let username = body["username"].as_str().expect("username");
    assert_eq!(body["password"].as_str().expect("password").len(), 6);

    // The record is durable and carries the best-effort source address.
    let stored = state
        .orchestrator
        .store()
        .get(username)
        .await
        .expect("record persisted");
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.source_address, "10.5.50.17".parse().ok());
}

#[tokio::test]
async fn purchase_unknown_package_is_bad_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _state) = app(&server, &dir).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/purchase",
            json!({ "package": "99_days", "contact_number": "01712345678" }),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_input");
    // No side effects on the router.
    assert!(server.received_requests().await.expect("recorded").is_empty());
}

// ── Login / status / logout ─────────────────────────────────────────

async fn mock_account(server: &MockServer, connected: bool) {
    Mock::given(method("GET"))
        .and(path("/rest/ip/hotspot/user"))
        .and(query_param("name", "user1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            ".id": "*5",
            "name": "user1234",
            "password": "482913",
            "profile": "7_days",
            "disabled": "false",
            "limit-uptime": "6d12h"
        }])))
        .mount(server)
        .await;

    let sessions = if connected {
        json!([{
            ".id": "*3",
            "user": "user1234",
            "address": "10.5.50.17",
            "mac-address": "AA:BB:CC:DD:EE:FF",
            "uptime": "1h57m40s",
            "bytes-in": "1048576",
            "bytes-out": "524288"
        }])
    } else {
        json!([])
    };
    Mock::given(method("GET"))
        .and(path("/rest/ip/hotspot/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sessions))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_then_status_shows_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    mock_account(&server, true).await;

    let (app, _state) = app(&server, &dir).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/login",
            json!({ "username": "user1234", "password": "482913" }),
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token").to_owned();
    assert_eq!(body["status"]["connected"], true);
    assert_eq!(body["status"]["ip"], "10.5.50.17");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/status")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "user1234");
    assert_eq!(body["profile"], "7_days");
    assert_eq!(body["uptime"], "1h 57m 40s");
    assert_eq!(body["remaining_time"], "6d12h");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    mock_account(&server, false).await;

    let (app, _state) = app(&server, &dir).await;
    let response = app
        .oneshot(post_json(
            "/api/v1/login",
            json!({ "username": "user1234", "password": "wrong" }),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_credentials");
}

#[tokio::test]
async fn status_without_token_is_unauthorized() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _state) = app(&server, &dir).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/status")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ── Telegram webhook ────────────────────────────────────────────────

fn seed_record(id: &str) -> PendingRequest {
    PendingRequest {
        id: id.into(),
        username: id.into(),
        password: "482913".into(),
        package: Package::SevenDays,
        contact_number: "01712345678".into(),
        proof_reference: None,
        source_address: None,
        status: RequestStatus::Pending,
        created_at: chrono::Utc::now(),
        decided_at: None,
    }
}

fn callback_update(data: &str) -> Value {
    json!({
        "update_id": 1,
        "callback_query": {
            "id": "cb-1",
            "from": { "id": 7, "username": "admin" },
            "message": {
                "message_id": 900,
                "chat": { "id": 42 },
                "text": "🆕 New Payment Request"
            },
            "data": data
        }
    })
}

#[tokio::test]
async fn webhook_with_wrong_secret_is_not_found() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _state) = app(&server, &dir).await;

    let response = app
        .oneshot(post_json(
            "/telegram/webhook/wrong-secret",
            callback_update(r#"{"v":1,"a":"approve","id":"user1234"}"#),
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_approval_enables_account_and_decides_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, state) = app(&server, &dir).await;

    state
        .orchestrator
        .store()
        .put(&seed_record("user1234"))
        .await
        .expect("seed record");

    // Router: expiry scheduling + lookup + enable.
    Mock::given(method("GET"))
        .and(path("/rest/system/script"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/system/scheduler"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/rest/system/script"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            ".id": "*6", "name": "remove-user-user1234"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/rest/system/scheduler"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            ".id": "*7", "name": "expire-user-user1234"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/ip/hotspot/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            ".id": "*5", "name": "user1234", "disabled": "true"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/ip/hotspot/user/*5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            ".id": "*5", "name": "user1234", "disabled": "false"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mock_telegram_ok(&server).await;

    let update = callback_update(r#"{"v":1,"a":"approve","id":"user1234"}"#);
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/telegram/webhook/{WEBHOOK_SECRET}"),
            update.clone(),
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state
        .orchestrator
        .store()
        .get("user1234")
        .await
        .expect("record read");
    assert_eq!(stored.status, RequestStatus::Approved);

    // Duplicate delivery is acknowledged and changes nothing (the PATCH
    // mock's `.expect(1)` verifies the router saw exactly one enable).
    let response = app
        .oneshot(post_json(
            &format!("/telegram/webhook/{WEBHOOK_SECRET}"),
            update,
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn webhook_rejection_keeps_account_disabled() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, state) = app(&server, &dir).await;

    state
        .orchestrator
        .store()
        .put(&seed_record("user1234"))
        .await
        .expect("seed record");
    mock_telegram_ok(&server).await;

    let response = app
        .oneshot(post_json(
            &format!("/telegram/webhook/{WEBHOOK_SECRET}"),
            callback_update(r#"{"v":1,"a":"reject","id":"user1234"}"#),
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state
        .orchestrator
        .store()
        .get("user1234")
        .await
        .expect("record read");
    assert_eq!(stored.status, RequestStatus::Rejected);

    // Only Telegram traffic -- the router was never touched.
    let router_calls = server
        .received_requests()
        .await
        .expect("recorded")
        .iter()
        .filter(|r| r.url.path().starts_with("/rest/"))
        .count();
    assert_eq!(router_calls, 0);
}

#[tokio::test]
async fn webhook_unresolvable_event_is_acknowledged_without_side_effects() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, state) = app(&server, &dir).await;

    state
        .orchestrator
        .store()
        .put(&seed_record("user1234"))
        .await
        .expect("seed record");
    mock_telegram_ok(&server).await;

    let response = app
        .oneshot(post_json(
            &format!("/telegram/webhook/{WEBHOOK_SECRET}"),
            callback_update(r#"{"v":1,"a":"approve","id":"ghost999"}"#),
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state
        .orchestrator
        .store()
        .get("user1234")
        .await
        .expect("record read");
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn webhook_admin_command_lists_active_users() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let (app, _state) = app(&server, &dir).await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/hotspot/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            ".id": "*3",
            "user": "user1234",
            "address": "10.5.50.17",
            "uptime": "2h5m"
        }])))
        .mount(&server)
        .await;
    mock_telegram_ok(&server).await;

    let update = json!({
        "update_id": 2,
        "message": {
            "message_id": 901,
            "chat": { "id": 42 },
            "from": { "id": 7, "username": "admin" },
            "text": "/activeusers"
        }
    });
    let response = app
        .oneshot(post_json(
            &format!("/telegram/webhook/{WEBHOOK_SECRET}"),
            update,
        ))
        .await
        .expect("handled");
    assert_eq!(response.status(), StatusCode::OK);

    // The reply went out through sendMessage.
    let sends = server
        .received_requests()
        .await
        .expect("recorded")
        .iter()
        .filter(|r| r.url.path().ends_with("/sendMessage"))
        .count();
    assert_eq!(sends, 1);
}
