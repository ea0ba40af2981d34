mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use common::{at, roster, window};
use http_body_util::BodyExt;
use referendum::{
    auth::AdminCredentials,
    routes::create_routes,
    state::AppState,
    window::FixedClock,
};
use serde_json::Value;
use tower::ServiceExt;

fn app(now: DateTime<Utc>, admin: AdminCredentials) -> Router {
    let store = roster(&[("Ht67h", "Budi"), ("Qw12e", "Sari")]);
    let state = AppState::new(store, window(), admin, Arc::new(FixedClock::new(now)));
    create_routes(state)
}

fn open_app() -> Router {
    app(
        at("2025-09-01T09:00:00+07:00"),
        AdminCredentials::new("admin", "rahasia"),
    )
}

fn vote(code: &str, choice: &str) -> Request<Body> {
    Request::post("/vote")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("code={code}&choice={choice}")))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin(user_pass: Option<&str>) -> Request<Body> {
    let mut request = Request::get("/admin");
    if let Some(raw) = user_pass {
        request = request.header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode(raw)));
    }
    request.body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_vote_redirects_then_conflicts() {
    let app = open_app();

    let response = app.clone().oneshot(vote("Ht67h", "setuju")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/Ht67h?success=1");

    let response = app.clone().oneshot(vote("Ht67h", "tidak+setuju")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(vote("ZZZZZ", "setuju")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_validation_and_window() {
    let response = open_app().oneshot(vote("Ht67h", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let closed = app(
        at("2025-09-01T18:00:00+07:00"),
        AdminCredentials::new("admin", "rahasia"),
    );
    let response = closed.oneshot(vote("Ht67h", "setuju")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_reports_phase_and_code() {
    let app = open_app();

    let body = json(app.clone().oneshot(get("/?code=Ht67h")).await.unwrap()).await;
    assert_eq!(body["phase"], "open");
    assert_eq!(body["name"], "Budi");
    assert_eq!(body["already_used"], false);
    assert_eq!(body["message"], "Selamat, Budi! Silakan pilih.");
    assert_eq!(body["start"], "2025-09-01T01:00:00Z");

    let body = json(app.clone().oneshot(get("/?code=ZZZZZ")).await.unwrap()).await;
    assert_eq!(body["message"], "Kode tidak ditemukan!");
    assert_eq!(body["name"], Value::Null);

    app.clone().oneshot(vote("Ht67h", "setuju")).await.unwrap();
    let body = json(app.oneshot(get("/?code=Ht67h")).await.unwrap()).await;
    assert_eq!(body["already_used"], true);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Terima kasih telah memilih.");
}

#[tokio::test]
async fn test_status_before_start() {
    let app = app(at("2025-09-01T07:00:00+07:00"), AdminCredentials::default());

    let body = json(app.oneshot(get("/")).await.unwrap()).await;
    assert_eq!(body["phase"], "before_start");
    assert_eq!(body["code"], "");
}

#[tokio::test]
async fn test_code_link_redirects_to_query() {
    let response = open_app().oneshot(get("/Ht67h")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?code=Ht67h");
}

fn location(response: &axum::response::Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_vote_redirect_chain_keeps_success_flag() {
    let app = open_app();

    let response = app.clone().oneshot(vote("Ht67h", "setuju")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let link = location(&response);

    let response = app.clone().oneshot(get(&link)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let status = location(&response);
    assert_eq!(status, "/?code=Ht67h&success=1");

    let body = json(app.oneshot(get(&status)).await.unwrap()).await;
    assert_eq!(body["code"], "Ht67h");
    assert_eq!(body["success"], true);
    assert_eq!(body["already_used"], true);
    assert_eq!(body["message"], "Terima kasih telah memilih.");
}

#[tokio::test]
async fn test_admin_requires_credentials() {
    let app = open_app();

    let response = app.clone().oneshot(admin(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        r#"Basic realm="Admin Area""#
    );

    let response = app.oneshot(admin(Some("admin:salah"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_closed_without_configured_credentials() {
    let app = app(at("2025-09-01T09:00:00+07:00"), AdminCredentials::new("admin", ""));

    let response = app.oneshot(admin(Some("admin:"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_summary() {
    let app = open_app();
    app.clone().oneshot(vote("Qw12e", "setuju")).await.unwrap();

    let response = app.oneshot(admin(Some("admin:rahasia"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["voted_count"], 1);
    assert_eq!(body["not_voted_count"], 1);
    assert_eq!(body["tallies"]["setuju"], 1);
    assert_eq!(body["voted_voters"][0]["code"], "Qw12e");
    assert_eq!(body["voted_voters"][0]["redemption"]["choice"], "setuju");
    assert_eq!(body["not_voted_voters"][0]["name"], "Budi");
}

#[tokio::test]
async fn test_health() {
    let response = open_app().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
