//! Integration tests for the HTTP router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use objrpc::Endpoint;
use objrpc_server::demo::Demo;
use objrpc_server::{build_router, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    let endpoint = Endpoint::new(Demo::default()).expect("endpoint");
    build_router(endpoint, &ServerConfig::default())
}

async fn body_text(resp: axum::response::Response) -> String {
    let body = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .expect("body");
    String::from_utf8(body.to_vec()).expect("utf8")
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("req")
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("req");
    let resp = app().oneshot(req).await.expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn query_call_returns_json() {
    let req = Request::builder()
        .uri("/api?func=Half&param=10")
        .body(Body::empty())
        .expect("req");
    let resp = app().oneshot(req).await.expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).expect("content type"),
        "application/json"
    );
    assert_eq!(body_text(resp).await, "5");
}

#[tokio::test]
async fn form_body_call() {
    let resp = app()
        .oneshot(form_post("/api", "func=Greet&param=%22Ada%22"))
        .await
        .expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "\"Hello, Ada!\"");
}

#[tokio::test]
async fn body_overrides_query() {
    let resp = app()
        .oneshot(form_post("/api?func=Half&param=10", "param=30"))
        .await
        .expect("resp");
    assert_eq!(body_text(resp).await, "15");
}

#[tokio::test]
async fn void_call_returns_empty_body() {
    let resp = app()
        .oneshot(form_post("/api", "func=Tick"))
        .await
        .expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "");
}

#[tokio::test]
async fn errors_use_status_ok_and_error_payload() {
    let resp = app()
        .oneshot(form_post("/api", "func=Nope"))
        .await
        .expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_text(resp).await,
        r#"{"error":"No such function 'Nope'."}"#
    );

    let resp = app()
        .oneshot(form_post(
            "/api",
            "func=Divide&param=%7B%22dividend%22%3A1%2C%22divisor%22%3A0%7D",
        ))
        .await
        .expect("resp");
    assert_eq!(body_text(resp).await, r#"{"error":"Division by zero"}"#);
}

#[tokio::test]
async fn missing_func_is_unknown_function() {
    let resp = app()
        .oneshot(form_post("/api", ""))
        .await
        .expect("resp");
    assert_eq!(body_text(resp).await, r#"{"error":"No such function ''."}"#);
}

#[tokio::test]
async fn funcs_lists_demo_functions() {
    let resp = app()
        .oneshot(form_post("/api", "func=funcs"))
        .await
        .expect("resp");
    let names: Vec<String> = serde_json::from_str(&body_text(resp).await).expect("json");
    assert_eq!(
        names,
        vec!["Count", "Divide", "Greet", "Half", "Stats", "Tick"]
    );
}

#[tokio::test]
async fn client_script_served() {
    let req = Request::builder()
        .uri("/api/client.js")
        .body(Body::empty())
        .expect("req");
    let resp = app().oneshot(req).await.expect("resp");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).expect("content type"),
        "application/javascript"
    );
    assert!(body_text(resp).await.contains("function objrpc(url)"));
}

#[tokio::test]
async fn custom_paths() {
    let endpoint = Endpoint::new(Demo::default()).expect("endpoint");
    let config = ServerConfig {
        rpc_path: "/rpc".to_string(),
        client_path: "/rpc.js".to_string(),
        ..Default::default()
    };
    let app = build_router(endpoint, &config);

    let req = Request::builder()
        .uri("/rpc?func=Count")
        .body(Body::empty())
        .expect("req");
    let resp = app.clone().oneshot(req).await.expect("resp");
    assert_eq!(body_text(resp).await, "0");

    let req = Request::builder()
        .uri("/api?func=Count")
        .body(Body::empty())
        .expect("req");
    let resp = app.oneshot(req).await.expect("resp");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_rejected() {
    let endpoint = Endpoint::new(Demo::default()).expect("endpoint");
    let config = ServerConfig {
        body_limit: 16,
        ..Default::default()
    };
    let app = build_router(endpoint, &config);
    let resp = app
        .oneshot(form_post("/api", &format!("func=Greet&param={}", "a".repeat(64))))
        .await
        .expect("resp");
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
