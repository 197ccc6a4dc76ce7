mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pairly_matching::config::AppConfig;
use pairly_matching::services::Matchmaker;
use pairly_matching::{routes, AppState};

use common::harness;

struct TestApp {
    router: Router,
    _harness: common::Harness,
}

fn app() -> TestApp {
    let harness = harness();
    let matchmaker = Matchmaker::new(harness.pool.clone(), harness.transport.clone(), Default::default());
    let state = Arc::new(AppState {
        matchmaker,
        config: AppConfig::default(),
        metrics_handle: None,
    });
    TestApp { router: routes::build_router(state), _harness: harness }
}

async fn call(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn profile_body(name: &str, age: i32, gender: &str, seeking: &str) -> Value {
    json!({
        "name": name,
        "age": age,
        "description": format!("{name} likes long walks"),
        "photo": format!("photo-{name}"),
        "gender": gender,
        "seeking": seeking,
    })
}

#[tokio::test]
async fn health_reports_database() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "pairly-matching");
    assert_eq!(body["checks"][0]["status"], "healthy");
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn metrics_without_exporter_is_not_found() {
    let app = app();
    let (status, _) = call(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_round_trip_over_http() {
    let app = app();

    let (status, body) = call(&app, Method::PUT, "/profiles/1", Some(profile_body("Ana", 29, "FEMALE", "ANY"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], 1);

    let (status, _) = call(&app, Method::PUT, "/profiles/1/interests", Some(json!({ "interest_ids": [1, 2] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/profiles/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana");
    assert_eq!(body["data"]["interests"], json!(["Music", "Sports"]));

    let (status, body) = call(&app, Method::PATCH, "/profiles/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E2002");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/profiles/1/interests",
        Some(json!({ "interest_ids": [1, 2, 3, 4, 5, 6] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E2003");

    let (status, _) = call(&app, Method::GET, "/profiles/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_profile_is_bad_request() {
    let app = app();
    let (status, body) = call(&app, Method::PUT, "/profiles/1", Some(profile_body("Ana", 16, "FEMALE", "ANY"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "E0002");
}

#[tokio::test]
async fn self_like_conflicts() {
    let app = app();
    call(&app, Method::PUT, "/profiles/1", Some(profile_body("Ana", 29, "FEMALE", "ANY"))).await;

    let (status, body) = call(&app, Method::POST, "/likes", Some(json!({ "user_id": 1, "target_id": 1 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "E3001");
}

#[tokio::test]
async fn browse_react_and_match_over_http() {
    let app = app();
    call(&app, Method::PUT, "/profiles/1", Some(profile_body("Ana", 29, "FEMALE", "MALE"))).await;
    call(&app, Method::PUT, "/profiles/2", Some(profile_body("Ben", 31, "MALE", "ANY"))).await;

    let (status, body) = call(&app, Method::POST, "/browse/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ready");
    assert_eq!(body["data"]["size"], 1);

    let (_, body) = call(&app, Method::POST, "/browse/1/next", None).await;
    assert_eq!(body["data"]["status"], "candidate");
    assert_eq!(body["data"]["candidate"]["user_id"], 2);
    assert_eq!(body["data"]["candidate"]["age_difference"], 2);

    let (status, body) = call(&app, Method::POST, "/browse/1/react", Some(json!({ "reaction": "like" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "browsing");
    assert_eq!(body["data"]["like"]["outcome"], "no_match");
    assert_eq!(body["data"]["next"]["status"], "exhausted");

    let (_, body) = call(&app, Method::GET, "/likes/pending/2", None).await;
    assert_eq!(body["data"][0]["user_id"], 1);

    let (_, body) = call(&app, Method::POST, "/likes", Some(json!({ "user_id": 2, "target_id": 1 }))).await;
    assert_eq!(body["data"]["outcome"], "match");
    assert_eq!(body["data"]["event"]["user_b"], 1);

    let (status, body) = call(&app, Method::POST, "/browse/1/next", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "E3002");
}
