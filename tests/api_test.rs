//! HTTP surface tests, driven through the router without a socket

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use spoilage_sentry::api::{create_router, AppState};
use spoilage_sentry::{EngineConfig, SpoilageEngine};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let engine = SpoilageEngine::from_config(&EngineConfig::instant(11)).unwrap();
    create_router(Arc::new(AppState::new(Arc::new(engine))))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["routes"], 5);
}

#[tokio::test]
async fn test_assess_then_fetch() {
    let app = app();

    let (status, body) = send(app.clone(), post_json("/v1/assess/RT004", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let assessed = &body["data"];
    assert_eq!(assessed["route_id"], "RT004");
    assert!(assessed["score"].as_u64().unwrap() <= 100);
    assert!(["Low", "Medium", "High"].contains(&assessed["risk_tier"].as_str().unwrap()));

    let (status, body) = send(app, get("/v1/assessments/RT004")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], assessed["score"]);
    assert_eq!(body["data"]["assessed_at"], assessed["assessed_at"]);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app();

    let (status, body) = send(app.clone(), post_json("/v1/assess/RT999", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "ROUTE_UNKNOWN");

    let (status, body) = send(app, get("/v1/assessments/RT999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ROUTE_UNKNOWN");
}

#[tokio::test]
async fn test_unassessed_route_is_404() {
    let (status, body) = send(app(), get("/v1/assessments/RT001")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ASSESSMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_manual_assessment() {
    let request = post_json(
        "/v1/assess/manual",
        json!({ "temperature": 25, "humidity": 98, "duration": 60, "food_type": "Meat" }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 100);
    assert_eq!(body["data"]["risk_tier"], "High");
    assert_eq!(body["data"]["food_type"], "meat");
}

#[tokio::test]
async fn test_manual_rejects_non_numeric() {
    let request = post_json(
        "/v1/assess/manual",
        json!({ "temperature": "warm", "humidity": 90, "duration": 10, "food_type": "dairy" }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MANUAL_INPUT_INVALID");
    assert_eq!(body["error"]["retryable"], false);
}

#[tokio::test]
async fn test_manual_rejects_wrong_json_types() {
    let bodies = [
        json!({ "temperature": true, "humidity": 90, "duration": 10, "food_type": "dairy" }),
        json!({ "temperature": 4, "humidity": null, "duration": 10, "food_type": "dairy" }),
        json!({ "temperature": 4, "humidity": 90, "food_type": "dairy" }),
    ];

    for body in bodies {
        let (status, response) = send(app(), post_json("/v1/assess/manual", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "MANUAL_INPUT_INVALID");
    }
}

#[tokio::test]
async fn test_batch_defaults_to_catalog() {
    let app = app();
    let (status, body) = send(app.clone(), post_json("/v1/assess/batch", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_requested"], 5);
    assert_eq!(body["data"]["total_assessed"], 5);

    let (_, routes) = send(app, get("/v1/routes")).await;
    let routes = routes["data"].as_array().unwrap();
    assert_eq!(routes.len(), 5);
    assert!(routes.iter().all(|r| r["latest_tier"].is_string()));
    assert!(routes.iter().all(|r| r["in_progress"] == false));
}

#[tokio::test]
async fn test_batch_reports_per_route_errors() {
    let request = post_json("/v1/assess/batch", json!({ "route_ids": ["RT001", "NOPE"] }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["error"]["code"], "ROUTE_UNKNOWN");
}

#[tokio::test]
async fn test_batch_limit() {
    let ids: Vec<String> = (0..51).map(|i| format!("RT{:03}", i)).collect();
    let request = post_json("/v1/assess/batch", json!({ "route_ids": ids }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
}

#[tokio::test]
async fn test_stats_counts_assessments() {
    let app = app();
    send(app.clone(), post_json("/v1/assess/RT002", json!({}))).await;

    let (status, body) = send(app, get("/v1/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_assessed"], 1);
    assert_eq!(body["data"]["stored_assessments"], 1);
    assert_eq!(body["data"]["api_version"], "v1");
}

#[tokio::test]
async fn test_rate_limit_rejection_uses_envelope() {
    let app = app();
    let request = || {
        Request::builder()
            .uri("/v1/routes")
            .header("X-Forwarded-For", "203.0.113.77")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..120 {
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (status, body) = send(app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "API_RATE_LIMITED");
    assert_eq!(body["error"]["retryable"], true);
}
