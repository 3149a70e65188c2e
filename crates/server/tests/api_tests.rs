//! Integration tests for the server API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kruize_mcp_server::api::{create_router, AppState};
use mcp_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    tunables::catalog,
    HpoEngine, Recommendation, TRIALS,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn setup_app_with_engine(engine: HpoEngine) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::API).await;

    let state = Arc::new(AppState::new(
        health_registry,
        ServiceMetrics::new(),
        StructuredLogger::new("test-node"),
        engine,
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    setup_app_with_engine(HpoEngine::new()).await
}

fn post_mcp(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn workload() -> Value {
    json!({
        "namespace": "prod",
        "deployment": "orders",
        "container": "jvm",
        "env_vars": {"X": "1"}
    })
}

#[tokio::test]
async fn test_mcp_returns_recommendation() {
    let (app, _state) = setup_test_app().await;

    let response = app.oneshot(post_mcp(workload())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;

    let id = body["experiment_id"].as_str().unwrap();
    let suffix = id.strip_prefix("prod_orders_").unwrap();
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_eq!(body["workload"]["original_env"], json!({"X": "1"}));
    assert_eq!(body["workload"]["observed_issue"], "latency_increase");
    assert_eq!(
        body["workload"]["source_repo"],
        "https://github.com/demo-org/orders"
    );
    assert_eq!(body["workload"]["image"], "ghcr.io/demo-org/orders:latest");

    let experiment = &body["hpo_experiment_config"];
    assert_eq!(experiment["experiment_id"], id);
    assert_eq!(experiment["experiment_name"], id);
    assert_eq!(experiment["total_trials"], TRIALS);
    assert_eq!(experiment["hpo_algo_impl"], "optuna_tpe");
    assert_eq!(experiment["tunables"].as_array().unwrap().len(), 4);

    assert_eq!(
        body["agent_patch_action"]["yaml_patch_hint"],
        "Update the container spec's env section with new JAVA_OPTIONS"
    );
    assert!(body["explanation"].as_str().unwrap().starts_with("Recommended"));
}

#[tokio::test]
async fn test_mcp_trials_and_best_config() {
    let (app, _state) = setup_test_app().await;

    let response = app.oneshot(post_mcp(workload())).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    // Parse from the raw bytes so best_config keeps the wire key order
    let rec: Recommendation = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(rec.trials.len(), TRIALS);
    for (i, trial) in rec.trials.iter().enumerate() {
        assert_eq!(trial.trial, i + 1);
        for tunable in catalog() {
            assert!(tunable.admits(trial.config.get(&tunable.name).unwrap()));
        }
    }

    let max = rec
        .trials
        .iter()
        .map(|t| t.score)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(rec.final_best_score, max);

    assert_eq!(body["best_config"].as_object().unwrap().len(), 4);

    let opts = &rec.agent_patch_action.update_env_var.java_options;
    let tokens: Vec<_> = opts.split(' ').collect();
    assert_eq!(tokens.len(), rec.best_config.len());
    for (token, (name, value)) in tokens.iter().zip(rec.best_config.iter()) {
        assert_eq!(*token, format!("-XX:{name}={value}"));
    }
    assert!(opts.starts_with("-XX:CompileThreshold="));

    let metrics = &body["trials"][0]["metrics"];
    assert!(metrics["Throughput"].is_f64());
    assert!(metrics["Avg_Watts"].is_f64());
}

#[tokio::test]
async fn test_mcp_uses_source_info_overrides() {
    let (app, _state) = setup_test_app().await;

    let mut req = workload();
    req["source_info"] = json!({
        "repo": "https://git.example.com/orders",
        "image": "registry.example.com/orders:2.0"
    });
    req["observed_issue"] = json!("gc_pauses");

    let response = app.oneshot(post_mcp(req)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["workload"]["source_repo"],
        "https://git.example.com/orders"
    );
    assert_eq!(body["workload"]["image"], "registry.example.com/orders:2.0");
    assert_eq!(body["workload"]["observed_issue"], "gc_pauses");
}

#[tokio::test]
async fn test_mcp_rejects_missing_required_field() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(post_mcp(json!({
            "namespace": "prod",
            "deployment": "orders",
            "container": "jvm"
        })))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_mcp_rejects_malformed_json() {
    let (app, _state) = setup_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_mcp_zero_trials_returns_error_body() {
    let (app, _state) = setup_app_with_engine(HpoEngine::with_trials(0)).await;

    let response = app.oneshot(post_mcp(workload())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "no trials configured");
    assert_eq!(body["code"], "no_trials");
}

#[tokio::test]
async fn test_mcp_only_accepts_post() {
    let (app, _state) = setup_test_app().await;

    let response = app.oneshot(get("/mcp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["engine"].is_object());
    assert!(health["components"]["api"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::ENGINE, "no trials configured")
        .await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let health = body_json(response).await;
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, state) = setup_test_app().await;

    let response = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);

    state.health_registry.set_ready(true).await;

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_recommendations() {
    let (app, _state) = setup_test_app().await;

    let response = app.clone().oneshot(post_mcp(workload())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("kruize_mcp_requests_total"));
    assert!(metrics_text.contains("kruize_mcp_trials_total"));
    assert!(metrics_text.contains("kruize_mcp_recommendation_latency_seconds_bucket"));
    assert!(metrics_text.contains("kruize_mcp_best_score_count"));
}
