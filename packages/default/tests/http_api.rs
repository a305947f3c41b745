use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use cluster_helm_config::models::config::{ApiPolicy, AppConfig, AuthConfig};
use cluster_helm_config::server::{build_router, build_state};
use serde_json::{Value, json};
use std::collections::HashMap;

const TOKEN: &str = "ops-token";

fn app(api: ApiPolicy) -> TestServer {
    let cfg = AppConfig::default()
        .with_auth(AuthConfig {
            token_header: "token".to_string(),
            static_tokens: HashMap::from([(TOKEN.to_string(), 42), ("zero".to_string(), 0)]),
        })
        .with_api(api);
    TestServer::new(build_router(build_state(&cfg, None))).unwrap()
}

fn token(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("token"),
        HeaderValue::from_static(value),
    )
}

#[tokio::test]
async fn saved_config_is_readable_by_environment() {
    let server = app(ApiPolicy::default());
    let (name, value) = token(TOKEN);

    let response = server
        .post("/cluster/helm/config")
        .add_header(name, value)
        .json(&json!({ "environment": "prod", "config": "replicas: 3" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["result"], Value::Null);

    let response = server.get("/cluster/helm/config/prod").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["code"], 200);
    assert_eq!(body["result"]["environment"], "prod");
    assert_eq!(body["result"]["config"], "replicas: 3");
    assert_eq!(body["result"]["createdBy"], 42);
}

#[tokio::test]
async fn second_save_updates_the_same_record() {
    let server = app(ApiPolicy::default());

    for config in ["replicas: 1", "replicas: 5"] {
        let (name, value) = token(TOKEN);
        let response = server
            .post("/cluster/helm/config")
            .add_header(name, value)
            .json(&json!({ "environment": "stage", "config": config }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let body: Value = server.get("/cluster/helm/config/stage").await.json();
    assert_eq!(body["result"]["id"], 1);
    assert_eq!(body["result"]["config"], "replicas: 5");
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let server = app(ApiPolicy::default());

    let response = server
        .post("/cluster/helm/config")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer ops-token"),
        )
        .json(&json!({ "environment": "dev" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_or_zero_user_cannot_save() {
    let server = app(ApiPolicy::default());

    let response = server
        .post("/cluster/helm/config")
        .json(&json!({ "environment": "stage" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = token("zero");
    let response = server
        .post("/cluster/helm/config")
        .add_header(name, value)
        .json(&json!({ "environment": "stage" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.get("/cluster/helm/config/stage").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = app(ApiPolicy::default());
    let (name, value) = token(TOKEN);

    let response = server
        .post("/cluster/helm/config")
        .add_header(name, value)
        .bytes(Bytes::from_static(b"{invalid"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "Bad Request");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn strict_policy_protects_reads_and_reports_404() {
    let server = app(ApiPolicy {
        read_requires_auth: true,
        not_found_as_404: true,
    });

    let response = server.get("/cluster/helm/config/prod").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = token(TOKEN);
    let response = server
        .get("/cluster/helm/config/prod")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
