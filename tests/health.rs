use std::time::Duration;

use axum::{body::to_bytes, http::Request, Router};
use swimviz_rs::{config::Config, routes, state::AppState};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        port: 0,
        max_file_size: 25 * 1024 * 1024,
        cache_ttl: Duration::from_secs(3600),
        drive_credentials_file: None,
        drive_folder: "Swim FIT Files".to_string(),
    }
}

fn app() -> Router {
    let state = AppState::new(test_config());
    Router::new()
        .merge(routes::health::router())
        .with_state(state)
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .method("GET")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(text.contains("\"status\":\"ok\""));
    assert!(text.contains("swimviz-rs"));
}
