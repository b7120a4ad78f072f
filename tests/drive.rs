use std::path::PathBuf;
use std::time::Duration;

use axum::{body::to_bytes, http::Request, Router};
use swimviz_rs::{
    config::Config,
    pipeline::summary::summarize,
    routes,
    state::{AppState, StoredWorkout},
    types::workout::{SessionMetrics, Workout},
};
use tower::ServiceExt;

fn config_with_credentials(credentials: Option<PathBuf>) -> Config {
    Config {
        port: 0,
        max_file_size: 25 * 1024 * 1024,
        cache_ttl: Duration::from_secs(3600),
        drive_credentials_file: credentials,
        drive_folder: "Swim FIT Files".to_string(),
    }
}

fn app(credentials: Option<PathBuf>) -> Router {
    let session = SessionMetrics::default();
    let summary = summarize(&session, &[], &[], &[]);
    let state = AppState::new(config_with_credentials(credentials));
    state.insert(
        "abc".to_string(),
        StoredWorkout {
            filename: "morning.fit".to_string(),
            raw: vec![0x0E, 0x10],
            workout: Workout {
                session,
                laps: Vec::new(),
                lengths: Vec::new(),
                records: Vec::new(),
                summary,
            },
        },
    );
    Router::new().merge(routes::drive::router()).with_state(state)
}

async fn post_drive_upload(app: Router, body: &str) -> axum::http::Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .uri("/api/drive/upload")
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

#[tokio::test]
async fn upload_without_credentials_is_rejected() {
    let response = post_drive_upload(app(None), r#"{"file_id": "abc"}"#).await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(text.contains("not configured"));
}

#[tokio::test]
async fn missing_credentials_file_is_rejected() {
    let response = post_drive_upload(
        app(Some(PathBuf::from("/nonexistent/service-account.json"))),
        r#"{"file_id": "abc"}"#,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_file_id_is_not_found() {
    let response = post_drive_upload(app(None), r#"{"file_id": "missing"}"#).await;
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}
