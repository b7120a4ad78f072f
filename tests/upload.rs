use std::time::Duration;

use axum::{http::Request, Router};
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
        .merge(routes::upload::router())
        .with_state(state)
}

fn multipart_body(file_name: &str, file_body: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_body);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn post_upload(file_name: &str, file_body: &[u8]) -> axum::http::Response<axum::body::Body> {
    let boundary = "X-BOUNDARY-TEST";
    let body = multipart_body(file_name, file_body, boundary);

    app()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(axum::body::Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response")
}

#[tokio::test]
async fn upload_rejects_unsupported_extension() {
    let response = post_upload("workout.gpx", b"<gpx/>").await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_rejects_undecodable_fit_bytes() {
    let response = post_upload("workout.fit", b"definitely not a fit file").await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_rejects_empty_request() {
    let boundary = "X-BOUNDARY-TEST";
    let body = format!("--{boundary}--\r\n");

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(axum::body::Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}
