use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("No session data found in file")]
    MissingSession,
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("PNG rendering failed: {0}")]
    RenderFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Google Drive upload is not configured (set DRIVE_CREDENTIALS_FILE)")]
    NotConfigured,
    #[error("Invalid Drive credentials: {0}")]
    Credentials(String),
    #[error("Drive authentication failed: {0}")]
    Auth(String),
    #[error("Drive API request failed: {0}")]
    Api(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error("Workout not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Parse(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Drive(DriveError::NotConfigured)
            | AppError::Drive(DriveError::Credentials(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Drive(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Raster(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
