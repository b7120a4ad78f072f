use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::types::workout::Workout;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/workout/:file_id", get(workout))
}

/// The full parsed data model for one uploaded file, as JSON.
async fn workout(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Workout>, AppError> {
    let stored = state
        .get(&file_id)
        .ok_or_else(|| AppError::NotFound(file_id.clone()))?;
    Ok(Json(stored.workout.clone()))
}
