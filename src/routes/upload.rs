use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use rayon::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, ParseError};
use crate::pipeline::parse;
use crate::state::{AppState, StoredWorkout};
use crate::types::workout::WorkoutSummary;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize)]
struct UploadedWorkout {
    file_id: String,
    filename: String,
    summary: WorkoutSummary,
}

#[derive(Serialize)]
struct UploadResponse {
    workouts: Vec<UploadedWorkout>,
}

fn is_fit_filename(filename: &str) -> bool {
    filename
        .rsplit('.')
        .next()
        .map(|ext| ext.eq_ignore_ascii_case("fit"))
        .unwrap_or(false)
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;
        if !is_fit_filename(&filename) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file format: {}",
                filename
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?
            .to_vec();
        files.push((filename, bytes));
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No file provided".to_string()));
    }

    tracing::info!("Parsing {} FIT file(s)", files.len());

    // Workouts are independent; parse side by side, keeping request order.
    let parsed: Result<Vec<_>, ParseError> = files
        .into_par_iter()
        .map(|(filename, bytes)| {
            parse::parse(&bytes).map(|workout| (filename, bytes, workout))
        })
        .collect();
    let parsed = parsed?;

    let mut workouts = Vec::with_capacity(parsed.len());
    for (filename, raw, workout) in parsed {
        let file_id = Uuid::new_v4().to_string();

        tracing::info!(
            "Parsed {} with ID {} ({:.0} m, {} laps, {} lengths, {} records)",
            filename,
            file_id,
            workout.summary.total_distance_m,
            workout.laps.len(),
            workout.lengths.len(),
            workout.records.len()
        );

        let summary = workout.summary.clone();
        state.insert(
            file_id.clone(),
            StoredWorkout {
                filename: filename.clone(),
                raw,
                workout,
            },
        );
        workouts.push(UploadedWorkout {
            file_id,
            filename,
            summary,
        });
    }

    Ok(Json(UploadResponse { workouts }))
}
