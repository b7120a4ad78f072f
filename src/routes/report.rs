use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::{cumulative, rasterize, report};
use crate::state::{AppState, StoredWorkout};
use crate::types::report::ReportFormat;
use crate::types::workout::Workout;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/report", post(generate_report))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportRequest {
    file_ids: Vec<String>,
    #[serde(default)]
    format: ReportFormat,
}

fn summary_card(stored: &[Arc<StoredWorkout>]) -> (String, u32, u32) {
    if let [single] = stored {
        let subtitle = single
            .workout
            .session
            .date
            .as_deref()
            .unwrap_or(single.filename.as_str());
        return report::summary_card_svg(
            "Swim Workout",
            subtitle,
            &report::workout_card_rows(&single.workout.summary),
        );
    }

    let workouts: Vec<Workout> = stored.iter().map(|s| s.workout.clone()).collect();
    let combined = cumulative::accumulate(&workouts);
    report::summary_card_svg(
        "Swim Workouts",
        &format!("{} workouts combined", workouts.len()),
        &report::cumulative_card_rows(&combined),
    )
}

async fn generate_report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.file_ids.is_empty() {
        return Err(AppError::BadRequest("No file_ids provided".to_string()));
    }

    let mut stored = Vec::with_capacity(req.file_ids.len());
    for file_id in &req.file_ids {
        stored.push(
            state
                .get(file_id)
                .ok_or_else(|| AppError::NotFound(file_id.clone()))?,
        );
    }

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    tracing::info!(
        "Generating {:?} report for {} workout(s)",
        req.format,
        stored.len()
    );

    let body = match req.format {
        ReportFormat::Html => {
            let inputs: Vec<report::ReportInput> = stored
                .iter()
                .map(|s| report::ReportInput {
                    filename: &s.filename,
                    workout: &s.workout,
                })
                .collect();
            report::render(&inputs, &generated_at).into_bytes()
        }
        ReportFormat::Png => {
            let (svg, width, height) = summary_card(&stored);
            rasterize::rasterize(&svg, width, height)?
        }
    };

    tracing::info!("Generated report: {} bytes", body.len());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, req.format.content_type())],
        body,
    ))
}
