use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::Pace;

/// Session-level metrics from the one `session` message of a FIT file.
/// Serde field names are the JSON contract downstream reporting depends on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub total_distance_m: f64,
    pub total_distance_yd: f64,
    pub total_distance_mi: f64,
    pub total_elapsed_time_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time_formatted: Option<String>,
    pub total_timer_time_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_time_formatted: Option<String>,
    pub num_active_lengths: u32,
    pub avg_speed_mps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_per_100m: Option<Pace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_per_100yd: Option<Pace>,
    pub total_strokes: u32,
    pub pool_length_m: f64,
    pub pool_length_yd: f64,
    pub is_yard_pool: bool,
    pub total_calories: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    pub num_lengths: u32,
    pub num_laps_session: u32,
}

/// One recorded split. A lap may span several pool lengths depending on
/// device configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LapMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub elapsed_time_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_formatted: Option<String>,
    pub distance_m: f64,
    pub distance_yd: f64,
    pub avg_speed_mps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_per_100m: Option<Pace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_per_100yd: Option<Pace>,
    pub strokes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_type: Option<String>,
}

/// One traversal of the pool, active or idle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub elapsed_time_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_formatted: Option<String>,
    pub timer_time_s: f64,
    pub distance_m: f64,
    pub distance_yd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_type: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub distance_m: f64,
    pub speed_mps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_per_100m: Option<Pace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u8>,
}

/// The derived aggregate over one workout. Recomputed on every parse,
/// never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutSummary {
    pub total_distance_m: f64,
    pub total_distance_yd: f64,
    pub total_time: String,
    pub active_time: String,
    pub rest_time: String,
    pub total_strokes: u32,
    pub num_laps: u32,
    pub num_laps_actual: u32,
    pub num_records: u32,
    pub avg_pace: String,
    pub avg_pace_100m: String,
    pub avg_pace_100yd: String,
    pub pool_length_m: f64,
    pub pool_length_yd: f64,
    pub pool_length: f64,
    pub is_yard_pool: bool,
    pub num_lengths: u32,
    pub num_active_lengths: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes_per_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_strokes_per_lap: Option<f64>,
}

/// Everything extracted and derived from one FIT file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub session: SessionMetrics,
    pub laps: Vec<LapMetrics>,
    pub lengths: Vec<LengthMetrics>,
    pub records: Vec<TrackPoint>,
    pub summary: WorkoutSummary,
}
