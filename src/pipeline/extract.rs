use chrono::{DateTime, Utc};
use fitparser::Value;

use crate::types::workout::{LapMetrics, LengthMetrics, SessionMetrics, TrackPoint};
use crate::units::{self, Pace, PaceUnit};

/// Numeric coercion across the FIT value zoo. Anything non-numeric is
/// treated as absent rather than an error.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float64(v) => Some(*v),
        Value::Float32(v) => Some(f64::from(*v)),
        Value::SInt8(v) => Some(f64::from(*v)),
        Value::UInt8(v) | Value::UInt8z(v) | Value::Byte(v) | Value::Enum(v) => {
            Some(f64::from(*v))
        }
        Value::SInt16(v) => Some(f64::from(*v)),
        Value::UInt16(v) | Value::UInt16z(v) => Some(f64::from(*v)),
        Value::SInt32(v) => Some(f64::from(*v)),
        Value::UInt32(v) | Value::UInt32z(v) => Some(f64::from(*v)),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) | Value::UInt64z(v) => Some(*v as f64),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    as_f64(value)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u32)
}

fn as_u8(value: &Value) -> Option<u8> {
    as_f64(value)
        .filter(|v| v.is_finite() && (0.0..=255.0).contains(v))
        .map(|v| v as u8)
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => DateTime::from_timestamp(ts.timestamp(), 0),
        _ => None,
    }
}

/// Extracts session metrics. Always yields an entry, even from an empty
/// field set; unknown field names fall through.
pub fn session_from_fields<'a, I>(fields: I) -> SessionMetrics
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut session = SessionMetrics::default();

    for (name, value) in fields {
        match name {
            "timestamp" => {
                if let Some(ts) = as_timestamp(value) {
                    session.date = Some(ts.format("%Y-%m-%d").to_string());
                    session.time = Some(ts.format("%H:%M:%S").to_string());
                    session.timestamp = Some(ts);
                }
            }
            // FIT stores distance in meters regardless of pool unit.
            "total_distance" => {
                let meters = as_f64(value).unwrap_or_default();
                session.total_distance_m = meters;
                session.total_distance_yd = units::meters_to_yards(meters);
                session.total_distance_mi = units::meters_to_miles(meters);
            }
            "total_elapsed_time" => {
                session.total_elapsed_time_s = as_f64(value).unwrap_or_default();
                session.total_time_formatted =
                    Some(units::format_clock(session.total_elapsed_time_s));
            }
            "total_timer_time" => {
                session.total_timer_time_s = as_f64(value).unwrap_or_default();
                session.active_time_formatted =
                    Some(units::format_clock(session.total_timer_time_s));
            }
            "num_active_lengths" => {
                session.num_active_lengths = as_u32(value).unwrap_or_default();
            }
            "avg_speed" => {
                session.avg_speed_mps = as_f64(value).unwrap_or_default();
                session.avg_pace_per_100m =
                    Pace::from_speed(session.avg_speed_mps, PaceUnit::Per100m);
                session.avg_pace_per_100yd =
                    Pace::from_speed(session.avg_speed_mps, PaceUnit::Per100yd);
            }
            "total_strokes" => {
                session.total_strokes = as_u32(value).unwrap_or_default();
            }
            "pool_length" => {
                let meters = as_f64(value).unwrap_or_default();
                let pool = units::classify_pool(meters);
                session.pool_length_m = meters;
                session.pool_length_yd = pool.pool_length_yd;
                session.is_yard_pool = pool.is_yard_pool;
            }
            "total_calories" => {
                session.total_calories = as_u32(value).unwrap_or_default();
            }
            "avg_heart_rate" => session.avg_heart_rate = as_u8(value),
            "max_heart_rate" => session.max_heart_rate = as_u8(value),
            "sport" => {
                session.sport = Some(as_string(value).unwrap_or_else(|| "swimming".to_string()));
            }
            "num_lengths" => session.num_lengths = as_u32(value).unwrap_or_default(),
            "num_laps" => session.num_laps_session = as_u32(value).unwrap_or_default(),
            _ => {}
        }
    }

    session
}

/// Extracts one lap. Returns `None` when no recognized field arrived.
pub fn lap_from_fields<'a, I>(fields: I) -> Option<LapMetrics>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut lap = LapMetrics::default();
    let mut recognized = false;

    for (name, value) in fields {
        match name {
            "timestamp" => {
                lap.timestamp = as_timestamp(value);
                recognized = true;
            }
            "total_elapsed_time" => {
                lap.elapsed_time_s = as_f64(value).unwrap_or_default();
                lap.time_formatted = Some(units::format_clock(lap.elapsed_time_s));
                recognized = true;
            }
            "total_distance" => {
                lap.distance_m = as_f64(value).unwrap_or_default();
                lap.distance_yd = units::meters_to_yards(lap.distance_m);
                recognized = true;
            }
            "avg_speed" => {
                lap.avg_speed_mps = as_f64(value).unwrap_or_default();
                lap.pace_per_100m = Pace::from_speed(lap.avg_speed_mps, PaceUnit::Per100m);
                lap.pace_per_100yd = Pace::from_speed(lap.avg_speed_mps, PaceUnit::Per100yd);
                recognized = true;
            }
            "total_strokes" => {
                lap.strokes = as_u32(value).unwrap_or_default();
                recognized = true;
            }
            "stroke_count" => {
                lap.stroke_count = as_u32(value);
                recognized = true;
            }
            "swim_stroke" => {
                lap.stroke_type = as_string(value).map(|s| s.to_lowercase());
                recognized = true;
            }
            _ => {}
        }
    }

    if !recognized {
        return None;
    }

    // No usable avg_speed from the device: synthesize it from distance and
    // elapsed time so the pace is never left empty for a real split.
    if lap.pace_per_100m.is_none() && lap.distance_m > 0.0 && lap.elapsed_time_s > 0.0 {
        let speed = lap.distance_m / lap.elapsed_time_s;
        lap.avg_speed_mps = speed;
        lap.pace_per_100m = Pace::from_speed(speed, PaceUnit::Per100m);
        lap.pace_per_100yd = Pace::from_speed(speed, PaceUnit::Per100yd);
    }

    Some(lap)
}

/// Extracts one pool length. Returns `None` when no recognized field arrived.
pub fn length_from_fields<'a, I>(fields: I) -> Option<LengthMetrics>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut length = LengthMetrics::default();
    let mut recognized = false;

    for (name, value) in fields {
        match name {
            "timestamp" => {
                length.timestamp = as_timestamp(value);
                recognized = true;
            }
            "total_elapsed_time" => {
                length.elapsed_time_s = as_f64(value).unwrap_or_default();
                length.time_formatted = Some(units::format_clock(length.elapsed_time_s));
                recognized = true;
            }
            "total_timer_time" => {
                length.timer_time_s = as_f64(value).unwrap_or_default();
                recognized = true;
            }
            "total_distance" => {
                length.distance_m = as_f64(value).unwrap_or_default();
                length.distance_yd = units::meters_to_yards(length.distance_m);
                recognized = true;
            }
            "swim_stroke" => {
                length.stroke_type = as_string(value).map(|s| s.to_lowercase());
                recognized = true;
            }
            "length_type" => {
                let tag = as_string(value).map(|s| s.to_lowercase());
                length.is_active = tag.as_deref() == Some("active");
                length.length_type = tag;
                recognized = true;
            }
            _ => {}
        }
    }

    recognized.then_some(length)
}

/// Extracts one track point. Returns `None` when no recognized field arrived.
pub fn record_from_fields<'a, I>(fields: I) -> Option<TrackPoint>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut record = TrackPoint::default();
    let mut recognized = false;

    for (name, value) in fields {
        match name {
            "timestamp" => {
                record.timestamp = as_timestamp(value);
                recognized = true;
            }
            "distance" => {
                record.distance_m = as_f64(value).unwrap_or_default();
                recognized = true;
            }
            "speed" => {
                record.speed_mps = as_f64(value).unwrap_or_default();
                record.pace_per_100m = Pace::from_speed(record.speed_mps, PaceUnit::Per100m);
                recognized = true;
            }
            "heart_rate" => {
                record.heart_rate = as_u8(value);
                recognized = true;
            }
            _ => {}
        }
    }

    recognized.then_some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&'static str, Value)]) -> Vec<(&'static str, Value)> {
        pairs.to_vec()
    }

    fn iter<'a>(
        pairs: &'a [(&'static str, Value)],
    ) -> impl Iterator<Item = (&'a str, &'a Value)> {
        pairs.iter().map(|(name, value)| (*name, value))
    }

    #[test]
    fn session_converts_distance_to_all_units() {
        let pairs = fields(&[("total_distance", Value::Float64(1000.0))]);
        let session = session_from_fields(iter(&pairs));
        assert_eq!(session.total_distance_m, 1000.0);
        assert!((session.total_distance_yd - 1093.61).abs() < 0.01);
        assert!((session.total_distance_mi - 0.621371).abs() < 1e-6);
    }

    #[test]
    fn session_classifies_yard_pool_from_pool_length() {
        let pairs = fields(&[("pool_length", Value::Float64(22.86))]);
        let session = session_from_fields(iter(&pairs));
        assert!(session.is_yard_pool);
        assert_eq!(session.pool_length_yd, 25.0);
        assert_eq!(session.pool_length_m, 22.86);
    }

    #[test]
    fn session_ignores_unknown_fields_and_survives_bad_values() {
        let pairs = fields(&[
            ("some_future_field", Value::Float64(42.0)),
            ("avg_heart_rate", Value::String("not a number".to_string())),
            ("total_calories", Value::UInt16(310)),
        ]);
        let session = session_from_fields(iter(&pairs));
        assert_eq!(session.total_calories, 310);
        assert!(session.avg_heart_rate.is_none());
    }

    #[test]
    fn session_always_produced_even_when_empty() {
        let session = session_from_fields(std::iter::empty());
        assert_eq!(session.total_distance_m, 0.0);
        assert!(!session.is_yard_pool);
    }

    #[test]
    fn lap_with_no_recognized_fields_is_absent() {
        let pairs = fields(&[("mystery", Value::UInt8(1))]);
        assert!(lap_from_fields(iter(&pairs)).is_none());
    }

    #[test]
    fn lap_pace_synthesized_from_distance_and_time() {
        let pairs = fields(&[
            ("total_distance", Value::Float64(100.0)),
            ("total_elapsed_time", Value::Float64(120.0)),
        ]);
        let lap = lap_from_fields(iter(&pairs)).unwrap();
        assert!((lap.avg_speed_mps - 100.0 / 120.0).abs() < 1e-9);
        assert_eq!(lap.pace_per_100m.unwrap().to_clock(), "02:00");
        assert!(lap.pace_per_100yd.is_some());
    }

    #[test]
    fn lap_pace_not_synthesized_when_avg_speed_present() {
        let pairs = fields(&[
            ("total_distance", Value::Float64(100.0)),
            ("total_elapsed_time", Value::Float64(120.0)),
            ("avg_speed", Value::Float64(1.0)),
        ]);
        let lap = lap_from_fields(iter(&pairs)).unwrap();
        assert_eq!(lap.pace_per_100m.unwrap().to_clock(), "01:40");
    }

    #[test]
    fn zero_avg_speed_still_falls_back_to_distance_over_time() {
        let pairs = fields(&[
            ("avg_speed", Value::Float64(0.0)),
            ("total_distance", Value::Float64(50.0)),
            ("total_elapsed_time", Value::Float64(60.0)),
        ]);
        let lap = lap_from_fields(iter(&pairs)).unwrap();
        assert_eq!(lap.pace_per_100m.unwrap().to_clock(), "02:00");
    }

    #[test]
    fn length_active_flag_tracks_length_type() {
        let active = fields(&[("length_type", Value::String("active".to_string()))]);
        let idle = fields(&[("length_type", Value::String("idle".to_string()))]);
        assert!(length_from_fields(iter(&active)).unwrap().is_active);
        let idle = length_from_fields(iter(&idle)).unwrap();
        assert!(!idle.is_active);
        assert_eq!(idle.length_type.as_deref(), Some("idle"));
    }

    #[test]
    fn record_derives_pace_from_speed() {
        let pairs = fields(&[
            ("speed", Value::Float64(1.25)),
            ("heart_rate", Value::UInt8(142)),
        ]);
        let record = record_from_fields(iter(&pairs)).unwrap();
        assert_eq!(record.pace_per_100m.unwrap().to_clock(), "01:20");
        assert_eq!(record.heart_rate, Some(142));
    }

    #[test]
    fn record_with_zero_speed_has_no_pace() {
        let pairs = fields(&[("speed", Value::Float64(0.0))]);
        let record = record_from_fields(iter(&pairs)).unwrap();
        assert!(record.pace_per_100m.is_none());
    }
}
