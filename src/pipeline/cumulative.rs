use serde::Serialize;

use crate::types::workout::{LapMetrics, LengthMetrics, Workout};
use crate::units::{format_clock, Pace, PaceUnit};

#[derive(Debug, Clone, Serialize)]
pub struct TaggedLap {
    #[serde(flatten)]
    pub lap: LapMetrics,
    pub workout_number: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaggedLength {
    #[serde(flatten)]
    pub length: LengthMetrics,
    pub workout_number: u32,
}

/// Totals across several workouts. The pool-unit flag is inherited from
/// the first workout, never re-derived.
#[derive(Debug, Clone, Serialize)]
pub struct CumulativeSummary {
    pub total_distance_m: f64,
    pub total_distance_yd: f64,
    pub total_time: String,
    pub total_time_s: f64,
    pub total_strokes: u32,
    pub total_laps: u32,
    pub num_workouts: u32,
    pub avg_pace_100m: String,
    pub avg_pace_100yd: String,
    pub avg_pace: String,
    pub is_yard_pool: bool,
    pub all_laps: Vec<TaggedLap>,
    pub all_lengths: Vec<TaggedLength>,
}

fn first_known_pace<'a>(paces: impl Iterator<Item = &'a str>) -> Option<String> {
    paces.filter(|p| *p != "N/A").map(str::to_string).next()
}

pub fn accumulate(workouts: &[Workout]) -> CumulativeSummary {
    let total_distance_m: f64 = workouts.iter().map(|w| w.summary.total_distance_m).sum();
    let total_distance_yd: f64 = workouts.iter().map(|w| w.summary.total_distance_yd).sum();
    let total_time_s: f64 = workouts
        .iter()
        .map(|w| w.session.total_elapsed_time_s)
        .sum();
    let total_strokes: u32 = workouts.iter().map(|w| w.summary.total_strokes).sum();
    let total_laps: u32 = workouts.iter().map(|w| w.summary.num_laps).sum();

    // Blend one pace out of the combined totals; when that is impossible,
    // fall back to the first workout that produced a pace at all.
    let (avg_pace_100m, avg_pace_100yd) = if total_distance_m > 0.0 && total_time_s > 0.0 {
        let speed = total_distance_m / total_time_s;
        (
            Pace::from_speed(speed, PaceUnit::Per100m)
                .map(Pace::to_clock)
                .unwrap_or_else(|| "N/A".to_string()),
            Pace::from_speed(speed, PaceUnit::Per100yd)
                .map(Pace::to_clock)
                .unwrap_or_else(|| "N/A".to_string()),
        )
    } else {
        (
            first_known_pace(workouts.iter().map(|w| w.summary.avg_pace_100m.as_str()))
                .unwrap_or_else(|| "N/A".to_string()),
            first_known_pace(workouts.iter().map(|w| w.summary.avg_pace_100yd.as_str()))
                .unwrap_or_else(|| "N/A".to_string()),
        )
    };

    let is_yard_pool = workouts
        .first()
        .map(|w| w.summary.is_yard_pool)
        .unwrap_or(false);

    let all_laps = workouts
        .iter()
        .enumerate()
        .flat_map(|(i, w)| {
            w.laps.iter().cloned().map(move |lap| TaggedLap {
                lap,
                workout_number: i as u32 + 1,
            })
        })
        .collect();
    let all_lengths = workouts
        .iter()
        .enumerate()
        .flat_map(|(i, w)| {
            w.lengths.iter().cloned().map(move |length| TaggedLength {
                length,
                workout_number: i as u32 + 1,
            })
        })
        .collect();

    CumulativeSummary {
        total_distance_m,
        total_distance_yd,
        total_time: if total_time_s > 0.0 {
            format_clock(total_time_s)
        } else {
            "00:00".to_string()
        },
        total_time_s,
        total_strokes,
        total_laps,
        num_workouts: workouts.len() as u32,
        avg_pace: if is_yard_pool {
            avg_pace_100yd.clone()
        } else {
            avg_pace_100m.clone()
        },
        avg_pace_100m,
        avg_pace_100yd,
        is_yard_pool,
        all_laps,
        all_lengths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::summary::summarize;
    use crate::types::workout::SessionMetrics;

    fn workout(distance_m: f64, elapsed_s: f64, yard: bool) -> Workout {
        let session = SessionMetrics {
            total_distance_m: distance_m,
            total_distance_yd: crate::units::meters_to_yards(distance_m),
            total_elapsed_time_s: elapsed_s,
            total_time_formatted: Some(format_clock(elapsed_s)),
            is_yard_pool: yard,
            ..Default::default()
        };
        let summary = summarize(&session, &[], &[], &[]);
        Workout {
            session,
            laps: Vec::new(),
            lengths: Vec::new(),
            records: Vec::new(),
            summary,
        }
    }

    #[test]
    fn distances_and_times_sum_across_workouts() {
        let combined = accumulate(&[workout(1000.0, 1200.0, false), workout(500.0, 600.0, false)]);
        assert_eq!(combined.total_distance_m, 1500.0);
        assert_eq!(combined.total_time_s, 1800.0);
        assert_eq!(combined.num_workouts, 2);
    }

    #[test]
    fn blended_pace_comes_from_combined_totals() {
        // 1500 m in 1800 s: 120 s per 100 m.
        let combined = accumulate(&[workout(1000.0, 1200.0, false), workout(500.0, 600.0, false)]);
        assert_eq!(combined.avg_pace_100m, "02:00");
        assert_eq!(combined.avg_pace, "02:00");
    }

    #[test]
    fn pace_falls_back_to_first_workout_with_one() {
        let mut a = workout(0.0, 0.0, false);
        a.summary.avg_pace_100m = "N/A".to_string();
        let mut b = workout(0.0, 0.0, false);
        b.summary.avg_pace_100m = "01:50".to_string();
        let mut c = workout(0.0, 0.0, false);
        c.summary.avg_pace_100m = "02:10".to_string();

        let combined = accumulate(&[a, b, c]);
        assert_eq!(combined.avg_pace_100m, "01:50");
    }

    #[test]
    fn pool_unit_inherited_from_first_workout_only() {
        let combined = accumulate(&[workout(100.0, 120.0, true), workout(100.0, 120.0, false)]);
        assert!(combined.is_yard_pool);
        let combined = accumulate(&[workout(100.0, 120.0, false), workout(100.0, 120.0, true)]);
        assert!(!combined.is_yard_pool);
    }

    #[test]
    fn sequences_concatenate_with_workout_numbers() {
        let mut a = workout(0.0, 0.0, false);
        a.laps = vec![LapMetrics::default(); 2];
        a.lengths = vec![LengthMetrics::default(); 1];
        let mut b = workout(0.0, 0.0, false);
        b.laps = vec![LapMetrics::default(); 1];
        b.lengths = vec![LengthMetrics::default(); 3];

        let combined = accumulate(&[a, b]);
        let numbers: Vec<u32> = combined.all_laps.iter().map(|l| l.workout_number).collect();
        assert_eq!(numbers, vec![1, 1, 2]);
        let numbers: Vec<u32> = combined
            .all_lengths
            .iter()
            .map(|l| l.workout_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 2, 2]);
    }

    #[test]
    fn cumulative_time_formats_past_an_hour() {
        let combined = accumulate(&[workout(2000.0, 2400.0, false), workout(2000.0, 2400.0, false)]);
        assert_eq!(combined.total_time, "1:20:00");
    }
}
