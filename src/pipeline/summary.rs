use crate::types::workout::{LapMetrics, LengthMetrics, SessionMetrics, TrackPoint, WorkoutSummary};
use crate::units::{format_clock, Pace, PaceUnit};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Elapsed swimming time, excluding rest, resolved from the best source
/// available. First rule yielding a positive value wins:
/// tagged active lengths, then the first `num_active_lengths` entries,
/// then the session timer time.
fn active_time_seconds(session: &SessionMetrics, lengths: &[LengthMetrics]) -> f64 {
    let mut active_time_s = 0.0;

    if !lengths.is_empty() {
        let tagged: Vec<&LengthMetrics> = lengths
            .iter()
            .filter(|l| l.is_active || l.length_type.as_deref() == Some("active"))
            .collect();

        if !tagged.is_empty() {
            active_time_s = tagged.iter().map(|l| l.elapsed_time_s).sum();
        } else if session.num_active_lengths > 0 {
            // No length carries a type tag; trust the session's count and
            // take the leading entries of the recorded sequence.
            active_time_s = lengths
                .iter()
                .take(session.num_active_lengths as usize)
                .map(|l| l.elapsed_time_s)
                .sum();
        }
    }

    if active_time_s == 0.0 {
        active_time_s = session.total_timer_time_s;
    }

    active_time_s
}

/// Mean of the laps' pace values in the given unit, over whole seconds
/// (the precision a displayed pace carries). Laps without a pace are
/// excluded, not counted as zero.
fn average_lap_pace(laps: &[LapMetrics], unit: PaceUnit) -> Option<Pace> {
    let seconds: Vec<u64> = laps
        .iter()
        .filter_map(|lap| match unit {
            PaceUnit::Per100m => lap.pace_per_100m,
            PaceUnit::Per100yd => lap.pace_per_100yd,
        })
        .map(Pace::whole_seconds)
        .collect();

    if seconds.is_empty() {
        return None;
    }
    let mean = seconds.iter().sum::<u64>() as f64 / seconds.len() as f64;
    Some(Pace::from_seconds(mean))
}

fn pace_or_na(pace: Option<Pace>) -> String {
    pace.map(Pace::to_clock).unwrap_or_else(|| "N/A".to_string())
}

/// Combines the session with the full lap/length/record sequences into one
/// consistent summary. Pool-unit classification (done once at session
/// extraction) gates every unit choice below.
pub fn summarize(
    session: &SessionMetrics,
    laps: &[LapMetrics],
    lengths: &[LengthMetrics],
    records: &[TrackPoint],
) -> WorkoutSummary {
    let is_yard_pool = session.is_yard_pool;
    let total_distance_m = session.total_distance_m;
    let total_time_s = session.total_elapsed_time_s;

    let active_time_s = active_time_seconds(session, lengths);
    let swim_time_s = if active_time_s > 0.0 {
        active_time_s
    } else {
        total_time_s
    };

    let mut pace_100m = session.avg_pace_per_100m;
    let mut pace_100yd = session.avg_pace_per_100yd;

    // Lap-pace average is preferred when laps exist; it matches what swim
    // apps display. Applied to the pool's classified unit.
    if !laps.is_empty() {
        if is_yard_pool {
            if let Some(pace) = average_lap_pace(laps, PaceUnit::Per100yd) {
                pace_100yd = Some(pace);
            }
        } else if let Some(pace) = average_lap_pace(laps, PaceUnit::Per100m) {
            pace_100m = Some(pace);
        }
    }

    // Still nothing: derive from total distance over swim time.
    if pace_100m.is_none() && total_distance_m > 0.0 && swim_time_s > 0.0 {
        let speed = total_distance_m / swim_time_s;
        pace_100m = Pace::from_speed(speed, PaceUnit::Per100m);
        if pace_100yd.is_none() {
            pace_100yd = Pace::from_speed(speed, PaceUnit::Per100yd);
        }
    }

    // What the user sees as "laps": the session's active-length count,
    // falling back to the recorded sequences.
    let mut num_display = session.num_active_lengths;
    if num_display == 0 {
        num_display = if !lengths.is_empty() {
            lengths.len() as u32
        } else {
            laps.len() as u32
        };
    }

    let rest_time_s = if active_time_s > 0.0 && total_time_s > active_time_s {
        total_time_s - active_time_s
    } else {
        0.0
    };

    let active_time = if active_time_s > 0.0 {
        format_clock(active_time_s)
    } else {
        session
            .active_time_formatted
            .clone()
            .unwrap_or_else(|| "00:00".to_string())
    };

    let headline = if is_yard_pool { pace_100yd } else { pace_100m };

    let strokes_per_length = (session.num_lengths > 0 && session.total_strokes > 0)
        .then(|| round1(f64::from(session.total_strokes) / f64::from(session.num_lengths)));
    let avg_strokes_per_lap = (!laps.is_empty() && session.total_strokes > 0)
        .then(|| round1(f64::from(session.total_strokes) / laps.len() as f64));

    WorkoutSummary {
        total_distance_m,
        total_distance_yd: session.total_distance_yd,
        total_time: session
            .total_time_formatted
            .clone()
            .unwrap_or_else(|| "00:00".to_string()),
        active_time,
        rest_time: if rest_time_s > 0.0 {
            format_clock(rest_time_s)
        } else {
            "00:00".to_string()
        },
        total_strokes: session.total_strokes,
        num_laps: num_display,
        num_laps_actual: laps.len() as u32,
        num_records: records.len() as u32,
        avg_pace: pace_or_na(headline),
        avg_pace_100m: pace_or_na(pace_100m),
        avg_pace_100yd: pace_or_na(pace_100yd),
        pool_length_m: session.pool_length_m,
        pool_length_yd: session.pool_length_yd,
        pool_length: if is_yard_pool {
            session.pool_length_yd
        } else {
            session.pool_length_m
        },
        is_yard_pool,
        num_lengths: session.num_lengths,
        num_active_lengths: num_display,
        strokes_per_length,
        avg_strokes_per_lap,
    }
}
