use crate::types::workout::{LapMetrics, TrackPoint};
use crate::units::{format_clock, Pace, PaceUnit};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const PANEL_COLUMNS: usize = 2;
const PANEL_WIDTH: f64 = 400.0;
const PANEL_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 52.0;
const TICK_TARGET: usize = 8;
const CLOCK_TICK_MIN_STEP: i64 = 5;

const PACE_COLOR: &str = "#1f77b4";
const DISTANCE_COLOR: &str = "#2ca02c";
const HEART_RATE_COLOR: &str = "#d62728";
const LAP_PACE_COLOR: &str = "#9467bd";
const BAR_COLOR: &str = "#4c8cd0";
const AVERAGE_LINE_COLOR: &str = "#d62728";
const AXIS_COLOR: &str = "#9a9a9a";
const GRID_COLOR: &str = "#e5e5e5";
const TEXT_COLOR: &str = "#333333";

/// Maps data coordinates into one plot rectangle.
struct Frame {
    x0: f64,
    y0: f64,
    plot_w: f64,
    plot_h: f64,
    x_min: f64,
    x_range: f64,
    y_min: f64,
    y_range: f64,
}

impl Frame {
    fn new(origin: (f64, f64), size: (f64, f64), x: (f64, f64), y: (f64, f64)) -> Self {
        Frame {
            x0: origin.0 + MARGIN_LEFT,
            y0: origin.1 + MARGIN_TOP,
            plot_w: size.0 - MARGIN_LEFT - MARGIN_RIGHT,
            plot_h: size.1 - MARGIN_TOP - MARGIN_BOTTOM,
            x_min: x.0,
            x_range: (x.1 - x.0).max(f64::EPSILON),
            y_min: y.0,
            y_range: (y.1 - y.0).max(f64::EPSILON),
        }
    }

    fn px(&self, x: f64) -> f64 {
        self.x0 + (x - self.x_min) / self.x_range * self.plot_w
    }

    fn py(&self, y: f64) -> f64 {
        self.y0 + self.plot_h - (y - self.y_min) / self.y_range * self.plot_h
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

/// Integer tick positions stepping from the floor of the range, never
/// denser than `min_step`. Matches the clock-axis ticking of the reports
/// this replaces.
fn integer_ticks(min: f64, max: f64, min_step: i64) -> Vec<f64> {
    let step = (((max - min) / TICK_TARGET as f64) as i64).max(min_step);
    let mut ticks = Vec::new();
    let mut v = min as i64;
    while (v as f64) <= max {
        ticks.push(v as f64);
        v += step;
    }
    ticks
}

fn polyline_path(points: &[(f64, f64)]) -> String {
    let mut path = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{}{:.1} {:.1} ", cmd, x, y));
    }
    path.trim_end().to_string()
}

fn line_series(points: &[(f64, f64)], color: &str, width: f64) -> String {
    format!(
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linejoin="round"/>"#,
        polyline_path(points),
        color,
        width
    )
}

fn area_series(frame: &Frame, points: &[(f64, f64)], color: &str) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    let baseline = frame.y0 + frame.plot_h;
    format!(
        r#"<path d="M{:.1} {:.1} {} L{:.1} {:.1} Z" fill="{}" fill-opacity="0.25" stroke="{}" stroke-width="2"/>"#,
        first.0,
        baseline,
        polyline_path(points).replacen('M', "L", 1),
        last.0,
        baseline,
        color,
        color
    )
}

fn markers(points: &[(f64, f64)], color: &str, radius: f64) -> String {
    points
        .iter()
        .map(|(x, y)| {
            format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
                x, y, radius, color
            )
        })
        .collect()
}

fn axes(frame: &Frame) -> String {
    let right = frame.x0 + frame.plot_w;
    let bottom = frame.y0 + frame.plot_h;
    format!(
        r#"<path d="M{x0} {y0} L{x0} {bottom} L{right} {bottom}" fill="none" stroke="{color}" stroke-width="1"/>"#,
        x0 = frame.x0,
        y0 = frame.y0,
        bottom = bottom,
        right = right,
        color = AXIS_COLOR
    )
}

fn y_gridlines(frame: &Frame, ticks: &[f64], label: impl Fn(f64) -> String) -> String {
    let right = frame.x0 + frame.plot_w;
    ticks
        .iter()
        .map(|&tick| {
            let y = frame.py(tick);
            format!(
                concat!(
                    r#"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="{grid}" stroke-width="1"/>"#,
                    r#"<text x="{tx:.1}" y="{ty:.1}" font-size="11" fill="{text}" text-anchor="end">{label}</text>"#
                ),
                x0 = frame.x0,
                x1 = right,
                y = y,
                grid = GRID_COLOR,
                tx = frame.x0 - 8.0,
                ty = y + 4.0,
                text = TEXT_COLOR,
                label = label(tick)
            )
        })
        .collect()
}

fn x_tick_labels(frame: &Frame, ticks: &[f64], label: impl Fn(f64) -> String) -> String {
    let bottom = frame.y0 + frame.plot_h;
    ticks
        .iter()
        .map(|&tick| {
            let x = frame.px(tick);
            format!(
                concat!(
                    r#"<line x1="{x:.1}" y1="{y0:.1}" x2="{x:.1}" y2="{y1:.1}" stroke="{axis}" stroke-width="1"/>"#,
                    r#"<text x="{x:.1}" y="{ty:.1}" font-size="11" fill="{text}" text-anchor="middle">{label}</text>"#
                ),
                x = x,
                y0 = bottom,
                y1 = bottom + 5.0,
                axis = AXIS_COLOR,
                ty = bottom + 18.0,
                text = TEXT_COLOR,
                label = label(tick)
            )
        })
        .collect()
}

fn chart_text(frame: &Frame, title: &str, x_title: &str, y_title: &str) -> String {
    let center_x = frame.x0 + frame.plot_w / 2.0;
    let bottom = frame.y0 + frame.plot_h;
    format!(
        concat!(
            r#"<text x="{cx:.1}" y="{title_y:.1}" font-size="16" font-weight="bold" fill="{text}" text-anchor="middle">{title}</text>"#,
            r#"<text x="{cx:.1}" y="{xt_y:.1}" font-size="12" fill="{text}" text-anchor="middle">{x_title}</text>"#,
            r#"<text x="{yt_x:.1}" y="{yt_y:.1}" font-size="12" fill="{text}" text-anchor="middle" transform="rotate(-90 {yt_x:.1} {yt_y:.1})">{y_title}</text>"#
        ),
        cx = center_x,
        title_y = frame.y0 - 20.0,
        text = TEXT_COLOR,
        title = title,
        xt_y = bottom + 38.0,
        x_title = x_title,
        yt_x = frame.x0 - 48.0,
        yt_y = frame.y0 + frame.plot_h / 2.0,
        y_title = y_title,
    )
}

fn svg_document(width: f64, height: f64, body: String) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="DejaVu Sans, Verdana, sans-serif">"#,
            r##"<rect width="{w}" height="{h}" fill="#ffffff"/>{body}</svg>"##
        ),
        w = width,
        h = height,
        body = body
    )
}

/// Seconds-since-start series over the track points, skipping points
/// without a timestamp.
fn time_series(
    records: &[TrackPoint],
    value: impl Fn(&TrackPoint) -> Option<f64>,
) -> Vec<(f64, f64)> {
    let start = records.iter().find_map(|r| r.timestamp);
    let Some(start) = start else {
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|r| {
            let ts = r.timestamp?;
            let v = value(r)?;
            Some(((ts - start).num_seconds() as f64, v))
        })
        .collect()
}

fn record_pace_seconds(record: &TrackPoint, is_yard_pool: bool) -> Option<f64> {
    if is_yard_pool {
        Pace::from_speed(record.speed_mps, PaceUnit::Per100yd).map(|p| p.whole_seconds() as f64)
    } else {
        record.pace_per_100m.map(|p| p.whole_seconds() as f64)
    }
}

fn single_series_chart(
    series: &[(f64, f64)],
    title: &str,
    y_title: &str,
    color: &str,
    clock_y: bool,
    filled: bool,
) -> String {
    let (x_min, x_max) = bounds(series.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = bounds(series.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let y_min = if filled { 0.0 } else { y_min };
    let frame = Frame::new(
        (0.0, 0.0),
        (CHART_WIDTH, CHART_HEIGHT),
        (x_min, x_max),
        (y_min, y_max),
    );

    let pixels: Vec<(f64, f64)> = series.iter().map(|&(x, y)| (frame.px(x), frame.py(y))).collect();
    let y_ticks = integer_ticks(y_min, y_max, if clock_y { CLOCK_TICK_MIN_STEP } else { 1 });
    let x_ticks = integer_ticks(x_min, x_max, 60);
    let y_label = |v: f64| {
        if clock_y {
            format_clock(v)
        } else {
            format!("{:.0}", v)
        }
    };

    let mut body = String::new();
    body.push_str(&y_gridlines(&frame, &y_ticks, y_label));
    body.push_str(&axes(&frame));
    body.push_str(&x_tick_labels(&frame, &x_ticks, format_clock));
    if filled {
        body.push_str(&area_series(&frame, &pixels, color));
    } else {
        body.push_str(&line_series(&pixels, color, 2.0));
        body.push_str(&markers(&pixels, color, 2.0));
    }
    body.push_str(&chart_text(&frame, title, "Time", y_title));

    svg_document(CHART_WIDTH, CHART_HEIGHT, body)
}

/// Pace over time. `None` when no track point carries both a timestamp
/// and a finite pace.
pub fn pace_chart(records: &[TrackPoint], is_yard_pool: bool) -> Option<String> {
    let series = time_series(records, |r| record_pace_seconds(r, is_yard_pool));
    if series.is_empty() {
        return None;
    }
    let unit = if is_yard_pool { "100 yd" } else { "100m" };
    Some(single_series_chart(
        &series,
        "Pace Over Time",
        &format!("Pace (per {})", unit),
        PACE_COLOR,
        true,
        false,
    ))
}

/// Cumulative distance over time, in the pool's display unit.
pub fn distance_chart(records: &[TrackPoint], is_yard_pool: bool) -> Option<String> {
    let series = time_series(records, |r| {
        Some(if is_yard_pool {
            crate::units::meters_to_yards(r.distance_m)
        } else {
            r.distance_m
        })
    });
    if series.is_empty() {
        return None;
    }
    let unit = if is_yard_pool { "yards" } else { "meters" };
    Some(single_series_chart(
        &series,
        "Cumulative Distance",
        &format!("Distance ({})", unit),
        DISTANCE_COLOR,
        false,
        true,
    ))
}

pub fn heart_rate_chart(records: &[TrackPoint]) -> Option<String> {
    let series = time_series(records, |r| r.heart_rate.map(f64::from));
    if series.is_empty() {
        return None;
    }
    Some(single_series_chart(
        &series,
        "Heart Rate Over Time",
        "Heart Rate (bpm)",
        HEART_RATE_COLOR,
        false,
        false,
    ))
}

fn bar_panel(
    origin: (f64, f64),
    values: &[f64],
    title: &str,
    y_title: &str,
    clock_y: bool,
) -> String {
    if values.is_empty() {
        return String::new();
    }
    let (_, y_max) = bounds(values.iter().copied()).unwrap_or((0.0, 1.0));
    let frame = Frame::new(
        origin,
        (PANEL_WIDTH, PANEL_HEIGHT),
        (0.0, values.len() as f64),
        (0.0, y_max.max(1.0)),
    );

    let slot = frame.plot_w / values.len() as f64;
    let bar_w = (slot * 0.7).max(1.0);
    let bottom = frame.y0 + frame.plot_h;

    let mut body = String::new();
    let y_ticks = integer_ticks(0.0, y_max.max(1.0), if clock_y { CLOCK_TICK_MIN_STEP } else { 1 });
    let y_label = |v: f64| {
        if clock_y {
            format_clock(v)
        } else {
            format!("{:.0}", v)
        }
    };
    body.push_str(&y_gridlines(&frame, &y_ticks, y_label));
    body.push_str(&axes(&frame));
    for (i, &v) in values.iter().enumerate() {
        let x = frame.x0 + slot * (i as f64 + 0.5) - bar_w / 2.0;
        let top = frame.py(v);
        body.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x,
            top,
            bar_w,
            (bottom - top).max(0.0),
            BAR_COLOR
        ));
    }
    body.push_str(&chart_text(&frame, title, "Lap Number", y_title));
    body
}

/// The 2x2 lap-analysis panel: time, distance, pace, strokes per lap.
pub fn lap_analysis_chart(laps: &[LapMetrics], is_yard_pool: bool) -> Option<String> {
    if laps.is_empty() {
        return None;
    }

    let times: Vec<f64> = laps.iter().map(|l| l.elapsed_time_s).collect();
    let distances: Vec<f64> = laps
        .iter()
        .map(|l| if is_yard_pool { l.distance_yd } else { l.distance_m })
        .collect();
    let paces: Vec<f64> = laps
        .iter()
        .filter_map(|l| lap_pace_seconds(l, is_yard_pool))
        .collect();
    let strokes: Vec<f64> = laps.iter().map(|l| f64::from(l.strokes)).collect();

    let distance_unit = if is_yard_pool { "yards" } else { "meters" };
    let pace_unit = if is_yard_pool { "s/100yd" } else { "s/100m" };

    let body = [
        bar_panel((0.0, 0.0), &times, "Lap Time", "Time", true),
        bar_panel(
            (PANEL_WIDTH, 0.0),
            &distances,
            "Lap Distance",
            &format!("Distance ({})", distance_unit),
            false,
        ),
        bar_panel(
            (0.0, PANEL_HEIGHT),
            &paces,
            "Lap Pace",
            &format!("Pace ({})", pace_unit),
            true,
        ),
        bar_panel(
            (PANEL_WIDTH, PANEL_HEIGHT),
            &strokes,
            "Lap Strokes",
            "Strokes",
            false,
        ),
    ]
    .concat();
    Some(svg_document(
        PANEL_WIDTH * PANEL_COLUMNS as f64,
        PANEL_HEIGHT * 2.0,
        body,
    ))
}

fn lap_pace_seconds(lap: &LapMetrics, is_yard_pool: bool) -> Option<f64> {
    let pace = if is_yard_pool {
        lap.pace_per_100yd
            .or_else(|| Pace::from_speed(lap.avg_speed_mps, PaceUnit::Per100yd))
    } else {
        lap.pace_per_100m
            .or_else(|| Pace::from_speed(lap.avg_speed_mps, PaceUnit::Per100m))
    };
    pace.map(|p| p.whole_seconds() as f64)
}

/// Per-lap pace line with a dashed average rule.
pub fn lap_pace_chart(laps: &[LapMetrics], is_yard_pool: bool) -> Option<String> {
    let paces: Vec<f64> = laps
        .iter()
        .filter_map(|l| lap_pace_seconds(l, is_yard_pool))
        .collect();
    if paces.is_empty() {
        return None;
    }

    let series: Vec<(f64, f64)> = paces
        .iter()
        .enumerate()
        .map(|(i, &p)| (i as f64 + 1.0, p))
        .collect();
    let (y_min, y_max) = bounds(paces.iter().copied()).unwrap_or((0.0, 1.0));
    let frame = Frame::new(
        (0.0, 0.0),
        (CHART_WIDTH, CHART_HEIGHT),
        (0.5, paces.len() as f64 + 0.5),
        (y_min, y_max),
    );

    let pixels: Vec<(f64, f64)> = series.iter().map(|&(x, y)| (frame.px(x), frame.py(y))).collect();
    let average = paces.iter().sum::<f64>() / paces.len() as f64;
    let avg_y = frame.py(average);

    let unit = if is_yard_pool { "100 yd" } else { "100m" };
    let y_ticks = integer_ticks(y_min, y_max, CLOCK_TICK_MIN_STEP);
    let lap_ticks: Vec<f64> = (1..=paces.len()).map(|i| i as f64).collect();

    let mut body = String::new();
    body.push_str(&y_gridlines(&frame, &y_ticks, format_clock));
    body.push_str(&axes(&frame));
    body.push_str(&x_tick_labels(&frame, &lap_ticks, |v| format!("{:.0}", v)));
    body.push_str(&line_series(&pixels, LAP_PACE_COLOR, 3.0));
    body.push_str(&markers(&pixels, LAP_PACE_COLOR, 4.0));
    body.push_str(&format!(
        concat!(
            r#"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="{color}" stroke-width="1.5" stroke-dasharray="6 4"/>"#,
            r#"<text x="{x1:.1}" y="{ty:.1}" font-size="11" fill="{color}" text-anchor="end">Average: {label}</text>"#
        ),
        x0 = frame.x0,
        x1 = frame.x0 + frame.plot_w,
        y = avg_y,
        ty = avg_y - 6.0,
        color = AVERAGE_LINE_COLOR,
        label = format_clock(average),
    ));
    body.push_str(&chart_text(
        &frame,
        "Lap Pace Comparison",
        "Lap Number",
        &format!("Pace (per {})", unit),
    ));

    Some(svg_document(CHART_WIDTH, CHART_HEIGHT, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(offset_s: i64, speed: f64, hr: Option<u8>) -> TrackPoint {
        TrackPoint {
            timestamp: Some(Utc.timestamp_opt(1_700_000_000 + offset_s, 0).unwrap()),
            distance_m: offset_s as f64,
            speed_mps: speed,
            pace_per_100m: Pace::from_speed(speed, PaceUnit::Per100m),
            heart_rate: hr,
        }
    }

    #[test]
    fn charts_absent_without_data() {
        assert!(pace_chart(&[], false).is_none());
        assert!(distance_chart(&[], false).is_none());
        assert!(heart_rate_chart(&[record(0, 1.0, None)]).is_none());
        assert!(lap_analysis_chart(&[], false).is_none());
        assert!(lap_pace_chart(&[], false).is_none());
    }

    #[test]
    fn pace_chart_renders_svg_with_clock_ticks() {
        let records = vec![record(0, 1.0, None), record(30, 1.2, None), record(60, 1.1, None)];
        let svg = pace_chart(&records, false).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Pace Over Time"));
        assert!(svg.contains("per 100m"));
    }

    #[test]
    fn yard_pool_charts_use_yard_units() {
        let records = vec![record(0, 1.0, None), record(30, 1.0, None)];
        let svg = pace_chart(&records, true).unwrap();
        assert!(svg.contains("per 100 yd"));
        let svg = distance_chart(&records, true).unwrap();
        assert!(svg.contains("Distance (yards)"));
    }

    #[test]
    fn heart_rate_chart_present_when_any_point_has_hr() {
        let records = vec![record(0, 1.0, Some(120)), record(30, 1.0, None)];
        assert!(heart_rate_chart(&records).is_some());
    }

    #[test]
    fn lap_charts_render_bars_and_average_rule() {
        let laps = vec![
            LapMetrics {
                elapsed_time_s: 90.0,
                distance_m: 100.0,
                distance_yd: 109.4,
                strokes: 40,
                pace_per_100m: Pace::parse("01:30"),
                pace_per_100yd: Pace::parse("01:22"),
                ..Default::default()
            },
            LapMetrics {
                elapsed_time_s: 100.0,
                distance_m: 100.0,
                distance_yd: 109.4,
                strokes: 44,
                pace_per_100m: Pace::parse("01:40"),
                pace_per_100yd: Pace::parse("01:31"),
                ..Default::default()
            },
        ];
        let svg = lap_analysis_chart(&laps, false).unwrap();
        assert!(svg.contains("Lap Time"));
        assert!(svg.contains("Lap Strokes"));
        let svg = lap_pace_chart(&laps, false).unwrap();
        assert!(svg.contains("Average: 01:35"));
    }
}
