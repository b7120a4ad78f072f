use crate::pipeline::charts;
use crate::pipeline::cumulative::{accumulate, CumulativeSummary};
use crate::types::report::StrokeCount;
use crate::types::workout::{LapMetrics, Workout, WorkoutSummary};

const CARD_WIDTH: u32 = 640;
const CARD_HEADER_HEIGHT: u32 = 96;
const CARD_ROW_HEIGHT: u32 = 44;

/// One uploaded workout plus the name it arrived under.
pub struct ReportInput<'a> {
    pub filename: &'a str,
    pub workout: &'a Workout,
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn stroke_glyph(stroke: &str) -> &'static str {
    match stroke {
        "freestyle" => "\u{1F3CA}",
        "breaststroke" => "\u{1F3CA}\u{200D}\u{2640}\u{FE0F}",
        "backstroke" => "\u{1F3CA}\u{200D}\u{2642}\u{FE0F}",
        "butterfly" => "\u{1F98B}",
        "drill" => "\u{1F6E0}\u{FE0F}",
        "mixed" => "\u{1F504}",
        _ => "\u{1F3CA}",
    }
}

pub fn stroke_name(stroke: &str) -> String {
    let mut chars = stroke.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}

/// Lap counts by stroke type, ordered by first appearance.
pub fn stroke_breakdown(laps: &[LapMetrics]) -> Vec<StrokeCount> {
    let mut counts: Vec<StrokeCount> = Vec::new();
    for lap in laps {
        let Some(stroke) = lap.stroke_type.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|c| c.stroke == stroke) {
            Some(entry) => entry.count += 1,
            None => counts.push(StrokeCount {
                stroke: stroke.to_string(),
                name: stroke_name(stroke),
                glyph: stroke_glyph(stroke),
                count: 1,
            }),
        }
    }
    counts
}

fn merge_breakdowns(inputs: &[ReportInput]) -> Vec<StrokeCount> {
    let mut merged: Vec<StrokeCount> = Vec::new();
    for input in inputs {
        for entry in stroke_breakdown(&input.workout.laps) {
            match merged.iter_mut().find(|c| c.stroke == entry.stroke) {
                Some(existing) => existing.count += entry.count,
                None => merged.push(entry),
            }
        }
    }
    merged
}

fn stat_card(label: &str, value: &str) -> String {
    format!(
        concat!(
            r#"<div class="stat-card"><div class="stat-value">{}</div>"#,
            r#"<div class="stat-label">{}</div></div>"#
        ),
        escape_html(value),
        escape_html(label)
    )
}

fn display_distance(summary: &WorkoutSummary) -> String {
    if summary.is_yard_pool {
        format!("{:.0} yd", summary.total_distance_yd)
    } else {
        format!("{:.0} m", summary.total_distance_m)
    }
}

fn pace_label(is_yard_pool: bool) -> &'static str {
    if is_yard_pool {
        "Avg Pace /100yd"
    } else {
        "Avg Pace /100m"
    }
}

fn summary_cards(workout: &Workout) -> String {
    let summary = &workout.summary;
    let session = &workout.session;

    let mut cards = vec![
        stat_card("Distance", &display_distance(summary)),
        stat_card("Total Time", &summary.total_time),
        stat_card("Active Time", &summary.active_time),
        stat_card("Rest Time", &summary.rest_time),
        stat_card(pace_label(summary.is_yard_pool), &summary.avg_pace),
        stat_card("Strokes", &summary.total_strokes.to_string()),
        stat_card("Laps", &summary.num_laps.to_string()),
    ];

    if summary.pool_length > 0.0 {
        let unit = if summary.is_yard_pool { "yd" } else { "m" };
        cards.push(stat_card(
            "Pool Length",
            &format!("{:.0} {}", summary.pool_length, unit),
        ));
    }
    if session.total_calories > 0 {
        cards.push(stat_card("Calories", &session.total_calories.to_string()));
    }
    if let Some(avg_hr) = session.avg_heart_rate {
        cards.push(stat_card("Avg HR", &format!("{} bpm", avg_hr)));
    }
    if let Some(max_hr) = session.max_heart_rate {
        cards.push(stat_card("Max HR", &format!("{} bpm", max_hr)));
    }
    if let Some(spl) = summary.strokes_per_length {
        cards.push(stat_card("Strokes / Length", &format!("{:.1}", spl)));
    }

    format!(r#"<div class="stat-grid">{}</div>"#, cards.concat())
}

fn breakdown_section(counts: &[StrokeCount]) -> String {
    if counts.is_empty() {
        return String::new();
    }
    let items: String = counts
        .iter()
        .map(|c| {
            format!(
                concat!(
                    r#"<div class="stroke-card"><span class="stroke-glyph">{}</span>"#,
                    r#"<span class="stroke-name">{}</span><span class="stroke-count">{} laps</span></div>"#
                ),
                c.glyph,
                escape_html(&c.name),
                c.count
            )
        })
        .collect();
    format!(
        r#"<h2>Stroke Breakdown</h2><div class="stroke-grid">{}</div>"#,
        items
    )
}

fn laps_table(laps: &[LapMetrics], is_yard_pool: bool) -> String {
    if laps.is_empty() {
        return String::new();
    }
    let pace_header = if is_yard_pool { "Pace /100yd" } else { "Pace /100m" };
    let distance_header = if is_yard_pool { "Distance (yd)" } else { "Distance (m)" };

    let rows: String = laps
        .iter()
        .enumerate()
        .map(|(i, lap)| {
            let stroke = lap.stroke_type.as_deref().unwrap_or("-");
            let pace = if is_yard_pool {
                lap.pace_per_100yd
            } else {
                lap.pace_per_100m
            };
            let distance = if is_yard_pool { lap.distance_yd } else { lap.distance_m };
            format!(
                "<tr><td>{}</td><td>{} {}</td><td>{}</td><td>{:.0}</td><td>{}</td><td>{}</td></tr>",
                i + 1,
                stroke_glyph(stroke),
                escape_html(&stroke_name(stroke)),
                lap.time_formatted.as_deref().unwrap_or("-"),
                distance,
                pace.map(|p| p.to_clock()).unwrap_or_else(|| "-".to_string()),
                lap.strokes,
            )
        })
        .collect();

    format!(
        concat!(
            "<h2>Laps</h2><table><thead><tr><th>#</th><th>Stroke</th><th>Time</th>",
            "<th>{}</th><th>{}</th><th>Strokes</th></tr></thead><tbody>{}</tbody></table>"
        ),
        distance_header, pace_header, rows
    )
}

fn chart_sections(workout: &Workout) -> String {
    let yard = workout.summary.is_yard_pool;
    [
        charts::pace_chart(&workout.records, yard),
        charts::distance_chart(&workout.records, yard),
        charts::heart_rate_chart(&workout.records),
        charts::lap_analysis_chart(&workout.laps, yard),
        charts::lap_pace_chart(&workout.laps, yard),
    ]
    .into_iter()
    .flatten()
    .map(|svg| format!(r#"<div class="chart">{}</div>"#, svg))
    .collect()
}

fn workout_body(input: &ReportInput) -> String {
    let workout = input.workout;
    let date = workout.session.date.as_deref().unwrap_or("Swim Session");
    format!(
        concat!(
            r#"<div class="section-header"><h2>{}</h2><span class="filename">{}</span></div>"#,
            "{}{}{}{}"
        ),
        escape_html(date),
        escape_html(input.filename),
        summary_cards(workout),
        breakdown_section(&stroke_breakdown(&workout.laps)),
        chart_sections(workout),
        laps_table(&workout.laps, workout.summary.is_yard_pool),
    )
}

fn cumulative_body(cumulative: &CumulativeSummary, inputs: &[ReportInput]) -> String {
    let unit = if cumulative.is_yard_pool { "yd" } else { "m" };
    let distance = if cumulative.is_yard_pool {
        cumulative.total_distance_yd
    } else {
        cumulative.total_distance_m
    };
    let cards = [
        stat_card("Workouts", &cumulative.num_workouts.to_string()),
        stat_card("Total Distance", &format!("{:.0} {}", distance, unit)),
        stat_card("Total Time", &cumulative.total_time),
        stat_card(pace_label(cumulative.is_yard_pool), &cumulative.avg_pace),
        stat_card("Total Strokes", &cumulative.total_strokes.to_string()),
        stat_card("Total Laps", &cumulative.total_laps.to_string()),
    ]
    .concat();

    format!(
        concat!(
            r#"<div class="section-header"><h2>Cumulative</h2></div>"#,
            r#"<div class="stat-grid">{}</div>{}"#
        ),
        cards,
        breakdown_section(&merge_breakdowns(inputs)),
    )
}

const REPORT_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  color: #333; line-height: 1.6; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: white;
  border-radius: 20px; box-shadow: 0 20px 60px rgba(0,0,0,0.3); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  color: white; padding: 32px 40px; }
.header h1 { font-size: 2em; }
.content { padding: 32px 40px; }
.section-header { display: flex; justify-content: space-between;
  align-items: baseline; margin: 24px 0 12px; }
.filename { color: #888; font-size: 0.9em; }
.stat-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(150px, 1fr));
  gap: 14px; margin: 16px 0; }
.stat-card { background: #f7f8fc; border-radius: 12px; padding: 16px; text-align: center; }
.stat-value { font-size: 1.5em; font-weight: bold; color: #667eea; }
.stat-label { font-size: 0.85em; color: #777; }
.stroke-grid { display: flex; gap: 14px; flex-wrap: wrap; margin: 12px 0; }
.stroke-card { background: #f7f8fc; border-radius: 12px; padding: 12px 18px;
  display: flex; flex-direction: column; align-items: center; }
.stroke-glyph { font-size: 2em; }
.stroke-count { color: #777; font-size: 0.85em; }
.chart { margin: 20px 0; overflow-x: auto; }
h2 { color: #444; margin-top: 24px; }
table { width: 100%; border-collapse: collapse; margin: 12px 0; }
th, td { padding: 8px 12px; text-align: left; border-bottom: 1px solid #eee; }
th { background: #f7f8fc; color: #555; }
.tabs { display: flex; gap: 8px; padding: 16px 40px 0; background: #f0f1f7; }
.tab-button { border: none; background: #dfe2f0; padding: 10px 18px;
  border-radius: 10px 10px 0 0; cursor: pointer; font-size: 1em; }
.tab-button.active { background: white; font-weight: bold; color: #667eea; }
.tab-panel { display: none; }
.tab-panel.active { display: block; }
.footer { color: #999; font-size: 0.85em; padding: 16px 40px; text-align: right; }
"#;

const TAB_SCRIPT: &str = r#"
function showTab(index) {
  document.querySelectorAll('.tab-panel').forEach(function (panel, i) {
    panel.classList.toggle('active', i === index);
  });
  document.querySelectorAll('.tab-button').forEach(function (button, i) {
    button.classList.toggle('active', i === index);
  });
}
"#;

fn page(title: &str, tabs: &str, content: &str, generated_at: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="UTF-8">"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#,
            "<title>{title}</title><style>{style}</style></head><body>",
            r#"<div class="container"><div class="header"><h1>{title}</h1></div>{tabs}"#,
            r#"<div class="content">{content}</div>"#,
            r#"<div class="footer">Generated at {generated}</div></div>"#,
            "<script>{script}</script></body></html>"
        ),
        title = escape_html(title),
        style = REPORT_STYLE,
        tabs = tabs,
        content = content,
        generated = escape_html(generated_at),
        script = TAB_SCRIPT,
    )
}

/// Renders the full HTML report. One workout yields a single page; several
/// yield a tabbed page with one tab per workout plus a cumulative tab.
pub fn render(inputs: &[ReportInput], generated_at: &str) -> String {
    if inputs.len() == 1 {
        let body = format!(r#"<div class="tab-panel active">{}</div>"#, workout_body(&inputs[0]));
        return page("Swim Report", "", &body, generated_at);
    }

    let workouts: Vec<Workout> = inputs.iter().map(|i| i.workout.clone()).collect();
    let cumulative = accumulate(&workouts);

    let mut buttons = String::new();
    let mut panels = String::new();
    for (i, input) in inputs.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        buttons.push_str(&format!(
            r#"<button class="tab-button{}" onclick="showTab({})">Workout {}</button>"#,
            active,
            i,
            i + 1
        ));
        panels.push_str(&format!(
            r#"<div class="tab-panel{}">{}</div>"#,
            active,
            workout_body(input)
        ));
    }
    buttons.push_str(&format!(
        r#"<button class="tab-button" onclick="showTab({})">Cumulative</button>"#,
        inputs.len()
    ));
    panels.push_str(&format!(
        r#"<div class="tab-panel">{}</div>"#,
        cumulative_body(&cumulative, inputs)
    ));

    let tabs = format!(r#"<div class="tabs">{}</div>"#, buttons);
    page("Swim Report", &tabs, &panels, generated_at)
}

/// Stat card as standalone SVG, sized for rasterization.
pub fn summary_card_svg(title: &str, subtitle: &str, rows: &[(String, String)]) -> (String, u32, u32) {
    let height = CARD_HEADER_HEIGHT + rows.len() as u32 * CARD_ROW_HEIGHT + 24;
    let mut body = format!(
        concat!(
            r##"<rect width="{w}" height="{h}" rx="18" fill="#ffffff" stroke="#d8dbe8"/>"##,
            r##"<rect width="{w}" height="{hh}" rx="18" fill="#667eea"/>"##,
            r##"<text x="24" y="40" font-size="24" font-weight="bold" fill="#ffffff">{title}</text>"##,
            r##"<text x="24" y="68" font-size="14" fill="#e4e6ff">{subtitle}</text>"##
        ),
        w = CARD_WIDTH,
        h = height,
        hh = CARD_HEADER_HEIGHT,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
    );

    for (i, (label, value)) in rows.iter().enumerate() {
        let y = CARD_HEADER_HEIGHT + CARD_ROW_HEIGHT * (i as u32 + 1);
        body.push_str(&format!(
            concat!(
                r##"<text x="24" y="{y}" font-size="16" fill="#777777">{label}</text>"##,
                r##"<text x="{vx}" y="{y}" font-size="16" font-weight="bold" fill="#333333" text-anchor="end">{value}</text>"##
            ),
            y = y,
            vx = CARD_WIDTH - 24,
            label = escape_html(label),
            value = escape_html(value),
        ));
    }

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "#,
            r#"viewBox="0 0 {w} {h}" font-family="DejaVu Sans, Verdana, sans-serif">{body}</svg>"#
        ),
        w = CARD_WIDTH,
        h = height,
        body = body
    );
    (svg, CARD_WIDTH, height)
}

pub fn workout_card_rows(summary: &WorkoutSummary) -> Vec<(String, String)> {
    vec![
        ("Distance".to_string(), display_distance(summary)),
        ("Total Time".to_string(), summary.total_time.clone()),
        ("Active Time".to_string(), summary.active_time.clone()),
        ("Rest Time".to_string(), summary.rest_time.clone()),
        (pace_label(summary.is_yard_pool).to_string(), summary.avg_pace.clone()),
        ("Strokes".to_string(), summary.total_strokes.to_string()),
        ("Laps".to_string(), summary.num_laps.to_string()),
    ]
}

pub fn cumulative_card_rows(cumulative: &CumulativeSummary) -> Vec<(String, String)> {
    let unit = if cumulative.is_yard_pool { "yd" } else { "m" };
    let distance = if cumulative.is_yard_pool {
        cumulative.total_distance_yd
    } else {
        cumulative.total_distance_m
    };
    vec![
        ("Workouts".to_string(), cumulative.num_workouts.to_string()),
        ("Total Distance".to_string(), format!("{:.0} {}", distance, unit)),
        ("Total Time".to_string(), cumulative.total_time.clone()),
        (
            pace_label(cumulative.is_yard_pool).to_string(),
            cumulative.avg_pace.clone(),
        ),
        ("Total Strokes".to_string(), cumulative.total_strokes.to_string()),
        ("Total Laps".to_string(), cumulative.total_laps.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::summary::summarize;
    use crate::types::workout::SessionMetrics;

    fn sample_workout() -> Workout {
        let session = SessionMetrics {
            date: Some("2026-08-01".to_string()),
            total_distance_m: 1000.0,
            total_distance_yd: crate::units::meters_to_yards(1000.0),
            total_elapsed_time_s: 1200.0,
            total_time_formatted: Some("20:00".to_string()),
            total_calories: 310,
            pool_length_m: 25.0,
            pool_length_yd: crate::units::meters_to_yards(25.0),
            ..Default::default()
        };
        let laps = vec![
            LapMetrics {
                elapsed_time_s: 600.0,
                stroke_type: Some("freestyle".to_string()),
                ..Default::default()
            },
            LapMetrics {
                elapsed_time_s: 600.0,
                stroke_type: Some("backstroke".to_string()),
                ..Default::default()
            },
            LapMetrics {
                elapsed_time_s: 300.0,
                stroke_type: Some("freestyle".to_string()),
                ..Default::default()
            },
        ];
        let summary = summarize(&session, &laps, &[], &[]);
        Workout {
            session,
            laps,
            lengths: Vec::new(),
            records: Vec::new(),
            summary,
        }
    }

    #[test]
    fn breakdown_counts_laps_by_stroke() {
        let workout = sample_workout();
        let breakdown = stroke_breakdown(&workout.laps);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].stroke, "freestyle");
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].name, "Backstroke");
    }

    #[test]
    fn single_report_contains_stats_and_laps() {
        let workout = sample_workout();
        let html = render(
            &[ReportInput {
                filename: "morning.fit",
                workout: &workout,
            }],
            "2026-08-06 10:00:00",
        );
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("morning.fit"));
        assert!(html.contains("20:00"));
        assert!(html.contains("Stroke Breakdown"));
        assert!(html.contains("Laps"));
        assert!(!html.contains("<button"));
    }

    #[test]
    fn multi_report_has_tabs_and_cumulative() {
        let a = sample_workout();
        let b = sample_workout();
        let html = render(
            &[
                ReportInput {
                    filename: "a.fit",
                    workout: &a,
                },
                ReportInput {
                    filename: "b.fit",
                    workout: &b,
                },
            ],
            "2026-08-06 10:00:00",
        );
        assert!(html.contains("Workout 1"));
        assert!(html.contains("Workout 2"));
        assert!(html.contains("Cumulative"));
        // 1000 m + 1000 m across the two tabs.
        assert!(html.contains("2000 m"));
    }

    #[test]
    fn filenames_are_escaped() {
        let workout = sample_workout();
        let html = render(
            &[ReportInput {
                filename: "<script>alert(1)</script>.fit",
                workout: &workout,
            }],
            "now",
        );
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn summary_card_lists_rows() {
        let workout = sample_workout();
        let rows = workout_card_rows(&workout.summary);
        let (svg, w, h) = summary_card_svg("Swim Workout", "2026-08-01", &rows);
        assert!(svg.starts_with("<svg"));
        assert_eq!(w, 640);
        assert!(h > 300);
        assert!(svg.contains("Active Time"));
    }
}
