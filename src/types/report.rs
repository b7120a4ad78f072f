use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Png,
}

impl ReportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Png => "image/png",
        }
    }
}

/// Lap-count-by-stroke display annotation attached by the report layer.
#[derive(Debug, Clone, Serialize)]
pub struct StrokeCount {
    pub stroke: String,
    pub name: String,
    pub glyph: &'static str,
    pub count: u32,
}
