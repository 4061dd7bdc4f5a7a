//! Chart and page configuration.
//!
//! A [`ChartConfig`] is validated when built and never changes afterwards. Page files are JSON:
//!
//! ```json
//! { "title": "Global trade trends",
//!   "charts": [ { "idx": "1", "title": "Trade growth", "source": "UNCTAD",
//!                 "suffix": "%", "data": [ { "name": "World", "data": [...] } ] } ] }
//! ```

use crate::error::{ChartError, Result};
use crate::models::Series;
use crate::shaper::is_placeholder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_LINE_WIDTH: f64 = 5.0;
pub const DEFAULT_HEIGHT: u32 = 700;
pub const DEFAULT_Y_MIN: f64 = -20.0;
pub const DEFAULT_Y_MAX: f64 = 30.0;
pub const DEFAULT_COLORS: [&str; 2] = ["#009edb", "#72bf44"];

/// Shaded category range with a vertical caption (e.g. preliminary figures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotBand {
    pub from: f64,
    pub to: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_band_color")]
    pub color: String,
}

fn default_band_color() -> String {
    "#eeeeee".to_string()
}

/// Thin vertical separator at a category position (e.g. between years).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotLine {
    pub value: f64,
    #[serde(default = "default_plot_line_width")]
    pub width: u32,
}

fn default_plot_line_width() -> u32 {
    1
}

/// Image-like badge placed on the chart once it has loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub text: String,
    #[serde(default = "default_logo_x")]
    pub x: i32,
    #[serde(default = "default_logo_y")]
    pub y: i32,
    #[serde(default = "default_logo_w")]
    pub width: u32,
    #[serde(default = "default_logo_h")]
    pub height: u32,
}

fn default_logo_x() -> i32 {
    5
}
fn default_logo_y() -> i32 {
    15
}
fn default_logo_w() -> u32 {
    80
}
fn default_logo_h() -> u32 {
    100
}

/// Everything needed to draw one line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub idx: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub source: String,
    pub note: Option<String>,
    pub suffix: String,
    pub line_width: f64,
    pub allow_decimals: bool,
    pub show_first_label: bool,
    pub series: Vec<Series>,
    pub y_min: f64,
    pub y_max: f64,
    pub height: u32,
    pub plot_bands: Vec<PlotBand>,
    pub plot_lines: Vec<PlotLine>,
    pub logo: Option<Logo>,
    pub colors: Vec<String>,
}

impl ChartConfig {
    pub fn builder() -> ChartConfigBuilder {
        ChartConfigBuilder::default()
    }

    /// Id of the element the chart renders into.
    pub fn container_id(&self) -> String {
        format!("chartIdx{}", self.idx)
    }

    /// Color for the n-th drawn series, cycling through the palette.
    pub fn color(&self, n: usize) -> &str {
        &self.colors[n % self.colors.len()]
    }
}

/// Raw, unvalidated chart fields as they appear in a page file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartConfigBuilder {
    idx: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    source: Option<String>,
    note: Option<String>,
    suffix: Option<String>,
    line_width: Option<f64>,
    allow_decimals: Option<bool>,
    show_first_label: Option<bool>,
    #[serde(default, alias = "series")]
    data: Vec<Series>,
    y_min: Option<f64>,
    y_max: Option<f64>,
    height: Option<u32>,
    #[serde(default)]
    plot_bands: Vec<PlotBand>,
    #[serde(default)]
    plot_lines: Vec<PlotLine>,
    logo: Option<Logo>,
    colors: Option<Vec<String>>,
}

impl ChartConfigBuilder {
    pub fn idx(mut self, idx: impl Into<String>) -> Self {
        self.idx = Some(idx.into());
        self
    }
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
    pub fn line_width(mut self, w: f64) -> Self {
        self.line_width = Some(w);
        self
    }
    pub fn allow_decimals(mut self, v: bool) -> Self {
        self.allow_decimals = Some(v);
        self
    }
    pub fn show_first_label(mut self, v: bool) -> Self {
        self.show_first_label = Some(v);
        self
    }
    pub fn series(mut self, series: Vec<Series>) -> Self {
        self.data = series;
        self
    }
    pub fn y_range(mut self, min: f64, max: f64) -> Self {
        self.y_min = Some(min);
        self.y_max = Some(max);
        self
    }
    pub fn height(mut self, h: u32) -> Self {
        self.height = Some(h);
        self
    }
    pub fn plot_band(mut self, band: PlotBand) -> Self {
        self.plot_bands.push(band);
        self
    }
    pub fn plot_line(mut self, line: PlotLine) -> Self {
        self.plot_lines.push(line);
        self
    }
    pub fn logo(mut self, logo: Logo) -> Self {
        self.logo = Some(logo);
        self
    }
    pub fn colors(mut self, colors: Vec<String>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<ChartConfig> {
        let idx = required(self.idx, "idx")?;
        if !container_id_re().is_match(&idx) {
            return Err(ChartError::InvalidField {
                field: "idx",
                reason: format!("`{idx}` is not usable as an element id suffix"),
            });
        }
        let title = required(self.title, "title")?;
        let source = required(self.source, "source")?;

        let real = self.data.iter().filter(|s| !is_placeholder(s)).count();
        if real == 0 {
            return Err(ChartError::MissingField("data"));
        }
        if real > 2 {
            return Err(ChartError::SeriesCount(real));
        }

        let line_width = self.line_width.unwrap_or(DEFAULT_LINE_WIDTH);
        if !(line_width.is_finite() && line_width > 0.0) {
            return Err(invalid("line_width", "must be a positive number"));
        }
        let y_min = self.y_min.unwrap_or(DEFAULT_Y_MIN);
        let y_max = self.y_max.unwrap_or(DEFAULT_Y_MAX);
        if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
            return Err(invalid("y_min", "y_min must be below y_max"));
        }
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);
        if height < 200 {
            return Err(invalid("height", "must be at least 200 pixels"));
        }
        for band in &self.plot_bands {
            if band.from >= band.to {
                return Err(invalid("plot_bands", "band `from` must be below `to`"));
            }
        }

        let colors = self
            .colors
            .unwrap_or_else(|| DEFAULT_COLORS.iter().map(|c| c.to_string()).collect());
        if colors.is_empty() {
            return Err(invalid("colors", "palette is empty"));
        }
        if let Some(bad) = colors.iter().find(|c| parse_hex_color(c).is_none()) {
            return Err(invalid("colors", &format!("`{bad}` is not a #rrggbb color")));
        }

        Ok(ChartConfig {
            idx,
            title,
            subtitle: self.subtitle.filter(|s| !s.trim().is_empty()),
            source,
            note: self.note.filter(|s| !s.trim().is_empty()),
            suffix: self.suffix.unwrap_or_default(),
            line_width,
            allow_decimals: self.allow_decimals.unwrap_or(true),
            show_first_label: self.show_first_label.unwrap_or(true),
            series: self.data,
            y_min,
            y_max,
            height,
            plot_bands: self.plot_bands,
            plot_lines: self.plot_lines,
            logo: self.logo,
            colors,
        })
    }
}

fn required(v: Option<String>, field: &'static str) -> Result<String> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ChartError::MissingField(field)),
    }
}

fn invalid(field: &'static str, reason: &str) -> ChartError {
    ChartError::InvalidField {
        field,
        reason: reason.to_string(),
    }
}

fn container_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"))
}

/// Parse `#rrggbb` into components.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    title: String,
    charts: Vec<ChartConfigBuilder>,
}

/// A dashboard page: an ordered list of charts.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub title: String,
    pub charts: Vec<ChartConfig>,
}

impl PageConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawPage = serde_json::from_str(s)?;
        let charts = raw
            .charts
            .into_iter()
            .map(ChartConfigBuilder::build)
            .collect::<Result<Vec<_>>>()?;
        let mut seen = std::collections::BTreeSet::new();
        for c in &charts {
            if !seen.insert(c.idx.as_str()) {
                return Err(invalid("idx", &format!("duplicate chart idx `{}`", c.idx)));
            }
        }
        Ok(Self {
            title: raw.title,
            charts,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn chart(&self, idx: &str) -> Option<&ChartConfig> {
        self.charts.iter().find(|c| c.idx == idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Series {
        Series::from_pairs("World", [("2018", Some(3.0)), ("2019", Some(1.0))])
    }

    #[test]
    fn builds_with_defaults() {
        let cfg = ChartConfig::builder()
            .idx("1")
            .title("Trade growth")
            .source("UNCTAD")
            .series(vec![world()])
            .build()
            .unwrap();
        assert_eq!(cfg.container_id(), "chartIdx1");
        assert_eq!(cfg.line_width, 5.0);
        assert!(cfg.allow_decimals);
        assert!(cfg.show_first_label);
        assert_eq!(cfg.suffix, "");
        assert_eq!(cfg.subtitle, None);
        assert_eq!(cfg.color(2), "#009edb");
    }

    #[test]
    fn missing_fields_fail_fast() {
        let err = ChartConfig::builder()
            .idx("1")
            .source("UNCTAD")
            .series(vec![world()])
            .build()
            .unwrap_err();
        assert!(matches!(err, ChartError::MissingField("title")));

        let err = ChartConfig::builder()
            .idx("1")
            .title("  ")
            .source("UNCTAD")
            .series(vec![world()])
            .build()
            .unwrap_err();
        assert!(matches!(err, ChartError::MissingField("title")));

        let err = ChartConfig::builder()
            .title("T")
            .source("S")
            .series(vec![world()])
            .build()
            .unwrap_err();
        assert!(matches!(err, ChartError::MissingField("idx")));

        let err = ChartConfig::builder()
            .idx("1")
            .title("T")
            .source("S")
            .build()
            .unwrap_err();
        assert!(matches!(err, ChartError::MissingField("data")));
    }

    #[test]
    fn rejects_invalid_values() {
        let base = || {
            ChartConfig::builder()
                .idx("1")
                .title("T")
                .source("S")
                .series(vec![world()])
        };
        assert!(base().idx("a b").build().is_err());
        assert!(base().line_width(0.0).build().is_err());
        assert!(base().y_range(5.0, 5.0).build().is_err());
        assert!(base().colors(vec!["blue".into()]).build().is_err());
        assert!(base().height(10).build().is_err());
        assert!(base().series(vec![world(), world(), world()]).build().is_err());
    }

    #[test]
    fn parses_page_json() {
        let page = PageConfig::from_json_str(
            r##"{"title":"Trade","charts":[{"idx":"1","title":"Goods","source":"UNCTAD",
                "suffix":"%","line_width":4,"colors":["#112233"],
                "data":[{"name":"World","data":[{"name":"2018","y":"2.5"},{"name":"2019","y":"x"}]}]}]}"##,
        )
        .unwrap();
        let chart = page.chart("1").unwrap();
        assert_eq!(chart.suffix, "%");
        assert_eq!(chart.line_width, 4.0);
        assert_eq!(chart.series[0].data[0].y, Some(2.5));
        assert_eq!(chart.series[0].data[1].y, None);
    }

    #[test]
    fn duplicate_idx_rejected() {
        let chart = r#"{"idx":"1","title":"T","source":"S","data":[{"name":"W","data":[]}]}"#;
        let json = format!(r#"{{"charts":[{chart},{chart}]}}"#);
        assert!(PageConfig::from_json_str(&json).is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#009edb"), Some((0, 0x9e, 0xdb)));
        assert_eq!(parse_hex_color("009edb"), None);
        assert_eq!(parse_hex_color("#00"), None);
    }
}
