//! Pixel layout of a chart: header, plot rectangle, caption.
//!
//! The same numbers drive drawing and pointer hit-testing in the viewer.

use super::text::{strip_markup, wrap_text_to_width};
use super::util::compute_left_label_area_px;
use crate::surface::RenderedChart;

pub const MARGIN: i32 = 16;
/// Left inset of title and subtitle, leaving room for the logo badge.
pub const HEADER_X: i32 = 100;
pub const BOTTOM_LABEL_AREA: i32 = 56;
pub const CAPTION_FONT_PX: u32 = 14;
pub const CAPTION_LINE_PX: i32 = 18;
pub const CAPTION_MARGIN: i32 = 15;
pub const SUBTITLE_FONT_PX: u32 = 16;
pub const SUBTITLE_LINE_PX: i32 = 18;
pub const Y_LABEL_FONT_PX: u32 = 16;
pub const X_LABEL_FONT_PX: u32 = 14;
pub const DATA_LABEL_FONT_PX: u32 = 18;
pub const LEGEND_FONT_PX: u32 = 14;

/// Default caption note for quarterly trade charts when none is configured.
pub const DEFAULT_NOTE: &str = "Quarterly growth is the quarter over quarter growth rate of \
seasonally adjusted values. Annual growth refers to the last four quarters.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: i32,
    pub height: i32,
    pub title_font_px: u32,
    pub title_line_px: i32,
    pub title_lines: Vec<String>,
    pub subtitle_lines: Vec<String>,
    pub caption_lines: Vec<String>,
    pub header_h: i32,
    pub caption_h: i32,
    pub left_label_w: i32,
    /// Plot rectangle in absolute pixels: left, top, right, bottom.
    pub plot: (i32, i32, i32, i32),
}

/// Caption text: source citation followed by the note.
pub fn caption_text(chart: &RenderedChart) -> String {
    let note = chart.config.note.as_deref().unwrap_or(DEFAULT_NOTE);
    format!(
        "Source: {} \nNote: {}",
        strip_markup(&chart.config.source),
        strip_markup(note)
    )
}

impl ChartLayout {
    pub fn compute(chart: &RenderedChart, width: u32, height: u32) -> Self {
        let width = width as i32;
        let height = height as i32;
        // Narrow charts get a smaller title with less spacing.
        let (title_font_px, title_line_px) = if width <= 500 { (26, 30) } else { (30, 34) };
        let title_margin = if width <= 630 { 10 } else { 40 };

        let header_w = (width - HEADER_X - 60).max(80) as u32;
        let title_lines = wrap_text_to_width(&chart.config.title, title_font_px, header_w);
        let subtitle_lines = chart
            .config
            .subtitle
            .as_deref()
            .map(|s| wrap_text_to_width(s, SUBTITLE_FONT_PX, header_w))
            .unwrap_or_default();
        let header_h = MARGIN
            + title_lines.len() as i32 * title_line_px
            + subtitle_lines.len() as i32 * SUBTITLE_LINE_PX
            + title_margin
            + if chart.legend_enabled { 24 } else { 0 };

        let caption_w = (width - 2 * MARGIN).max(80) as u32;
        let caption_lines: Vec<String> = caption_text(chart)
            .lines()
            .flat_map(|l| wrap_text_to_width(l, CAPTION_FONT_PX, caption_w))
            .collect();
        let caption_h = CAPTION_MARGIN + caption_lines.len() as i32 * CAPTION_LINE_PX + MARGIN;

        let left_label_w = compute_left_label_area_px(
            chart.config.y_min,
            chart.config.y_max,
            &chart.config.suffix,
            Y_LABEL_FONT_PX,
        ) as i32;

        let left = MARGIN + left_label_w;
        let right = (width - MARGIN).max(left + 1);
        let top = header_h;
        let bottom = (height - caption_h - BOTTOM_LABEL_AREA).max(top + 1);

        Self {
            width,
            height,
            title_font_px,
            title_line_px,
            title_lines,
            subtitle_lines,
            caption_lines,
            header_h,
            caption_h,
            left_label_w,
            plot: (left, top, right, bottom),
        }
    }

    pub fn plot_width(&self) -> i32 {
        self.plot.2 - self.plot.0
    }

    /// Primary category under pixel column `x`, if it falls inside the plot.
    pub fn category_at(&self, x: f32, categories: usize) -> Option<usize> {
        let (left, _, right, _) = self.plot;
        if categories == 0 || x < left as f32 || x >= right as f32 {
            return None;
        }
        let frac = (x - left as f32) / (right - left) as f32;
        Some(((frac * categories as f32) as usize).min(categories - 1))
    }

    /// Pixel center of the n-th of `count` evenly spaced slots across the plot.
    pub fn slot_center_x(&self, n: usize, count: usize) -> i32 {
        let (left, _, right, _) = self.plot;
        let slot = (right - left) as f32 / count.max(1) as f32;
        left + (slot * (n as f32 + 0.5)) as i32
    }
}
