//! The render seam: a chart handle plus the surfaces that draw it.
//!
//! [`RenderedChart`] is what a surface receives and what the deferred passes mutate afterwards.
//! [`FileSurface`] writes SVG/PNG files per container, [`BitmapSurface`] keeps RGB frames in
//! memory for the desktop viewer.

use crate::config::{ChartConfig, Logo};
use crate::format::{self, TooltipRow};
use crate::models::DataPoint;
use crate::shaper::{ShapedSeries, is_placeholder};
use crate::viz;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entrance animation length; the label reveal waits slightly less than this after load.
pub const ENTRANCE_ANIMATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<DataPoint>,
    pub show_in_legend: bool,
    pub x_axis: usize,
    pub placeholder: bool,
}

/// A chart as handed to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub container_id: String,
    pub config: ChartConfig,
    /// Primary axis categories, from the first series.
    pub categories: Vec<String>,
    /// Secondary axis categories, from the placeholder.
    pub secondary_categories: Vec<String>,
    pub series: Vec<RenderedSeries>,
    pub legend_enabled: bool,
    pub overlays: Vec<Logo>,
    pub animation: Duration,
}

impl RenderedChart {
    /// Assemble the handle from a validated config and its shaped series.
    pub fn build(config: &ChartConfig, shaped: &ShapedSeries) -> Self {
        let series: Vec<RenderedSeries> = shaped
            .iter()
            .enumerate()
            .map(|(n, s)| RenderedSeries {
                name: s.name.clone(),
                color: config.color(n).to_string(),
                points: s.data.clone(),
                show_in_legend: s.show_in_legend,
                x_axis: s.x_axis,
                placeholder: is_placeholder(s),
            })
            .collect();
        let secondary_categories = shaped
            .iter()
            .find(|s| is_placeholder(s))
            .map(|s| s.categories())
            .unwrap_or_default();
        Self {
            container_id: config.container_id(),
            config: config.clone(),
            categories: shaped.primary().categories(),
            secondary_categories,
            legend_enabled: series.len() > 1,
            series,
            overlays: Vec::new(),
            animation: ENTRANCE_ANIMATION,
        }
    }

    /// Series drawn on the primary axis (the placeholder is never drawn).
    pub fn drawn_series(&self) -> impl Iterator<Item = &RenderedSeries> {
        self.series.iter().filter(|s| !s.placeholder)
    }

    /// Points whose data label is shown, with their series and category index.
    pub fn visible_labels(&self) -> impl Iterator<Item = (&RenderedSeries, usize, &DataPoint)> {
        self.drawn_series().flat_map(|s| {
            s.points
                .iter()
                .enumerate()
                .filter(|(_, p)| p.data_label.enabled && p.y.is_some())
                .map(move |(i, p)| (s, i, p))
        })
    }

    pub fn legend_items(&self) -> impl Iterator<Item = &RenderedSeries> {
        self.series.iter().filter(|s| s.show_in_legend)
    }

    /// Shared tooltip rows at a primary category index.
    pub fn tooltip_rows(&self, category: usize) -> Vec<TooltipRow> {
        self.drawn_series()
            .map(|s| TooltipRow {
                series_name: s.name.clone(),
                y: s.points.get(category).and_then(|p| p.y),
                color: s.color.clone(),
            })
            .collect()
    }

    pub fn tooltip_html(&self, category: usize) -> Option<String> {
        let label = self.categories.get(category)?;
        Some(format::tooltip_html(
            label,
            &self.tooltip_rows(category),
            &self.config.suffix,
        ))
    }

    pub fn tooltip_text(&self, category: usize) -> Option<String> {
        let label = self.categories.get(category)?;
        Some(format::tooltip_text(
            label,
            &self.tooltip_rows(category),
            &self.config.suffix,
        ))
    }
}

/// What a chart is drawn onto. Containers are addressed by element id.
pub trait Surface {
    fn has_container(&self, id: &str) -> bool;

    /// Create the element a chart will render into. Starts transparent.
    fn mount(&mut self, id: &str);

    fn unmount(&mut self, id: &str);

    /// Draw (or redraw) the chart into its container.
    fn draw(&mut self, chart: &RenderedChart) -> Result<()>;

    fn set_opacity(&mut self, id: &str, opacity: f32);

    fn opacity(&self, id: &str) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FileContainer {
    opacity: f32,
    draws: usize,
}

/// Writes `<out_dir>/<container id>.<ext>` on every draw.
#[derive(Debug, Clone)]
pub struct FileSurface {
    out_dir: PathBuf,
    format: ImageFormat,
    width: u32,
    height: Option<u32>,
    containers: BTreeMap<String, FileContainer>,
}

impl FileSurface {
    pub fn new(out_dir: impl Into<PathBuf>, format: ImageFormat, width: u32) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
            width,
            height: None,
            containers: BTreeMap::new(),
        }
    }

    /// Draw every chart at this height instead of its configured one.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.out_dir.join(format!("{id}.{}", self.format.extension()))
    }

    pub fn draw_count(&self, id: &str) -> usize {
        self.containers.get(id).map_or(0, |c| c.draws)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl Surface for FileSurface {
    fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    fn mount(&mut self, id: &str) {
        self.containers.entry(id.to_string()).or_default();
    }

    fn unmount(&mut self, id: &str) {
        self.containers.remove(id);
    }

    fn draw(&mut self, chart: &RenderedChart) -> Result<()> {
        let path = self.path_for(&chart.container_id);
        let size = (self.width, self.height.unwrap_or(chart.config.height));
        let format = self.format;
        let container = self
            .containers
            .get_mut(&chart.container_id)
            .ok_or_else(|| anyhow::anyhow!("no container `{}`", chart.container_id))?;
        viz::draw_to_file(chart, &path, size, format, container.opacity)?;
        container.draws += 1;
        log::debug!("drew {} to {}", chart.container_id, path.display());
        Ok(())
    }

    fn set_opacity(&mut self, id: &str, opacity: f32) {
        if let Some(c) = self.containers.get_mut(id) {
            c.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn opacity(&self, id: &str) -> Option<f32> {
        self.containers.get(id).map(|c| c.opacity)
    }
}

/// An RGB frame produced by [`BitmapSurface`].
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub opacity: f32,
    /// Bumped on every draw so viewers know when to re-upload.
    pub generation: u64,
    pub chart: Option<RenderedChart>,
}

/// Keeps one in-memory frame per container.
#[derive(Debug, Clone, Default)]
pub struct BitmapSurface {
    width: u32,
    frames: BTreeMap<String, Frame>,
}

impl BitmapSurface {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            frames: BTreeMap::new(),
        }
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.get(id)
    }

    /// Width used for subsequent draws.
    pub fn set_width(&mut self, width: u32) {
        self.width = width.max(200);
    }
}

impl Surface for BitmapSurface {
    fn has_container(&self, id: &str) -> bool {
        self.frames.contains_key(id)
    }

    fn mount(&mut self, id: &str) {
        self.frames.entry(id.to_string()).or_default();
    }

    fn unmount(&mut self, id: &str) {
        self.frames.remove(id);
    }

    fn draw(&mut self, chart: &RenderedChart) -> Result<()> {
        let width = self.width;
        let frame = self
            .frames
            .get_mut(&chart.container_id)
            .ok_or_else(|| anyhow::anyhow!("no container `{}`", chart.container_id))?;
        let height = chart.config.height;
        // Frames are stored fully opaque; the viewer applies the container opacity.
        frame.rgb = viz::draw_to_rgb(chart, width, height, 1.0)?;
        frame.width = width;
        frame.height = height;
        frame.generation += 1;
        frame.chart = Some(chart.clone());
        Ok(())
    }

    fn set_opacity(&mut self, id: &str, opacity: f32) {
        if let Some(f) = self.frames.get_mut(id) {
            f.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn opacity(&self, id: &str) -> Option<f32> {
        self.frames.get(id).map(|f| f.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Series;
    use crate::shaper::shape;

    fn chart() -> RenderedChart {
        let config = ChartConfig::builder()
            .idx("7")
            .title("Trade")
            .source("UNCTAD")
            .suffix("%")
            .series(vec![
                Series::from_pairs("World (goods)", [("Q1 2018", Some(1.4)), ("Q2 2018", None)]),
                Series::from_pairs("Developing", [("Q1 2018", Some(2.0)), ("Q2 2018", Some(3.0))]),
            ])
            .build()
            .unwrap();
        let shaped = shape(&config.series).unwrap();
        RenderedChart::build(&config, &shaped)
    }

    #[test]
    fn build_assigns_axes_and_colors() {
        let c = chart();
        assert_eq!(c.container_id, "chartIdx7");
        assert_eq!(c.categories, vec!["Q1 2018", "Q2 2018"]);
        assert_eq!(c.secondary_categories.len(), 5);
        assert_eq!(c.series.len(), 3);
        assert_eq!(c.series[0].color, "#009edb");
        assert_eq!(c.series[1].color, "#72bf44");
        assert!(c.series[2].placeholder);
        assert_eq!(c.drawn_series().count(), 2);
        assert_eq!(c.legend_items().count(), 2);
        assert!(c.legend_enabled);
    }

    #[test]
    fn tooltip_reads_shared_category() {
        let c = chart();
        assert_eq!(c.tooltip_text(0).unwrap(), "Q1 2018\nWorld: 1%\nDeveloping: 2%");
        assert_eq!(c.tooltip_text(1).unwrap(), "Q2 2018\nDeveloping: 3%");
        assert!(c.tooltip_html(9).is_none());
    }

    #[test]
    fn only_revealed_labels_with_values_are_visible() {
        let mut c = chart();
        assert_eq!(c.visible_labels().count(), 0);
        crate::initializer::reveal_end_labels(&mut c.series);
        let shown: Vec<(&str, usize)> = c
            .visible_labels()
            .map(|(s, i, _)| (s.name.as_str(), i))
            .collect();
        // World's last point is a gap, so it has no label to show.
        assert_eq!(shown, vec![("World (goods)", 0), ("Developing", 0), ("Developing", 1)]);
    }

    #[test]
    fn file_surface_requires_mounted_container() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = FileSurface::new(dir.path(), ImageFormat::Svg, 800);
        let c = chart();
        assert!(!surface.has_container(&c.container_id));
        assert!(surface.draw(&c).is_err());
        surface.mount(&c.container_id);
        surface.set_opacity(&c.container_id, 3.0);
        assert_eq!(surface.opacity(&c.container_id), Some(1.0));
        surface.draw(&c).unwrap();
        assert_eq!(surface.draw_count(&c.container_id), 1);
        assert!(surface.path_for(&c.container_id).exists());
    }
}
