//! Visualization: draw a [`RenderedChart`] to **SVG**, **PNG**, or an in-memory RGB buffer.
//!
//! - Category x-axis with first-word tick labels and a secondary row of placeholder categories
//! - Fixed value range with suffixed, optionally integer-only tick labels
//! - Plot bands, category separators, zero line
//! - End-point data labels once revealed, top-right legend, download icon, logo badge

pub mod layout;
pub mod text;
pub mod util;

use crate::format::{axis_label, category_label, format_value};
use crate::globals::{self, PathCommand};
use crate::surface::{ImageFormat, RenderedChart};
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontFamily, FontStyle, FontTransform};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use layout::{
    CAPTION_FONT_PX, CAPTION_LINE_PX, CAPTION_MARGIN, ChartLayout, DATA_LABEL_FONT_PX, HEADER_X,
    LEGEND_FONT_PX, MARGIN, SUBTITLE_FONT_PX, SUBTITLE_LINE_PX, X_LABEL_FONT_PX, Y_LABEL_FONT_PX,
};
use text::estimate_text_width_px;
use util::{AXIS_LINE, GRID, TEXT, ZERO_LINE, category_label_step, clip_line, series_color};

/// One-time registration of the bundled fonts for the `ab_glyph` text path,
/// which does not discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let regular = plotters::style::register_font(
            "sans-serif",
            FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
        let bold = plotters::style::register_font(
            "sans-serif",
            FontStyle::Bold,
            include_bytes!("../../assets/DejaVuSans-Bold.ttf"),
        );
        if regular.is_err() || bold.is_err() {
            log::warn!("bundled fonts failed to register; text may be missing");
        }
    });
}

/// Render to `path` as SVG or PNG at `(width, height)` pixels.
pub fn draw_to_file<P: AsRef<Path>>(
    chart: &RenderedChart,
    path: P,
    (width, height): (u32, u32),
    format: ImageFormat,
    opacity: f32,
) -> Result<()> {
    ensure_fonts_registered();
    let path_string = path.as_ref().to_string_lossy().into_owned();
    match format {
        ImageFormat::Svg => {
            let root =
                SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
            draw_chart(root, chart, opacity)
        }
        ImageFormat::Png => {
            let root =
                BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
            draw_chart(root, chart, opacity)
        }
    }
}

/// Render into a fresh RGB buffer of `width * height * 3` bytes.
pub fn draw_to_rgb(chart: &RenderedChart, width: u32, height: u32, opacity: f32) -> Result<Vec<u8>> {
    ensure_fonts_registered();
    let mut buf = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_chart(root, chart, opacity)?;
    }
    Ok(buf)
}

fn text_style(px: u32, color: RGBAColor, h: HPos, v: VPos) -> TextStyle<'static> {
    (FontFamily::SansSerif, px)
        .into_font()
        .color(&color)
        .pos(Pos::new(h, v))
}

fn bold_style(px: u32, color: RGBAColor, h: HPos, v: VPos) -> TextStyle<'static> {
    (FontFamily::SansSerif, px)
        .into_font()
        .style(FontStyle::Bold)
        .color(&color)
        .pos(Pos::new(h, v))
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, chart: &RenderedChart, opacity: f32) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = root.dim_in_pixel();
    let layout = ChartLayout::compute(chart, w, h);
    let cfg = &chart.config;
    let (plot_left, plot_top, plot_right, plot_bottom) = layout.plot;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    // ----------------------------
    // 1) Header: title, subtitle
    // ----------------------------
    let mut y = MARGIN;
    let title_style = bold_style(layout.title_font_px, BLACK.to_rgba(), HPos::Left, VPos::Top);
    for line in &layout.title_lines {
        root.draw(&Text::new(line.as_str(), (HEADER_X, y), title_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += layout.title_line_px;
    }
    let subtitle_style = text_style(SUBTITLE_FONT_PX, TEXT, HPos::Left, VPos::Top);
    for line in &layout.subtitle_lines {
        root.draw(&Text::new(line.as_str(), (HEADER_X, y), subtitle_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += SUBTITLE_LINE_PX;
    }

    // ----------------------------
    // 2) Plot frame and value axis
    // ----------------------------
    let n = chart.categories.len().max(1);
    let x_min = -0.5f64;
    let x_max = n as f64 - 0.5;
    let (y_min, y_max) = (cfg.y_min, cfg.y_max);

    let body = root.margin(
        layout.header_h,
        layout.caption_h,
        MARGIN,
        MARGIN,
    );
    let mut cc = ChartBuilder::on(&body)
        .set_label_area_size(LabelAreaPosition::Left, layout.left_label_w)
        .set_label_area_size(LabelAreaPosition::Bottom, layout::BOTTOM_LABEL_AREA)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let suffix = cfg.suffix.as_str();
    let y_label_fmt = |v: &f64| {
        if !cfg.show_first_label && (*v - y_min).abs() < 1e-9 {
            return String::new();
        }
        axis_label(*v, suffix, cfg.allow_decimals).unwrap_or_default()
    };

    cc.configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .y_labels(11)
        .y_label_formatter(&y_label_fmt)
        .y_label_style(text_style(Y_LABEL_FONT_PX, BLACK.to_rgba(), HPos::Right, VPos::Center))
        .bold_line_style(GRID.stroke_width(1))
        .light_line_style(TRANSPARENT.stroke_width(1))
        .axis_style(TRANSPARENT.stroke_width(1))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    // Bands go under everything else.
    for band in &cfg.plot_bands {
        let color = util::series_color(&band.color, 1.0);
        cc.draw_series(std::iter::once(Rectangle::new(
            [(band.from, y_min), (band.to, y_max)],
            color.filled(),
        )))
        .map_err(|e| anyhow!("{:?}", e))?;
        if let Some(label) = band.label.as_deref() {
            let (px, py) = cc.backend_coord(&(band.from, (y_min + y_max) / 2.0));
            let font = (FontFamily::SansSerif, X_LABEL_FONT_PX)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&TEXT);
            root.draw(&Text::new(label, (px + 15, py + 80), font))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    for line in &cfg.plot_lines {
        cc.draw_series(std::iter::once(PathElement::new(
            vec![(line.value, y_min), (line.value, y_max)],
            GRID.stroke_width(line.width),
        )))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    if y_min <= 0.0 && 0.0 <= y_max {
        cc.draw_series(std::iter::once(PathElement::new(
            vec![(x_min, 0.0), (x_max, 0.0)],
            ZERO_LINE.stroke_width(1),
        )))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    // ----------------------------
    // 3) Category axes
    // ----------------------------
    root.draw(&PathElement::new(
        vec![(plot_left, plot_bottom), (plot_right, plot_bottom)],
        AXIS_LINE.stroke_width(1),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let short: Vec<&str> = chart.categories.iter().map(|c| category_label(c)).collect();
    let step = category_label_step(&short, layout.plot_width(), X_LABEL_FONT_PX);
    let x_style = text_style(X_LABEL_FONT_PX, TEXT, HPos::Center, VPos::Top);
    for (i, label) in short.iter().enumerate() {
        let (px, _) = cc.backend_coord(&(i as f64, y_min));
        root.draw(&PathElement::new(
            vec![(px, plot_bottom), (px, plot_bottom + 5)],
            AXIS_LINE.stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        if i % step == 0 {
            root.draw(&Text::new(*label, (px, plot_bottom + 10), x_style.clone()))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    let secondary_style = bold_style(X_LABEL_FONT_PX, TEXT, HPos::Center, VPos::Top);
    let m = chart.secondary_categories.len();
    for (j, label) in chart.secondary_categories.iter().enumerate() {
        let px = layout.slot_center_x(j, m);
        root.draw(&Text::new(
            label.as_str(),
            (px, plot_bottom + 30),
            secondary_style.clone(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    // ----------------------------
    // 4) Series lines (gaps and the plot edge split a line into runs)
    // ----------------------------
    let stroke = cfg.line_width.round().max(1.0) as u32;
    for s in chart.drawn_series() {
        let color = series_color(&s.color, opacity);
        let values: Vec<Option<f64>> = s.points.iter().map(|p| p.y).collect();
        for r in clip_line(&values, y_min, y_max) {
            cc.draw_series(LineSeries::new(r, color.stroke_width(stroke)))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    // Revealed end-point labels.
    for (s, i, p) in chart.visible_labels() {
        let Some(v) = p.y.filter(|v| (y_min..=y_max).contains(v)) else {
            continue;
        };
        let style = text_style(
            DATA_LABEL_FONT_PX,
            series_color(&s.color, opacity),
            HPos::Center,
            VPos::Bottom,
        );
        let (px, py) = cc.backend_coord(&(i as f64, v));
        root.draw(&Text::new(
            format_value(Some(v), suffix),
            (px, py + p.data_label.y as i32),
            style,
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    // ----------------------------
    // 5) Legend (top right, horizontal)
    // ----------------------------
    if chart.legend_enabled {
        let items: Vec<_> = chart.legend_items().collect();
        let item_w = |name: &str| 24 + 6 + estimate_text_width_px(name, LEGEND_FONT_PX) as i32 + 20;
        let total: i32 = items.iter().map(|s| item_w(&s.name)).sum();
        let mut x = (plot_right - total).max(MARGIN);
        let y = plot_top - 14;
        let legend_style = text_style(LEGEND_FONT_PX, BLACK.to_rgba(), HPos::Left, VPos::Center);
        for s in items {
            let color = series_color(&s.color, 1.0);
            root.draw(&PathElement::new(
                vec![(x, y), (x + 24, y)],
                color.stroke_width(4),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            root.draw(&Text::new(s.name.as_str(), (x + 30, y), legend_style.clone()))
                .map_err(|e| anyhow!("{:?}", e))?;
            x += item_w(&s.name);
        }
    }

    // ----------------------------
    // 6) Caption, export icon, overlays
    // ----------------------------
    let caption_style = text_style(CAPTION_FONT_PX, TEXT, HPos::Left, VPos::Top);
    let mut cy = h as i32 - layout.caption_h + CAPTION_MARGIN;
    for line in &layout.caption_lines {
        root.draw(&Text::new(line.as_str(), (MARGIN, cy), caption_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        cy += CAPTION_LINE_PX;
    }

    // The icon appears once `globals::init` has registered it.
    if let Some(symbol) = globals::symbol("download") {
        let (x, y, s) = (w as f64 - MARGIN as f64 - 20.0, MARGIN as f64, 20.0);
        draw_symbol(&root, &symbol(x, y, s, s))?;
    }

    for logo in &chart.overlays {
        let (x, y) = (logo.x, logo.y);
        let (lw, lh) = (logo.width as i32, logo.height as i32);
        root.draw(&Rectangle::new(
            [(x, y), (x + lw, y + lh)],
            RGBColor(0, 0x77, 0xb8).filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            logo.text.as_str(),
            (x + lw / 2, y + lh / 2),
            bold_style(14, WHITE.to_rgba(), HPos::Center, VPos::Center),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Stroke a registered symbol path; each `MoveTo` starts a new polyline.
fn draw_symbol<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, path: &[PathCommand]) -> Result<()> {
    let mut polylines: Vec<Vec<(i32, i32)>> = Vec::new();
    for cmd in path {
        match *cmd {
            PathCommand::MoveTo(x, y) => polylines.push(vec![(x as i32, y as i32)]),
            PathCommand::LineTo(x, y) => match polylines.last_mut() {
                Some(line) => line.push((x as i32, y as i32)),
                None => polylines.push(vec![(x as i32, y as i32)]),
            },
        }
    }
    for line in polylines.into_iter().filter(|l| l.len() > 1) {
        root.draw(&PathElement::new(line, BLACK.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
