//! Utility functions for visualization: colors, label spacing, axis gutters.

use crate::config::parse_hex_color;
use crate::format::axis_label;
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Body text: black at 80%.
pub const TEXT: RGBAColor = RGBAColor(0, 0, 0, 0.8);
/// Dotted horizontal grid and category separators.
pub const GRID: RGBAColor = RGBAColor(124, 112, 103, 0.2);
/// Zero line on the value axis.
pub const ZERO_LINE: RGBAColor = RGBAColor(124, 112, 103, 0.6);
/// Category axis line.
pub const AXIS_LINE: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// Series color from `#rrggbb`, faded by `opacity`. Unparseable input falls back to black.
pub fn series_color(hex: &str, opacity: f32) -> RGBAColor {
    let (r, g, b) = parse_hex_color(hex).unwrap_or((0, 0, 0));
    RGBAColor(r, g, b, opacity.clamp(0.0, 1.0) as f64)
}

/// Show every n-th category label so neighbours do not overlap.
pub fn category_label_step(labels: &[&str], plot_w_px: i32, font_px: u32) -> usize {
    if labels.is_empty() || plot_w_px <= 0 {
        return 1;
    }
    let slot = plot_w_px as f32 / labels.len() as f32;
    let widest = labels
        .iter()
        .map(|l| estimate_text_width_px(l, font_px) + 8)
        .max()
        .unwrap_or(0) as f32;
    (widest / slot).ceil().max(1.0) as usize
}

/// Left gutter wide enough for the widest value-axis label, clamped to a sensible range.
pub fn compute_left_label_area_px(y_min: f64, y_max: f64, suffix: &str, font_px: u32) -> u32 {
    let widest = [y_min, y_max, (y_min + y_max) / 2.0]
        .iter()
        .filter_map(|v| axis_label(*v, suffix, true))
        .map(|s| estimate_text_width_px(&s, font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(18).clamp(48, 140)
}

/// Split a series into drawable polylines over `y_min..=y_max`. Gaps end a line, and segments
/// leaving the range are cut where they cross its edge, so out-of-range values are never drawn
/// at a wrong height. Point `i` sits at `x = i`.
pub fn clip_line(values: &[Option<f64>], y_min: f64, y_max: f64) -> Vec<Vec<(f64, f64)>> {
    let inside = |v: f64| (y_min..=y_max).contains(&v);
    let mut runs = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();
    let mut prev: Option<(f64, f64)> = None;
    for (i, y) in values.iter().enumerate() {
        let Some(v) = *y else {
            if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
            prev = None;
            continue;
        };
        let p = (i as f64, v);
        match prev {
            None if inside(v) => run.push(p),
            None => {}
            Some(a) => match clip_segment(a, p, y_min, y_max) {
                Some((start, end)) => {
                    if run.last() != Some(&start) {
                        if !run.is_empty() {
                            runs.push(std::mem::take(&mut run));
                        }
                        run.push(start);
                    }
                    run.push(end);
                }
                None if !run.is_empty() => runs.push(std::mem::take(&mut run)),
                None => {}
            },
        }
        prev = Some(p);
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

/// The part of segment `a -> b` inside the horizontal band, if any.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    y_min: f64,
    y_max: f64,
) -> Option<((f64, f64), (f64, f64))> {
    let dy = b.1 - a.1;
    if dy == 0.0 {
        return (y_min..=y_max).contains(&a.1).then_some((a, b));
    }
    let t_lo = (y_min - a.1) / dy;
    let t_hi = (y_max - a.1) / dy;
    let t0 = t_lo.min(t_hi).max(0.0);
    let t1 = t_lo.max(t_hi).min(1.0);
    if t0 >= t1 {
        return None;
    }
    let at = |t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            (a.0 + t * (b.0 - a.0), a.1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_fade_with_opacity() {
        let c = series_color("#009edb", 0.5);
        assert_eq!((c.0, c.1, c.2), (0, 0x9e, 0xdb));
        assert!((c.3 - 0.5).abs() < 1e-6);
        assert_eq!(series_color("nope", 2.0).3, 1.0);
    }

    #[test]
    fn label_step_grows_when_crowded() {
        let labels = ["Q1", "Q2", "Q3", "Q4"];
        assert_eq!(category_label_step(&labels, 800, 14), 1);
        assert!(category_label_step(&labels, 40, 14) > 1);
    }

    #[test]
    fn gutter_is_clamped() {
        assert_eq!(compute_left_label_area_px(-20.0, 30.0, "%", 16), 57);
        assert_eq!(compute_left_label_area_px(0.0, 1.0, "", 1), 48);
    }

    #[test]
    fn lines_are_cut_at_the_plot_edge() {
        let runs = clip_line(&[Some(0.0), Some(30.0), Some(0.0)], -20.0, 20.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0][0], (0.0, 0.0));
        assert!((runs[0][1].0 - 2.0 / 3.0).abs() < 1e-9);
        assert!((runs[0][1].1 - 20.0).abs() < 1e-9);
        assert!((runs[1][0].0 - 4.0 / 3.0).abs() < 1e-9);
        assert!((runs[1][0].1 - 20.0).abs() < 1e-9);
        assert_eq!(runs[1][1], (2.0, 0.0));
        // Nothing is drawn at the out-of-range point itself.
        assert!(runs.iter().flatten().all(|&(x, _)| x != 1.0));
    }

    #[test]
    fn gaps_and_outside_stretches_split_runs() {
        let runs = clip_line(
            &[Some(1.0), Some(2.0), None, Some(3.0), Some(50.0), Some(60.0), Some(4.0)],
            -20.0,
            20.0,
        );
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(runs[1].len(), 2);
        assert_eq!(runs[1][0], (3.0, 3.0));
        assert_eq!(runs[2].last(), Some(&(6.0, 4.0)));
        assert!(clip_line(&[Some(25.0), Some(40.0)], -20.0, 20.0).is_empty());
    }
}
