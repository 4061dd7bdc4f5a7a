/*!
 * Desktop viewer for trade-trends dashboard pages
 *
 * Opens a page file and shows its charts in one scrolling column. Each chart renders once it
 * has been on screen for the settle delay, draws in over the entrance animation and reveals its
 * end-point labels afterwards. Hovering a chart shows the shared tooltip.
 */

use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use trade_trends::surface::Frame;
use trade_trends::viz::layout::ChartLayout;
use trade_trends::{BitmapSurface, Clock, Dashboard, GateOptions, PageConfig, Rect, Surface};
use trade_trends::{ImageFormat, SystemClock, export, globals, viz};

const MIN_CHART_WIDTH: f32 = 400.0;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    if let Err(err) = globals::init(globals::GlobalOptions::default()) {
        log::warn!("{err}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Trade trends"),
        ..Default::default()
    };
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    eframe::run_native(
        "Trade trends",
        options,
        Box::new(|_cc| Ok(Box::new(TradeTrendsApp::new(initial)))),
    )
}

/// Uploaded frame plus the generation it was built from.
struct ChartTexture {
    generation: u64,
    texture: egui::TextureHandle,
    /// When the first frame arrived; drives the draw-in animation.
    shown_at: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Download {
    Png,
    Csv,
}

struct TradeTrendsApp {
    clock: SystemClock,
    page_path: Option<PathBuf>,
    pending_load: Option<PathBuf>,
    dashboard: Option<Dashboard>,
    surface: BitmapSurface,
    textures: HashMap<String, ChartTexture>,
    last_dir: PathBuf,

    status_message: String,
    error_message: String,
}

impl TradeTrendsApp {
    fn new(initial: Option<PathBuf>) -> Self {
        let last_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            clock: SystemClock::new(),
            page_path: None,
            pending_load: initial,
            dashboard: None,
            surface: BitmapSurface::new(1000),
            textures: HashMap::new(),
            last_dir,
            status_message: String::new(),
            error_message: String::new(),
        }
    }

    fn load_page(&mut self, path: PathBuf, width: f32) {
        match PageConfig::load(&path) {
            Ok(page) => {
                if let Some(mut old) = self.dashboard.take() {
                    old.teardown();
                }
                let width = width.max(MIN_CHART_WIDTH);
                self.surface = BitmapSurface::new(width as u32);
                self.textures.clear();
                let dashboard = Dashboard::new(&page, width, GateOptions::default());
                dashboard.mount_all(&mut self.surface);
                self.status_message = format!("{} charts", page.charts.len());
                self.error_message.clear();
                if let Some(dir) = path.parent() {
                    self.last_dir = dir.to_path_buf();
                }
                self.page_path = Some(path);
                self.dashboard = Some(dashboard);
            }
            Err(err) => {
                self.error_message = format!("Failed to load {}: {}", path.display(), err);
            }
        }
    }

    fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Page", &["json"])
            .set_directory(&self.last_dir)
            .pick_file()
        {
            self.pending_load = Some(path);
        }
    }

    /// Fire due timers and upload any new frames.
    fn tick(&mut self, ctx: &egui::Context) {
        let now = self.clock.now();
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        match dashboard.poll(now, &mut self.surface) {
            Ok(events) => {
                for ev in events {
                    log::debug!("{ev:?}");
                }
            }
            Err(err) => {
                self.error_message = err.to_string();
                dashboard.teardown();
            }
        }

        for slot in dashboard.slots() {
            let id = slot.initializer.container_id();
            let Some(frame) = self.surface.frame(&id) else {
                continue;
            };
            if frame.generation == 0 {
                continue;
            }
            let stale = self
                .textures
                .get(&id)
                .is_none_or(|t| t.generation != frame.generation);
            if stale {
                let image = egui::ColorImage::from_rgb(
                    [frame.width as usize, frame.height as usize],
                    &frame.rgb,
                );
                let shown_at = self.textures.get(&id).map_or(now, |t| t.shown_at);
                let texture = ctx.load_texture(&id, image, egui::TextureOptions::LINEAR);
                self.textures.insert(
                    id,
                    ChartTexture {
                        generation: frame.generation,
                        texture,
                        shown_at,
                    },
                );
            }
        }

        if let Some(due) = dashboard.next_deadline() {
            ctx.request_repaint_after(due.saturating_sub(now));
        }
    }

    fn download(&mut self, kind: Download, frame: &Frame) {
        let Some(chart) = frame.chart.as_ref() else {
            return;
        };
        let ext = match kind {
            Download::Png => "png",
            Download::Csv => "csv",
        };
        let Some(path) = self.save_dialog(&chart.container_id, ext) else {
            return;
        };
        let result = match kind {
            Download::Png => viz::draw_to_file(
                chart,
                &path,
                (frame.width, frame.height),
                ImageFormat::Png,
                1.0,
            ),
            Download::Csv => export::save_csv(&chart.config, &path),
        };
        match result {
            Ok(()) => self.status_message = format!("Saved {}", path.display()),
            Err(err) => self.error_message = format!("Failed to save {ext}: {err}"),
        }
    }

    fn save_dialog(&mut self, name: &str, ext: &str) -> Option<PathBuf> {
        let path = rfd::FileDialog::new()
            .set_directory(&self.last_dir)
            .set_file_name(format!("{name}.{ext}"))
            .save_file()?;
        if let Some(dir) = path.parent() {
            self.last_dir = dir.to_path_buf();
        }
        Some(path)
    }

    fn show_page(&mut self, ui: &mut egui::Ui) {
        let now = self.clock.now();
        let Some(dashboard) = self.dashboard.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label("Open a page file to view its charts.");
            });
            return;
        };
        let page_height = dashboard.page_height();
        let csv_hint = globals::options().download_csv;
        let mut animating = false;
        let mut clicked = Vec::new();

        egui::ScrollArea::vertical().show_viewport(ui, |ui, viewport| {
            ui.set_height(page_height);
            dashboard.scroll_to(
                Rect::new(viewport.min.x, viewport.min.y, viewport.width(), viewport.height()),
                now,
            );
            let origin = ui.min_rect().left_top();

            for slot in dashboard.slots() {
                let r = egui::Rect::from_min_size(
                    origin + egui::vec2(slot.rect.x, slot.rect.y),
                    egui::vec2(slot.rect.width, slot.rect.height),
                );
                if !ui.is_rect_visible(r) {
                    continue;
                }
                let id = slot.initializer.container_id();
                let painter = ui.painter();
                let Some(tex) = self.textures.get(&id) else {
                    painter.rect_stroke(r, 4.0, egui::Stroke::new(1.0, egui::Color32::from_gray(230)));
                    continue;
                };

                // Lines draw in from the left over the entrance animation.
                let animation = slot
                    .initializer
                    .chart()
                    .map_or(Duration::ZERO, |c| c.animation);
                let progress = if animation.is_zero() {
                    1.0
                } else {
                    (now.saturating_sub(tex.shown_at).as_secs_f32() / animation.as_secs_f32())
                        .min(1.0)
                };
                animating |= progress < 1.0;
                let opacity = self.surface.opacity(&id).unwrap_or(0.0);
                let shown = egui::Rect::from_min_max(
                    r.min,
                    egui::pos2(r.min.x + r.width() * progress, r.max.y),
                );
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(progress, 1.0));
                painter.image(
                    tex.texture.id(),
                    shown,
                    uv,
                    egui::Color32::WHITE.gamma_multiply(opacity),
                );

                let response = ui.interact(r, egui::Id::new(&id), egui::Sense::hover());
                if let (Some(pos), Some(frame)) = (response.hover_pos(), self.surface.frame(&id))
                    && let Some(chart) = frame.chart.as_ref()
                {
                    let layout = ChartLayout::compute(chart, frame.width, frame.height);
                    let x = (pos.x - r.min.x) * frame.width as f32 / r.width();
                    if let Some(text) = layout
                        .category_at(x, chart.categories.len())
                        .and_then(|i| chart.tooltip_text(i))
                    {
                        response.on_hover_text_at_pointer(text);
                    }
                }
                if let Some(frame) = self.surface.frame(&id)
                    && frame.chart.is_some()
                {
                    let btn = egui::vec2(48.0, 22.0);
                    let png = egui::Rect::from_min_size(r.right_bottom() - egui::vec2(104.0, 30.0), btn);
                    let csv = png.translate(egui::vec2(52.0, 0.0));
                    if ui
                        .put(png, egui::Button::new("PNG").small())
                        .on_hover_text("Download PNG image")
                        .clicked()
                    {
                        clicked.push((Download::Png, frame.clone()));
                    }
                    if ui
                        .put(csv, egui::Button::new("CSV").small())
                        .on_hover_text(csv_hint.as_str())
                        .clicked()
                    {
                        clicked.push((Download::Csv, frame.clone()));
                    }
                }
            }
        });

        for (kind, frame) in clicked {
            self.download(kind, &frame);
        }
        if animating {
            ui.ctx().request_repaint();
        }
    }
}

impl eframe::App for TradeTrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open page…").clicked() {
                    self.open_dialog();
                }
                if let Some(path) = &self.page_path {
                    ui.label(path.display().to_string());
                }
                if let Some(d) = &self.dashboard {
                    ui.separator();
                    ui.label(format!("{} of {} rendered", d.rendered(), d.slots().len()));
                }
            });
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(path) = self.pending_load.take() {
                self.load_page(path, ui.available_width() - 16.0);
            }
            if let Some(d) = &self.dashboard
                && !d.title().is_empty()
            {
                ui.heading(d.title());
                ui.add_space(10.0);
            }
            self.show_page(ui);
        });

        self.tick(ctx);
    }
}
