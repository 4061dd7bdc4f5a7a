//! A page of charts stacked vertically, each with its own initializer.
//!
//! The dashboard only knows page geometry. Scrolling feeds every chart's gate with the current
//! viewport and polling forwards the clock to each initializer.

use crate::config::PageConfig;
use crate::error::Result;
use crate::initializer::{ChartInitializer, InitEvent, InitState, SETTLE_DELAY};
use crate::surface::Surface;
use crate::timer::{Clock, ManualClock};
use crate::visibility::{GateOptions, Rect, VisibilityGate};
use std::time::Duration;

/// Vertical space between stacked charts.
pub const CHART_GAP: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct ChartSlot {
    pub initializer: ChartInitializer,
    /// Container position on the page.
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    title: String,
    width: f32,
    slots: Vec<ChartSlot>,
}

impl Dashboard {
    pub fn new(page: &PageConfig, width: f32, options: GateOptions) -> Self {
        Self::layout(page, width, |_| VisibilityGate::new(options))
    }

    /// Every chart renders as soon as it is polled, as if nothing observed the viewport.
    pub fn without_observer(page: &PageConfig, width: f32) -> Self {
        Self::layout(page, width, |_| VisibilityGate::always_visible())
    }

    fn layout(page: &PageConfig, width: f32, mut gate: impl FnMut(usize) -> VisibilityGate) -> Self {
        let mut y = 0.0;
        let slots = page
            .charts
            .iter()
            .enumerate()
            .map(|(i, config)| {
                let rect = Rect::new(0.0, y, width, config.height as f32);
                y += rect.height + CHART_GAP;
                ChartSlot {
                    initializer: ChartInitializer::with_gate(config.clone(), gate(i)),
                    rect,
                }
            })
            .collect();
        Self {
            title: page.title.clone(),
            width,
            slots,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    pub fn slot(&self, idx: &str) -> Option<&ChartSlot> {
        self.slots.iter().find(|s| s.initializer.config().idx == idx)
    }

    pub fn page_height(&self) -> f32 {
        self.slots
            .last()
            .map_or(0.0, |s| s.rect.y + s.rect.height)
    }

    /// Create every chart's container on `surface`.
    pub fn mount_all<S: Surface + ?Sized>(&self, surface: &mut S) {
        for slot in &self.slots {
            surface.mount(&slot.initializer.container_id());
        }
    }

    /// Report the viewport to every chart.
    pub fn scroll_to(&mut self, viewport: Rect, now: Duration) {
        for slot in &mut self.slots {
            slot.initializer.on_viewport(slot.rect, viewport, now);
        }
    }

    /// Poll every chart. The first error stops the pass.
    pub fn poll<S: Surface + ?Sized>(
        &mut self,
        now: Duration,
        surface: &mut S,
    ) -> Result<Vec<InitEvent>> {
        let mut events = Vec::new();
        for slot in &mut self.slots {
            events.extend(slot.initializer.poll(now, surface)?);
        }
        Ok(events)
    }

    /// Earliest pending timer across the page.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.slots
            .iter()
            .filter_map(|s| s.initializer.next_deadline())
            .min()
    }

    pub fn rendered(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.initializer.state() == InitState::Rendered)
            .count()
    }

    /// Scroll from top to bottom one viewport at a time, letting each position settle, then
    /// run every remaining timer. Used by the headless renderer.
    pub fn run_to_completion<S: Surface + ?Sized>(
        &mut self,
        clock: &ManualClock,
        surface: &mut S,
        viewport_height: f32,
    ) -> Result<Vec<InitEvent>> {
        let step = viewport_height.max(1.0);
        let mut events = Vec::new();
        let mut top = 0.0;
        loop {
            let viewport = Rect::new(0.0, top, self.width, step);
            self.scroll_to(viewport, clock.now());
            clock.advance(SETTLE_DELAY);
            events.extend(self.poll(clock.now(), surface)?);
            top += step;
            if top >= self.page_height() {
                break;
            }
        }
        while let Some(due) = self.next_deadline() {
            if due > clock.now() {
                clock.set(due);
            }
            events.extend(self.poll(clock.now(), surface)?);
        }
        log::info!("{} of {} charts rendered", self.rendered(), self.slots.len());
        Ok(events)
    }

    pub fn teardown(&mut self) {
        for slot in &mut self.slots {
            slot.initializer.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::models::Series;

    fn page(n: usize) -> PageConfig {
        let charts = (0..n)
            .map(|i| {
                ChartConfig::builder()
                    .idx(i.to_string())
                    .title("T")
                    .source("S")
                    .height(500)
                    .series(vec![Series::from_pairs("W", [("2018", Some(1.0))])])
                    .build()
                    .unwrap()
            })
            .collect();
        PageConfig {
            title: "Page".into(),
            charts,
        }
    }

    #[test]
    fn charts_stack_with_gaps() {
        let d = Dashboard::new(&page(3), 800.0, GateOptions::default());
        let ys: Vec<f32> = d.slots().iter().map(|s| s.rect.y).collect();
        assert_eq!(ys, vec![0.0, 540.0, 1080.0]);
        assert_eq!(d.page_height(), 1580.0);
        assert!(d.slot("2").is_some());
    }

    #[test]
    fn only_charts_in_view_go_pending() {
        let mut d = Dashboard::new(&page(3), 800.0, GateOptions::default());
        d.scroll_to(Rect::new(0.0, 0.0, 800.0, 600.0), Duration::ZERO);
        let states: Vec<InitState> = d.slots().iter().map(|s| s.initializer.state()).collect();
        assert_eq!(
            states,
            vec![InitState::Pending, InitState::Pending, InitState::Idle]
        );
        assert_eq!(d.next_deadline(), Some(SETTLE_DELAY));
    }

    #[test]
    fn without_observer_every_chart_goes_pending() {
        let mut d = Dashboard::without_observer(&page(3), 800.0);
        d.scroll_to(Rect::new(0.0, 10_000.0, 800.0, 600.0), Duration::ZERO);
        assert!(
            d.slots()
                .iter()
                .all(|s| s.initializer.state() == InitState::Pending)
        );
        assert_eq!(d.next_deadline(), Some(SETTLE_DELAY));
    }
}
