//! Lazy, two-phase chart initialization.
//!
//! ```text
//! Idle --visible--> Pending --300ms--> Rendered --load + 2800ms--> (labels revealed)
//!   ^                  |
//!   +----not visible---+            any state --teardown--> TornDown
//! ```
//!
//! The surface is asked to render a chart at most once per initializer. Teardown cancels
//! whatever timer is still pending. A chart whose first draw fails is torn down.

use crate::config::ChartConfig;
use crate::error::{ChartError, Result};
use crate::shaper::shape;
use crate::surface::{RenderedChart, RenderedSeries, Surface};
use crate::timer::{TimerId, TimerQueue};
use crate::visibility::{GateOptions, Rect, VisibilityGate};
use std::time::Duration;

/// Debounce between becoming visible and rendering.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);
/// Wait after the load signal before stamping end-point labels.
pub const LABEL_REVEAL_DELAY: Duration = Duration::from_millis(2800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Idle,
    Pending,
    Rendered,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Settle,
    LabelReveal,
}

/// What a call to [`ChartInitializer::poll`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitEvent {
    Rendered { container_id: String },
    LabelsRevealed { container_id: String, labels: usize },
}

#[derive(Debug, Clone)]
pub struct ChartInitializer {
    config: ChartConfig,
    gate: VisibilityGate,
    state: InitState,
    timers: TimerQueue<TimerKind>,
    settle: Option<TimerId>,
    chart: Option<RenderedChart>,
    render_count: usize,
}

impl ChartInitializer {
    pub fn new(config: ChartConfig, options: GateOptions) -> Self {
        Self::with_gate(config, VisibilityGate::new(options))
    }

    /// Use a prepared gate, e.g. [`VisibilityGate::always_visible`] when nothing observes
    /// the viewport.
    pub fn with_gate(config: ChartConfig, gate: VisibilityGate) -> Self {
        Self {
            config,
            gate,
            state: InitState::Idle,
            timers: TimerQueue::new(),
            settle: None,
            chart: None,
            render_count: 0,
        }
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn container_id(&self) -> String {
        self.config.container_id()
    }

    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    /// The live chart handle after rendering.
    pub fn chart(&self) -> Option<&RenderedChart> {
        self.chart.as_ref()
    }

    /// How often the surface was asked to render this chart: 0 or 1.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// When the next pending timer is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Feed one viewport observation for the chart's container.
    pub fn on_visibility(&mut self, intersecting: bool, now: Duration) {
        if matches!(self.state, InitState::Rendered | InitState::TornDown) {
            return;
        }
        let before = self.gate.is_visible();
        let after = self.gate.observe(intersecting);
        match (self.state, before, after) {
            (InitState::Idle, _, true) => self.arm_settle(now),
            // Only a non-latching gate can drop out while pending.
            (InitState::Pending, true, false) => {
                if let Some(id) = self.settle.take() {
                    self.timers.cancel(id);
                }
                self.state = InitState::Idle;
                log::trace!("{} left the viewport before settling", self.container_id());
            }
            _ => {}
        }
    }

    /// Same as [`on_visibility`](Self::on_visibility) for a container and viewport rectangle.
    pub fn on_viewport(&mut self, element: Rect, viewport: Rect, now: Duration) {
        self.on_visibility(element.intersects(&viewport), now);
    }

    fn arm_settle(&mut self, now: Duration) {
        if let Some(id) = self.settle.take() {
            self.timers.cancel(id);
        }
        self.settle = Some(self.timers.schedule(now + SETTLE_DELAY, TimerKind::Settle));
        self.state = InitState::Pending;
        log::debug!("{} visible, rendering in {:?}", self.container_id(), SETTLE_DELAY);
    }

    /// Fire every timer due at `now`.
    pub fn poll<S: Surface + ?Sized>(
        &mut self,
        now: Duration,
        surface: &mut S,
    ) -> Result<Vec<InitEvent>> {
        let mut events = Vec::new();
        if self.state == InitState::TornDown {
            return Ok(events);
        }
        for (_, kind) in self.timers.pop_due(now) {
            match kind {
                TimerKind::Settle => {
                    self.settle = None;
                    if let Some(ev) = self.render(now, surface)? {
                        events.push(ev);
                    }
                }
                TimerKind::LabelReveal => {
                    if let Some(ev) = self.reveal_labels(surface)? {
                        events.push(ev);
                    }
                }
            }
        }
        Ok(events)
    }

    fn render<S: Surface + ?Sized>(
        &mut self,
        now: Duration,
        surface: &mut S,
    ) -> Result<Option<InitEvent>> {
        if self.render_count > 0 {
            return Ok(None);
        }
        let id = self.container_id();
        let chart = match self.first_draw(&id, surface) {
            Ok(chart) => chart,
            Err(err) => {
                // Fatal for this chart; nothing is retried.
                self.teardown();
                return Err(err);
            }
        };
        self.render_count += 1;
        self.state = InitState::Rendered;
        self.chart = Some(chart);
        surface.set_opacity(&id, 1.0);
        log::info!("rendered {id}");

        self.on_load(now, surface)?;
        Ok(Some(InitEvent::Rendered { container_id: id }))
    }

    fn first_draw<S: Surface + ?Sized>(&self, id: &str, surface: &mut S) -> Result<RenderedChart> {
        if !surface.has_container(id) {
            return Err(ChartError::MissingContainer(id.to_string()));
        }
        let shaped = shape(&self.config.series)?;
        let chart = RenderedChart::build(&self.config, &shaped);
        surface.draw(&chart)?;
        Ok(chart)
    }

    /// Load handler: schedule the label reveal, then place the logo badge.
    fn on_load<S: Surface + ?Sized>(&mut self, now: Duration, surface: &mut S) -> Result<()> {
        self.timers
            .schedule(now + LABEL_REVEAL_DELAY, TimerKind::LabelReveal);
        let (Some(logo), Some(chart)) = (&self.config.logo, self.chart.as_mut()) else {
            return Ok(());
        };
        chart.overlays.push(logo.clone());
        surface.draw(chart)?;
        Ok(())
    }

    fn reveal_labels<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<Option<InitEvent>> {
        let Some(chart) = self.chart.as_mut() else {
            return Ok(None);
        };
        if !surface.has_container(&chart.container_id) {
            return Err(ChartError::MissingContainer(chart.container_id.clone()));
        }
        let labels = reveal_end_labels(&mut chart.series);
        surface.draw(chart)?;
        log::debug!("revealed {labels} labels on {}", chart.container_id);
        Ok(Some(InitEvent::LabelsRevealed {
            container_id: chart.container_id.clone(),
            labels,
        }))
    }

    /// Cancel pending timers and drop the chart handle. Later calls do nothing.
    pub fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.settle = None;
        self.chart = None;
        self.state = InitState::TornDown;
        if cancelled > 0 {
            log::debug!("{} torn down, {cancelled} timer(s) cancelled", self.container_id());
        }
    }
}

/// Enable data labels on the first and last point of every real series, keeping each point's
/// configured vertical offset. Series without points are skipped. Returns the number of points
/// whose label is now shown.
pub fn reveal_end_labels(series: &mut [RenderedSeries]) -> usize {
    let mut shown = 0;
    for s in series.iter_mut().filter(|s| !s.placeholder) {
        let Some(last) = s.points.len().checked_sub(1) else {
            continue;
        };
        for i in [0, last] {
            let label = &mut s.points[i].data_label;
            if !label.enabled {
                label.enabled = true;
                shown += 1;
            }
        }
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataLabel, DataPoint, Series};

    fn series(points: usize, placeholder: bool) -> RenderedSeries {
        RenderedSeries {
            name: "s".into(),
            color: "#000000".into(),
            points: (0..points)
                .map(|i| DataPoint {
                    name: i.to_string(),
                    y: Some(i as f64),
                    data_label: DataLabel {
                        enabled: false,
                        y: -20.0 - i as f64,
                    },
                })
                .collect(),
            show_in_legend: !placeholder,
            x_axis: placeholder as usize,
            placeholder,
        }
    }

    #[test]
    fn reveals_first_and_last_only() {
        let mut s = vec![series(5, false), series(1, false), series(0, false), series(5, true)];
        assert_eq!(reveal_end_labels(&mut s), 3);
        let enabled: Vec<bool> = s[0].points.iter().map(|p| p.data_label.enabled).collect();
        assert_eq!(enabled, vec![true, false, false, false, true]);
        assert_eq!(s[0].points[4].data_label.y, -24.0);
        assert!(s[1].points[0].data_label.enabled);
        assert!(s[3].points.iter().all(|p| !p.data_label.enabled));
    }

    #[test]
    fn flicker_restarts_debounce_without_latch() {
        let config = ChartConfig::builder()
            .idx("x")
            .title("T")
            .source("S")
            .series(vec![Series::from_pairs("W", [("2018", Some(1.0))])])
            .build()
            .unwrap();
        let mut init = ChartInitializer::new(config, GateOptions { once: false });
        init.on_visibility(true, Duration::ZERO);
        assert_eq!(init.state(), InitState::Pending);
        init.on_visibility(false, Duration::from_millis(100));
        assert_eq!(init.state(), InitState::Idle);
        assert_eq!(init.next_deadline(), None);
        init.on_visibility(true, Duration::from_millis(200));
        assert_eq!(init.next_deadline(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn repeated_visibility_keeps_settle_deadline() {
        let config = ChartConfig::builder()
            .idx("x")
            .title("T")
            .source("S")
            .series(vec![Series::from_pairs("W", [("2018", Some(1.0))])])
            .build()
            .unwrap();
        for once in [true, false] {
            let mut init = ChartInitializer::new(config.clone(), GateOptions { once });
            init.on_visibility(true, Duration::ZERO);
            init.on_visibility(true, Duration::from_millis(250));
            assert_eq!(init.state(), InitState::Pending);
            assert_eq!(init.next_deadline(), Some(SETTLE_DELAY));
        }
    }
}
