//! Viewport visibility latch for chart containers.

/// Axis-aligned rectangle in page pixels (`y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the two rectangles share an area. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOptions {
    /// Stop observing after the first time the element becomes visible.
    pub once: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self { once: true }
    }
}

/// Reports whether an observed element has become visible.
///
/// With `once` set the state is a monotonic latch: false until the first intersecting
/// observation, true forever after.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    options: GateOptions,
    visible: bool,
    observing: bool,
}

impl VisibilityGate {
    pub fn new(options: GateOptions) -> Self {
        Self {
            options,
            visible: false,
            observing: true,
        }
    }

    /// Fallback when no observation primitive exists: visible from the start.
    pub fn always_visible() -> Self {
        Self {
            options: GateOptions { once: true },
            visible: true,
            observing: false,
        }
    }

    /// Feed one observation and return the resulting state.
    pub fn observe(&mut self, intersecting: bool) -> bool {
        if !self.observing {
            return self.visible;
        }
        self.visible = intersecting;
        if intersecting && self.options.once {
            self.observing = false;
            log::trace!("visibility gate latched");
        }
        self.visible
    }

    pub fn observe_rect(&mut self, element: Rect, viewport: Rect) -> bool {
        self.observe(element.intersects(&viewport))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// False once a `once` gate has latched.
    pub fn is_observing(&self) -> bool {
        self.observing
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(GateOptions::default())
    }
}
