//! trade_trends
//!
//! Lazily rendered trade-trend line charts for a statistical dashboard page.
//! Pairs with the `trade-trends` CLI and the `trade-trends-gui` desktop viewer.
//!
//! ### Features
//! - Validated chart and page configuration loaded from JSON
//! - Charts render once, after their container has been visible for a short settle delay
//! - A hidden placeholder series reserves trailing categories on a secondary axis
//! - End-point data labels are revealed after the entrance animation
//! - Half-away-from-zero rounding with English thousands grouping
//! - SVG/PNG output via plotters, CSV export of chart data
//!
//! ### Example
//! ```no_run
//! use trade_trends::{Dashboard, FileSurface, ImageFormat, ManualClock, PageConfig};
//!
//! let page = PageConfig::load("page.json")?;
//! let mut surface = FileSurface::new("out", ImageFormat::Svg, 1000);
//! let mut dashboard = Dashboard::new(&page, 1000.0, Default::default());
//! dashboard.mount_all(&mut surface);
//! let clock = ManualClock::new();
//! dashboard.run_to_completion(&clock, &mut surface, 900.0)?;
//! # Ok::<(), trade_trends::ChartError>(())
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod format;
pub mod globals;
pub mod initializer;
pub mod models;
pub mod shaper;
pub mod surface;
pub mod timer;
pub mod visibility;
pub mod viz;

pub use config::{ChartConfig, PageConfig};
pub use dashboard::Dashboard;
pub use error::ChartError;
pub use initializer::{ChartInitializer, InitEvent, InitState};
pub use models::{DataPoint, Series};
pub use surface::{BitmapSurface, FileSurface, ImageFormat, RenderedChart, Surface};
pub use timer::{Clock, ManualClock, SystemClock};
pub use visibility::{GateOptions, Rect, VisibilityGate};
