//! Error type shared by the library modules.

use thiserror::Error;

/// Everything that can go wrong while building, shaping, or rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A required configuration field was absent or blank.
    #[error("missing required chart field `{0}`")]
    MissingField(&'static str),

    /// A configuration field was present but unusable.
    #[error("invalid chart field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Shaping accepts a primary series and an optional comparison series.
    #[error("expected 1 or 2 series, got {0}")]
    SeriesCount(usize),

    /// The render target is gone when the settle timer fires. Not retried.
    #[error("render target `{0}` does not exist")]
    MissingContainer(String),

    /// Process-wide options were already initialized with different values.
    #[error("global {0} already initialized with different values")]
    GlobalsConflict(&'static str),

    /// Drawing backend failure.
    #[error(transparent)]
    Render(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
