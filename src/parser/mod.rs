//! Extraction of structured metrics from captured benchmark output.
//!
//! Third-party tools emit loosely structured text; each tool gets one fixed
//! extraction strategy behind [`MetricsParser`]. Strategies are deterministic,
//! skip content they do not recognize, and fail only when the minimal report
//! structure is missing.

pub mod bombardier;
pub mod metric;

pub use bombardier::BombardierParser;
pub use metric::{Metric, MetricUnit};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no report document found in captured output")]
    MissingReport,
    #[error("report is missing the '{0}' section")]
    MissingSection(&'static str),
    #[error("report document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Tool-specific strategy turning one completed run's captured text into an
/// ordered sequence of metric records.
pub trait MetricsParser {
    fn parse(&self, text: &str) -> Result<Vec<Metric>, ParseError>;
}
