pub mod parser;
pub mod process;
pub mod telemetry;

// Re-export the surface an orchestrator typically touches.
pub use parser::{BombardierParser, Metric, MetricUnit, MetricsParser};
pub use process::{ProcessProxy, ProcessSpec, WaitOutcome};
pub use telemetry::{LogEvent, SummarySink};
