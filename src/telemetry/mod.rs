//! Summary-file telemetry.
//!
//! Structured events are rendered to fixed-width text, accumulated in a
//! thread-safe buffer, and drained to an append-only log by one background
//! flush loop per sink. The loop swallows every failure: telemetry must never
//! be able to take down the host process.

pub mod buffer;
pub mod event;
pub mod format;
pub mod retry;
pub mod sink;

pub use buffer::ConcurrentBuffer;
pub use event::{ErrorDetail, LogEvent, LogEventKind};
pub use retry::RetryPolicy;
pub use sink::{SummarySink, TelemetryError};
