use chrono::{DateTime, Utc};

use crate::parser::{Metric, MetricUnit};

/// One structured telemetry event, consumed synchronously by the sink and
/// never persisted as an object.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: LogEventKind,
}

#[derive(Debug, Clone)]
pub enum LogEventKind {
    Metric {
        scenario: String,
        name: String,
        value: f64,
        unit: MetricUnit,
    },
    Error {
        errors: Vec<ErrorDetail>,
        call_stack: String,
    },
}

/// One recorded sub-error within an error event.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub error_type: String,
    pub message: String,
}

impl LogEvent {
    pub fn metric(scenario: impl Into<String>, metric: &Metric) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: LogEventKind::Metric {
                scenario: scenario.into(),
                name: metric.name.clone(),
                value: metric.value,
                unit: metric.unit,
            },
        }
    }

    pub fn error(errors: Vec<ErrorDetail>, call_stack: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: LogEventKind::Error {
                errors,
                call_stack: call_stack.into(),
            },
        }
    }
}
