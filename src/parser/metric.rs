use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit attached to a metric record. Display text is written verbatim into
/// the summary log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Microseconds,
    Milliseconds,
    Seconds,
    RequestsPerSec,
    BytesPerSec,
    Count,
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MetricUnit::Microseconds => "microseconds",
            MetricUnit::Milliseconds => "milliseconds",
            MetricUnit::Seconds => "seconds",
            MetricUnit::RequestsPerSec => "requests/sec",
            MetricUnit::BytesPerSec => "bytes/sec",
            MetricUnit::Count => "count",
        };
        f.write_str(text)
    }
}

/// One named, unit-tagged measurement extracted from a benchmark report.
/// Immutable once produced; ordering within a parse result is source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64, unit: MetricUnit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags.extend(tags);
        self
    }
}
