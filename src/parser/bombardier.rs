use serde::Deserialize;

use super::metric::{Metric, MetricUnit};
use super::{MetricsParser, ParseError};

/// Extraction strategy for the `bombardier` HTTP load generator.
///
/// The tool prints a human-readable banner and progress lines followed by a
/// single JSON report document; everything around the document is skipped.
/// Emits exactly 16 metrics, latency distribution first, then throughput,
/// each as Max / Average / Stddev / P50 / P75 / P90 / P95 / P99.
#[derive(Debug, Default)]
pub struct BombardierParser;

// Units come from this fixed table keyed on the metric group, never inferred
// from surrounding text.
const UNIT_TABLE: &[(&str, MetricUnit)] = &[
    ("Latency", MetricUnit::Microseconds),
    ("RequestPerSecond", MetricUnit::RequestsPerSec),
];

const PERCENTILE_CUTS: &[&str] = &["P50", "P75", "P90", "P95", "P99"];

#[derive(Deserialize)]
struct BombardierReport {
    result: Option<ReportBody>,
}

#[derive(Deserialize)]
struct ReportBody {
    latencies: Option<Distribution>,
    rps: Option<Distribution>,
}

#[derive(Deserialize)]
struct Distribution {
    max: f64,
    mean: f64,
    stddev: f64,
    percentiles: Percentiles,
}

#[derive(Deserialize)]
struct Percentiles {
    #[serde(rename = "50")]
    p50: f64,
    #[serde(rename = "75")]
    p75: f64,
    #[serde(rename = "90")]
    p90: f64,
    #[serde(rename = "95")]
    p95: f64,
    #[serde(rename = "99")]
    p99: f64,
}

impl MetricsParser for BombardierParser {
    fn parse(&self, text: &str) -> Result<Vec<Metric>, ParseError> {
        let document = extract_document(text).ok_or(ParseError::MissingReport)?;
        let report: BombardierReport = serde_json::from_str(document)?;
        let body = report.result.ok_or(ParseError::MissingSection("result"))?;
        let latencies = body
            .latencies
            .ok_or(ParseError::MissingSection("latencies"))?;
        let rps = body.rps.ok_or(ParseError::MissingSection("rps"))?;

        let mut metrics = Vec::with_capacity(16);
        push_distribution(&mut metrics, "Latency", &latencies);
        push_distribution(&mut metrics, "RequestPerSecond", &rps);
        Ok(metrics)
    }
}

fn push_distribution(metrics: &mut Vec<Metric>, group: &str, distribution: &Distribution) {
    let unit = unit_for(group);
    let percentiles = &distribution.percentiles;

    metrics.push(Metric::new(format!("{group} Max"), distribution.max, unit));
    metrics.push(Metric::new(
        format!("{group} Average"),
        distribution.mean,
        unit,
    ));
    metrics.push(Metric::new(
        format!("{group} Stddev"),
        distribution.stddev,
        unit,
    ));
    for (cut, value) in PERCENTILE_CUTS.iter().zip([
        percentiles.p50,
        percentiles.p75,
        percentiles.p90,
        percentiles.p95,
        percentiles.p99,
    ]) {
        metrics.push(Metric::new(format!("{group} {cut}"), value, unit));
    }
}

fn unit_for(group: &str) -> MetricUnit {
    UNIT_TABLE
        .iter()
        .find(|(name, _)| *name == group)
        .map(|(_, unit)| *unit)
        .unwrap_or(MetricUnit::Count)
}

/// The report document is the outermost braced span; banner and progress
/// lines on either side are skipped, not fatal.
fn extract_document(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::extract_document;

    #[test]
    fn document_found_amid_surrounding_noise() {
        let text = "Bombarding target...\n{\"result\": {}}\ntrailing note\n";
        assert_eq!(extract_document(text), Some("{\"result\": {}}"));
    }

    #[test]
    fn no_braces_means_no_document() {
        assert_eq!(extract_document("Statistics Avg Stdev Max\n"), None);
    }
}
