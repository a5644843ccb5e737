use benchkit::parser::{BombardierParser, Metric, MetricUnit, MetricsParser, ParseError};

const EXAMPLE_OUTPUT: &str = include_str!("fixtures/bombardier.txt");

fn assert_metric(metrics: &[Metric], name: &str, value: f64, unit: MetricUnit) {
    let metric = metrics
        .iter()
        .find(|metric| metric.name == name)
        .unwrap_or_else(|| panic!("missing metric '{name}'"));
    assert_eq!(metric.value, value, "value mismatch for '{name}'");
    assert_eq!(metric.unit, unit, "unit mismatch for '{name}'");
}

#[test]
fn parses_all_sixteen_metrics() {
    let metrics = BombardierParser
        .parse(EXAMPLE_OUTPUT)
        .expect("fixture should parse");
    assert_eq!(metrics.len(), 16);

    assert_metric(&metrics, "Latency Max", 178703.0, MetricUnit::Microseconds);
    assert_metric(
        &metrics,
        "Latency Average",
        8270.807963429836,
        MetricUnit::Microseconds,
    );
    assert_metric(
        &metrics,
        "Latency Stddev",
        6124.356473307014,
        MetricUnit::Microseconds,
    );
    assert_metric(&metrics, "Latency P50", 6058.0, MetricUnit::Microseconds);
    assert_metric(&metrics, "Latency P75", 10913.0, MetricUnit::Microseconds);
    assert_metric(&metrics, "Latency P90", 17949.0, MetricUnit::Microseconds);
    assert_metric(&metrics, "Latency P95", 23318.0, MetricUnit::Microseconds);
    assert_metric(&metrics, "Latency P99", 35856.0, MetricUnit::Microseconds);

    assert_metric(
        &metrics,
        "RequestPerSecond Max",
        67321.282458945348,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond Average",
        31211.609987720527,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond Stddev",
        6446.822354105378,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond P50",
        31049.462844,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond P75",
        35597.436614,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond P90",
        39826.205746,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond P95",
        41662.542962,
        MetricUnit::RequestsPerSec,
    );
    assert_metric(
        &metrics,
        "RequestPerSecond P99",
        49625.656227,
        MetricUnit::RequestsPerSec,
    );
}

#[test]
fn values_preserve_full_source_precision() {
    let metrics = BombardierParser
        .parse(EXAMPLE_OUTPUT)
        .expect("fixture should parse");

    // Bit-exact: the parsed double must be the correctly rounded nearest
    // f64 of the decimal in the report, not merely approximately equal.
    let rps_max = metrics
        .iter()
        .find(|metric| metric.name == "RequestPerSecond Max")
        .expect("metric present");
    assert_eq!(rps_max.value.to_bits(), 67321.282458945348f64.to_bits());

    let latency_avg = metrics
        .iter()
        .find(|metric| metric.name == "Latency Average")
        .expect("metric present");
    assert_eq!(latency_avg.value.to_bits(), 8270.807963429836f64.to_bits());
}

#[test]
fn preserves_source_order() {
    let metrics = BombardierParser
        .parse(EXAMPLE_OUTPUT)
        .expect("fixture should parse");

    assert_eq!(metrics[0].name, "Latency Max");
    assert_eq!(metrics[1].name, "Latency Average");
    assert_eq!(metrics[2].name, "Latency Stddev");
    assert_eq!(metrics[7].name, "Latency P99");
    assert_eq!(metrics[8].name, "RequestPerSecond Max");
    assert_eq!(metrics[15].name, "RequestPerSecond P99");
}

#[test]
fn identical_input_yields_identical_result() {
    let first = BombardierParser
        .parse(EXAMPLE_OUTPUT)
        .expect("fixture should parse");
    let second = BombardierParser
        .parse(EXAMPLE_OUTPUT)
        .expect("fixture should parse");
    assert_eq!(first, second);
}

#[test]
fn banner_without_report_is_an_error() {
    let error = BombardierParser
        .parse("Bombarding http://localhost:5000 for 30s\n[====] Done!\n")
        .unwrap_err();
    assert!(matches!(error, ParseError::MissingReport));
}

#[test]
fn missing_latency_section_is_an_error() {
    let error = BombardierParser
        .parse(r#"{"spec":{},"result":{"bytesRead":1,"rps":{"mean":1.0,"stddev":0.0,"max":1.0,"percentiles":{"50":1.0,"75":1.0,"90":1.0,"95":1.0,"99":1.0}}}}"#)
        .unwrap_err();
    assert!(matches!(error, ParseError::MissingSection("latencies")));
}

#[test]
fn missing_result_section_is_an_error() {
    let error = BombardierParser
        .parse(r#"{"spec":{"method":"GET"}}"#)
        .unwrap_err();
    assert!(matches!(error, ParseError::MissingSection("result")));
}

#[test]
fn unrecognized_fields_are_skipped() {
    let report = r#"noise before the report
{"vendorExtension":{"nested":[1,2,3]},"result":{"futureField":true,"latencies":{"mean":2.0,"stddev":1.0,"max":3.0,"percentiles":{"50":1.0,"75":1.0,"90":2.0,"95":2.0,"99":3.0,"99.9":3.0}},"rps":{"mean":10.0,"stddev":0.5,"max":12.0,"percentiles":{"50":10.0,"75":11.0,"90":11.5,"95":11.8,"99":12.0}}}}
noise after the report"#;

    let metrics = BombardierParser
        .parse(report)
        .expect("extra content must not be fatal");
    assert_eq!(metrics.len(), 16);
    assert_metric(&metrics, "Latency Max", 3.0, MetricUnit::Microseconds);
}
