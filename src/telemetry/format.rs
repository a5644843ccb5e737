//! Fixed-width rendering for the summary log.
//!
//! Every physical line carries a timestamp prefix and never exceeds
//! [`MAX_LINE_LENGTH`] columns; overflow continues on lines padded with
//! blanks to the prefix width. A writer assembles its entire stamped message
//! in memory before it reaches the buffer, so external writers to the same
//! file can interleave at line granularity but never inside a message.

use chrono::{DateTime, Utc};

use super::event::{LogEvent, LogEventKind};

/// Hard ceiling on any output line, prefix included.
pub const MAX_LINE_LENGTH: usize = 150;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Renders an event into its unstamped message body.
///
/// Metric events become one `| Scenario: .. |` line plus a blank separator;
/// error events become a marker block per sub-error, a call-stack line, and
/// the separator.
pub fn render_event(event: &LogEvent) -> String {
    match &event.kind {
        LogEventKind::Metric {
            scenario,
            name,
            value,
            unit,
        } => {
            format!("| Scenario: {scenario} | Name: {name} | Value: {value} | Unit: {unit} |\n\n")
        }
        LogEventKind::Error { errors, call_stack } => {
            let mut message = String::new();
            for detail in errors {
                message.push_str("*** Error ***\n");
                message.push_str(&format!("Error Type: {}\n", detail.error_type));
                message.push_str(&format!("Error Message: {}\n", detail.message));
            }
            message.push_str(&format!("Error Call Stack: {call_stack}\n"));
            message.push('\n');
            message
        }
    }
}

/// Stamps and wraps a rendered message body.
///
/// Each non-empty source line starts with the timestamp prefix and is broken
/// so no output line exceeds [`MAX_LINE_LENGTH`] characters; continuation
/// lines are indented to exactly the prefix width. Blank source lines pass
/// through as blank separator lines.
pub fn append_message(out: &mut String, timestamp: DateTime<Utc>, message: &str) {
    let prefix = format!("{} | ", timestamp.format(TIMESTAMP_FORMAT));
    let padding = " ".repeat(prefix.len());
    let max_segment = MAX_LINE_LENGTH - prefix.len();

    for line in message.lines() {
        if line.is_empty() {
            out.push('\n');
            continue;
        }

        let mut rest = line;
        let mut first = true;
        while !rest.is_empty() {
            let take = rest
                .char_indices()
                .nth(max_segment)
                .map(|(index, _)| index)
                .unwrap_or(rest.len());
            let (segment, tail) = rest.split_at(take);
            out.push_str(if first { &prefix } else { &padding });
            out.push_str(segment);
            out.push('\n');
            rest = tail;
            first = false;
        }
    }
}

/// Full rendering pipeline for one event: body plus stamped wrapping.
pub fn stamp_event(event: &LogEvent) -> String {
    let mut out = String::new();
    append_message(&mut out, event.timestamp, &render_event(event));
    out
}
