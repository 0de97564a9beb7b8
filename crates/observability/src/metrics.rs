//! Syslog server metrics
//!
//! Thin helpers over the `metrics` facade. Without an installed recorder
//! (no `--metrics-port`) every call is a no-op.

use contracts::{Facility, Severity};
use metrics::{counter, gauge};

/// Record a datagram read by a listener
pub fn record_datagram_received(listener: &str, bytes: usize) {
    counter!("syslog_datagrams_received_total", "listener" => listener.to_string()).increment(1);
    counter!("syslog_bytes_received_total", "listener" => listener.to_string())
        .increment(bytes as u64);
}

/// Record a datagram dropped by the missing-priority policy
pub fn record_datagram_discarded(listener: &str) {
    counter!("syslog_datagrams_discarded_total", "listener" => listener.to_string()).increment(1);
}

/// Record a parsed record by facility and severity
pub fn record_record_parsed(facility: Facility, severity: Severity, has_header: bool) {
    counter!(
        "syslog_records_total",
        "facility" => facility.as_str(),
        "severity" => severity.as_str()
    )
    .increment(1);
    if !has_header {
        counter!("syslog_records_headerless_total").increment(1);
    }
}

/// Record a record that no handler absorbed
pub fn record_record_unhandled(listener: &str) {
    counter!("syslog_records_unhandled_total", "listener" => listener.to_string()).increment(1);
}

/// Record a listener read error
pub fn record_read_error(listener: &str) {
    counter!("syslog_read_errors_total", "listener" => listener.to_string()).increment(1);
}

/// Point-in-time handler counters
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerReport<'a> {
    pub handler: &'a str,
    pub queue_len: usize,
    pub queued: u64,
    pub forwarded: u64,
    pub bypassed: u64,
    pub rejected: u64,
    pub written: u64,
    pub failed: u64,
}

/// Publish handler counters (absolute values, safe to call repeatedly)
pub fn record_handler_report(report: &HandlerReport<'_>) {
    let handler = report.handler.to_string();
    gauge!("syslog_handler_queue_depth", "handler" => handler.clone()).set(report.queue_len as f64);
    counter!("syslog_handler_queued_total", "handler" => handler.clone()).absolute(report.queued);
    counter!("syslog_handler_forwarded_total", "handler" => handler.clone())
        .absolute(report.forwarded);
    counter!("syslog_handler_bypassed_total", "handler" => handler.clone())
        .absolute(report.bypassed);
    counter!("syslog_handler_rejected_total", "handler" => handler.clone())
        .absolute(report.rejected);
    counter!("syslog_handler_written_total", "handler" => handler.clone()).absolute(report.written);
    counter!("syslog_handler_failed_total", "handler" => handler).absolute(report.failed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_recorder() {
        record_datagram_received("udp", 42);
        record_datagram_discarded("udp");
        record_record_parsed(Facility::Auth, Severity::Crit, false);
        record_record_unhandled("udp");
        record_read_error("udp");
        record_handler_report(&HandlerReport {
            handler: "log",
            queue_len: 3,
            queued: 10,
            ..HandlerReport::default()
        });
    }
}
