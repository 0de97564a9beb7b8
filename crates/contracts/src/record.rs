//! Record - Parser output
//!
//! One parsed syslog message.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Facility, Priority, Severity, Source};

/// Layout of the arrival time in the human-readable rendering
const RECEIVED_AT_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of the device timestamp in the human-readable rendering
const DEVICE_TIMESTAMP_LAYOUT: &str = "%m-%d %H:%M:%S";

/// One syslog message, built once per datagram.
///
/// `header` holds the device timestamp and hostname together: either both
/// were parsed or neither was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// When the datagram was read
    pub received_at: DateTime<Local>,

    /// Where it came from
    pub source: Source,

    /// Facility from the priority (default `user`)
    pub facility: Facility,

    /// Severity from the priority (default `notice`)
    pub severity: Severity,

    /// RFC 3164 header, if one was recognised
    pub header: Option<Header>,

    /// Leading alphanumeric token of the message, possibly empty
    pub tag: String,

    /// Message body after the tag
    pub content: String,
}

/// Timestamp and hostname from the RFC 3164 header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Device-local time, year implied from the arrival time
    pub timestamp: NaiveDateTime,

    /// Hostname token following the timestamp
    pub hostname: String,
}

impl Record {
    /// Device timestamp from the header
    pub fn device_timestamp(&self) -> Option<NaiveDateTime> {
        self.header.as_ref().map(|h| h.timestamp)
    }

    /// Hostname from the header
    pub fn hostname(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.hostname.as_str())
    }

    /// Priority value reconstructed from facility and severity
    pub fn priority(&self) -> Priority {
        Priority::from_parts(self.facility, self.severity)
    }

    /// Network part of the source (IP or socket path)
    pub fn net_addr(&self) -> String {
        self.source.net_addr()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} <{},{}> ",
            self.received_at.format(RECEIVED_AT_LAYOUT),
            self.source,
            self.facility,
            self.severity
        )?;
        match &self.header {
            Some(header) => write!(
                f,
                "({} '{}')",
                header.timestamp.format(DEVICE_TIMESTAMP_LAYOUT),
                header.hostname
            )?,
            None => f.write_str("(- '')")?,
        }
        write!(f, " [{}] {}", self.tag, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn sample_record(header: Option<Header>) -> Record {
        Record {
            received_at: Local.with_ymd_and_hms(2024, 3, 9, 8, 5, 1).unwrap(),
            source: Source::Udp("10.0.0.1:514".parse().unwrap()),
            facility: Facility::Auth,
            severity: Severity::Crit,
            header,
            tag: "su".into(),
            content: ": 'su root' failed".into(),
        }
    }

    #[test]
    fn test_display_with_header() {
        let record = sample_record(Some(Header {
            timestamp: NaiveDate::from_ymd_opt(2024, 10, 11)
                .unwrap()
                .and_hms_opt(22, 14, 15)
                .unwrap(),
            hostname: "mymachine".into(),
        }));
        assert_eq!(
            record.to_string(),
            "2024-03-09 08:05:01 10.0.0.1:514 <auth,crit> (10-11 22:14:15 'mymachine') [su] : 'su root' failed"
        );
    }

    #[test]
    fn test_display_without_header() {
        let record = sample_record(None);
        assert_eq!(
            record.to_string(),
            "2024-03-09 08:05:01 10.0.0.1:514 <auth,crit> (- '') [su] : 'su root' failed"
        );
    }

    #[test]
    fn test_accessors() {
        let record = sample_record(None);
        assert!(record.device_timestamp().is_none());
        assert!(record.hostname().is_none());
        assert_eq!(record.priority().value(), 34);
        assert_eq!(record.net_addr(), "10.0.0.1");
    }

    #[test]
    fn test_json_shape() {
        let record = sample_record(None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["facility"], "auth");
        assert_eq!(value["severity"], "crit");
        assert_eq!(value["source"]["udp"], "10.0.0.1:514");
        assert!(value["header"].is_null());
    }
}
