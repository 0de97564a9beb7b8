//! # Parser
//!
//! RFC 3164 (BSD syslog) datagram parsing.
//!
//! Responsibilities:
//! - Split `<PRI>`, header and message parts of a raw datagram
//! - Degrade gracefully: malformed framing yields default fields, never an error
//! - Apply the configured policy for datagrams without a priority
//!
//! # Example
//!
//! ```
//! use chrono::Local;
//! use contracts::{Facility, Source};
//!
//! let source = Source::Udp("127.0.0.1:514".parse().unwrap());
//! let record = parser::parse(b"<34>Oct 11 22:14:15 mymachine su: hi", source, Local::now());
//! assert_eq!(record.facility, Facility::Auth);
//! assert_eq!(record.hostname(), Some("mymachine"));
//! assert_eq!(record.tag, "su");
//! ```

mod priority;
mod rfc3164;
mod timestamp;

pub use contracts::{MissingPriority, ParserConfig, Record};
pub use rfc3164::{has_priority, parse};

use chrono::{DateTime, Local};
use contracts::Source;

/// Parser with a missing-priority policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    missing_priority: MissingPriority,
}

impl Parser {
    /// Create a parser from configuration
    pub fn new(config: &ParserConfig) -> Self {
        Self::with_policy(config.missing_priority)
    }

    /// Create a parser with an explicit policy
    pub fn with_policy(missing_priority: MissingPriority) -> Self {
        Self { missing_priority }
    }

    /// Configured policy
    pub fn missing_priority(&self) -> MissingPriority {
        self.missing_priority
    }

    /// Parse a datagram.
    ///
    /// Returns `None` only under [`MissingPriority::Discard`] for datagrams
    /// without a valid `<PRI>` prefix.
    pub fn parse(
        &self,
        raw: &[u8],
        source: Source,
        received_at: DateTime<Local>,
    ) -> Option<Record> {
        if self.missing_priority == MissingPriority::Discard && !has_priority(raw) {
            return None;
        }
        Some(parse(raw, source, received_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Severity;

    fn source() -> Source {
        Source::Udp("127.0.0.1:514".parse().unwrap())
    }

    #[test]
    fn test_default_policy_keeps_everything() {
        let parser = Parser::default();
        assert_eq!(parser.missing_priority(), MissingPriority::Default);
        let record = parser.parse(b"no priority", source(), Local::now()).unwrap();
        assert_eq!(record.severity, Severity::Notice);
    }

    #[test]
    fn test_discard_policy_drops_unprioritised() {
        let parser = Parser::new(&ParserConfig {
            missing_priority: MissingPriority::Discard,
        });
        assert!(parser.parse(b"no priority", source(), Local::now()).is_none());
        assert!(parser.parse(b"<1a>bad", source(), Local::now()).is_none());

        let record = parser.parse(b"<11>app: x", source(), Local::now()).unwrap();
        assert_eq!(record.severity, Severity::Err);
    }
}
