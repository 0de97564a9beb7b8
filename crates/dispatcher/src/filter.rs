//! Record predicates and the FilterHandler stage

use std::sync::Arc;

use contracts::{Facility, FilterConfig, Handler, Record, Severity};
use tracing::trace;

use crate::metrics::HandlerMetrics;

/// Shared record predicate
pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Predicate built from [`FilterConfig`]. Every non-empty criterion must match.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    tags: Vec<String>,
    hostnames: Vec<String>,
    facilities: Vec<Facility>,
    min_severity: Option<Severity>,
}

impl RecordFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            tags: config.tags.clone(),
            hostnames: config.hostnames.clone(),
            facilities: config.facilities.clone(),
            min_severity: config.min_severity,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| *t == record.tag) {
            return false;
        }
        if !self.hostnames.is_empty() {
            match record.hostname() {
                Some(host) if self.hostnames.iter().any(|h| h == host) => {}
                _ => return false,
            }
        }
        if !self.facilities.is_empty() && !self.facilities.contains(&record.facility) {
            return false;
        }
        self.min_severity
            .map_or(true, |min| record.severity.is_at_least(min))
    }

    pub fn into_predicate(self) -> RecordPredicate {
        Arc::new(move |record| self.matches(record))
    }
}

/// Handler that absorbs records its predicate rejects
pub struct FilterHandler {
    name: String,
    predicate: RecordPredicate,
    metrics: Arc<HandlerMetrics>,
}

impl FilterHandler {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self::from_predicate(name, Arc::new(predicate))
    }

    pub fn from_predicate(name: impl Into<String>, predicate: RecordPredicate) -> Self {
        Self {
            name: name.into(),
            predicate,
            metrics: Arc::new(HandlerMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }
}

impl Handler for FilterHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, record: Arc<Record>) -> Option<Arc<Record>> {
        if (self.predicate)(&record) {
            self.metrics.inc_forwarded_count();
            Some(record)
        } else {
            self.metrics.inc_rejected_count();
            trace!(handler = %self.name, tag = %record.tag, "Record filtered out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};
    use contracts::{Header, Source};

    fn record(tag: &str, facility: Facility, severity: Severity, host: Option<&str>) -> Record {
        Record {
            received_at: Local::now(),
            source: Source::Udp("10.0.0.1:514".parse().unwrap()),
            facility,
            severity,
            header: host.map(|h| Header {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                hostname: h.to_string(),
            }),
            tag: tag.to_string(),
            content: ": x".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("", Facility::Kern, Severity::Debug, None)));
    }

    #[test]
    fn test_criteria_are_combined() {
        let filter = RecordFilter::from_config(&FilterConfig {
            tags: vec!["sshd".into(), "su".into()],
            hostnames: vec![],
            facilities: vec![Facility::Auth, Facility::Authpriv],
            min_severity: Some(Severity::Warning),
        });

        assert!(filter.matches(&record("su", Facility::Auth, Severity::Crit, None)));
        assert!(filter.matches(&record("sshd", Facility::Authpriv, Severity::Warning, None)));
        assert!(!filter.matches(&record("cron", Facility::Auth, Severity::Crit, None)));
        assert!(!filter.matches(&record("su", Facility::Daemon, Severity::Crit, None)));
        assert!(!filter.matches(&record("su", Facility::Auth, Severity::Info, None)));
    }

    #[test]
    fn test_hostname_requires_header() {
        let filter = RecordFilter::from_config(&FilterConfig {
            hostnames: vec!["web1".into()],
            ..FilterConfig::default()
        });

        assert!(filter.matches(&record("app", Facility::User, Severity::Info, Some("web1"))));
        assert!(!filter.matches(&record("app", Facility::User, Severity::Info, Some("web2"))));
        assert!(!filter.matches(&record("app", Facility::User, Severity::Info, None)));
    }

    #[test]
    fn test_filter_handler_absorbs_rejected() {
        let handler = FilterHandler::new("errors-only", |r: &Record| {
            r.severity.is_at_least(Severity::Err)
        });

        let kept = Arc::new(record("app", Facility::User, Severity::Alert, None));
        assert!(handler.handle(kept).is_some());

        let dropped = Arc::new(record("app", Facility::User, Severity::Debug, None));
        assert!(handler.handle(dropped).is_none());

        let snapshot = handler.metrics().snapshot();
        assert_eq!(snapshot.forwarded_count, 1);
        assert_eq!(snapshot.rejected_count, 1);
    }
}
