//! Priority, facility and severity
//!
//! The `<PRI>` prefix of a syslog datagram packs facility and severity as
//! `facility * 8 + severity`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority assumed when a datagram carries no usable `<PRI>` prefix
/// (facility `user`, severity `notice`).
pub const DEFAULT_PRIORITY: Priority = Priority(13);

/// Largest priority value a three-digit `<PRI>` prefix can carry.
const MAX_PRIORITY: u32 = 999;

/// Syslog facilities, numbered as on the wire. Names are from Linux.
///
/// Codes above 23 have no name and are kept as [`Facility::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Kern,
    User,
    Mail,
    Daemon,
    Auth,
    Syslog,
    Lpr,
    News,
    Uucp,
    Cron,
    Authpriv,
    Ftp,
    Ntp,
    Audit,
    Alert,
    Clockd,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
    /// Out-of-range wire code (24–124)
    Unknown(u8),
}

const FACILITIES: [Facility; 24] = [
    Facility::Kern,
    Facility::User,
    Facility::Mail,
    Facility::Daemon,
    Facility::Auth,
    Facility::Syslog,
    Facility::Lpr,
    Facility::News,
    Facility::Uucp,
    Facility::Cron,
    Facility::Authpriv,
    Facility::Ftp,
    Facility::Ntp,
    Facility::Audit,
    Facility::Alert,
    Facility::Clockd,
    Facility::Local0,
    Facility::Local1,
    Facility::Local2,
    Facility::Local3,
    Facility::Local4,
    Facility::Local5,
    Facility::Local6,
    Facility::Local7,
];

impl Facility {
    /// Convert a wire code (0–23) into a named `Facility`
    pub fn from_code(code: u8) -> Option<Self> {
        FACILITIES.get(usize::from(code)).copied()
    }

    /// Any wire code, unnamed ones as [`Facility::Unknown`]
    pub fn from_wire(code: u8) -> Self {
        Self::from_code(code).unwrap_or(Facility::Unknown(code))
    }

    /// Wire code of this facility
    pub fn code(self) -> u8 {
        match self {
            Facility::Unknown(code) => code,
            named => FACILITIES
                .iter()
                .position(|f| *f == named)
                .and_then(|i| u8::try_from(i).ok())
                .unwrap_or_default(),
        }
    }

    /// Conventional lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Facility::Kern => "kern",
            Facility::User => "user",
            Facility::Mail => "mail",
            Facility::Daemon => "daemon",
            Facility::Auth => "auth",
            Facility::Syslog => "syslog",
            Facility::Lpr => "lpr",
            Facility::News => "news",
            Facility::Uucp => "uucp",
            Facility::Cron => "cron",
            Facility::Authpriv => "authpriv",
            Facility::Ftp => "ftp",
            Facility::Ntp => "ntp",
            Facility::Audit => "audit",
            Facility::Alert => "alert",
            Facility::Clockd => "clockd",
            Facility::Local0 => "local0",
            Facility::Local1 => "local1",
            Facility::Local2 => "local2",
            Facility::Local3 => "local3",
            Facility::Local4 => "local4",
            Facility::Local5 => "local5",
            Facility::Local6 => "local6",
            Facility::Local7 => "local7",
            Facility::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facility::Unknown(code) => write!(f, "{code}"),
            named => f.write_str(named.as_str()),
        }
    }
}

/// Syslog severities; lower codes are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

const SEVERITIES: [Severity; 8] = [
    Severity::Emerg,
    Severity::Alert,
    Severity::Crit,
    Severity::Err,
    Severity::Warning,
    Severity::Notice,
    Severity::Info,
    Severity::Debug,
];

impl Severity {
    /// Convert a wire code (0–7) into a `Severity`
    pub fn from_code(code: u8) -> Option<Self> {
        SEVERITIES.get(usize::from(code)).copied()
    }

    /// Wire code of this severity
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True if `self` is at least as urgent as `threshold`
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self <= threshold
    }

    /// Conventional lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emerg => "emerg",
            Severity::Alert => "alert",
            Severity::Crit => "crit",
            Severity::Err => "err",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priority value (0–999). Values above 191 carry an unnamed facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority(u16);

impl Priority {
    /// Validate a raw `<PRI>` value
    pub fn new(value: u32) -> Option<Self> {
        if value > MAX_PRIORITY {
            return None;
        }
        u16::try_from(value).ok().map(Self)
    }

    /// Build the priority for a facility/severity pair
    pub fn from_parts(facility: Facility, severity: Severity) -> Self {
        Self(u16::from(facility.code()) << 3 | u16::from(severity.code()))
    }

    /// Raw numeric value
    pub fn value(self) -> u16 {
        self.0
    }

    /// `pri >> 3`
    pub fn facility(self) -> Facility {
        // at most 999 >> 3 = 124
        Facility::from_wire(u8::try_from(self.0 >> 3).unwrap_or(u8::MAX))
    }

    /// `pri & 7`
    pub fn severity(self) -> Severity {
        SEVERITIES[usize::from(self.0 & 0x7)]
    }
}

impl Default for Priority {
    fn default() -> Self {
        DEFAULT_PRIORITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priority_is_user_notice() {
        assert_eq!(DEFAULT_PRIORITY.facility(), Facility::User);
        assert_eq!(DEFAULT_PRIORITY.severity(), Severity::Notice);
    }

    #[test]
    fn test_every_priority_decomposes() {
        for value in 0..=999u32 {
            let pri = Priority::new(value).unwrap();
            assert_eq!(u32::from(pri.facility().code()), value >> 3);
            assert_eq!(u32::from(pri.severity().code()), value & 7);
            assert_eq!(Priority::from_parts(pri.facility(), pri.severity()), pri);
        }
    }

    #[test]
    fn test_unnamed_facilities() {
        assert_eq!(Priority::new(191).unwrap().facility(), Facility::Local7);
        assert_eq!(Priority::new(192).unwrap().facility(), Facility::Unknown(24));
        assert_eq!(Priority::new(999).unwrap().facility(), Facility::Unknown(124));
        assert_eq!(Facility::from_code(24), None);
        assert_eq!(Facility::Unknown(25).as_str(), "unknown");
        assert_eq!(Facility::Unknown(25).to_string(), "25");
        assert!(Priority::new(1000).is_none());
    }

    #[test]
    fn test_names() {
        assert_eq!(Facility::Authpriv.as_str(), "authpriv");
        assert_eq!(Facility::Local7.to_string(), "local7");
        assert_eq!(Severity::Emerg.as_str(), "emerg");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_severity_threshold() {
        assert!(Severity::Crit.is_at_least(Severity::Warning));
        assert!(Severity::Warning.is_at_least(Severity::Warning));
        assert!(!Severity::Debug.is_at_least(Severity::Warning));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Facility::Local3).unwrap();
        assert_eq!(json, "\"local3\"");
        let sev: Severity = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(sev, Severity::Info);
    }
}
