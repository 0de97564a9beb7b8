//! Endpoint - what a listener address string names

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{IngestionError, Result};

/// Listener endpoint.
///
/// An address containing `:` is UDP `host:port`; anything else is the path of
/// a local datagram socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// UDP `host:port`, resolved at bind time
    Udp(String),
    /// Local datagram socket path
    Unix(PathBuf),
}

impl Endpoint {
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(IngestionError::invalid_endpoint(address, "empty address"));
        }
        if address.contains(':') {
            Ok(Endpoint::Udp(address.to_string()))
        } else {
            Ok(Endpoint::Unix(PathBuf::from(address)))
        }
    }

    pub fn is_udp(&self) -> bool {
        matches!(self, Endpoint::Udp(_))
    }
}

impl FromStr for Endpoint {
    type Err = IngestionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Udp(address) => write!(f, "udp://{address}"),
            Endpoint::Unix(path) => write!(f, "unixgram://{}", path.display()),
        }
    }
}
