//! Source - where a datagram came from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Network origin of a record.
///
/// For local datagram sockets the sender is usually unnamed; the listener then
/// reports its own socket path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// UDP peer address
    Udp(SocketAddr),
    /// Local datagram socket name
    Unix(PathBuf),
}

impl Source {
    /// Network part of the address only: the IP for UDP, the path for local sockets
    pub fn net_addr(&self) -> String {
        match self {
            Source::Udp(addr) => addr.ip().to_string(),
            Source::Unix(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Udp(addr) => write!(f, "{addr}"),
            Source::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<SocketAddr> for Source {
    fn from(addr: SocketAddr) -> Self {
        Source::Udp(addr)
    }
}
