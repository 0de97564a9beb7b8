//! ServerBlueprint - Config Loader output
//!
//! Describes the whole server: parser policy, listeners, and the ordered handler chain.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Facility, Severity};

/// Default receive buffer per listener (bytes). Longer datagrams are truncated.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 8192;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Parser settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Endpoints to listen on
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,

    /// Handler chain, in dispatch order
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// Parser settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// What to do with datagrams lacking a valid `<PRI>` prefix
    #[serde(default)]
    pub missing_priority: MissingPriority,
}

/// Policy for datagrams without a usable priority prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPriority {
    /// Assume priority 13 and keep parsing
    #[default]
    Default,
    /// Drop the datagram
    Discard,
}

/// One listening endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// `host:port` for UDP, otherwise a local datagram socket path
    pub address: String,

    /// Display name (defaults to the address)
    #[serde(default)]
    pub name: Option<String>,

    /// Receive buffer size in bytes
    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,
}

fn default_recv_buffer_size() -> usize {
    DEFAULT_RECV_BUFFER_SIZE
}

impl ListenerConfig {
    /// Listener with default settings
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }

    /// Name used in logs and metrics
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

/// One stage of the handler chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Handler name
    pub name: String,

    /// Handler kind
    pub kind: HandlerKind,

    /// Queue capacity (queue handlers only; 0 = always pass through)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Also pass queued records to the next handler
    #[serde(default)]
    pub forward_on_queue: bool,

    /// Where queued records go (queue handlers only)
    #[serde(default)]
    pub sink: SinkType,

    /// Record predicate
    #[serde(default)]
    pub filter: Option<FilterConfig>,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Handler kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Bounded queue drained by a sink worker
    Queue,
    /// Absorbs records the filter rejects, passes the rest
    Filter,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// tracing event per record
    #[default]
    Log,
    /// Human-readable line on stdout
    Console,
    /// JSON over UDP
    Network,
}

/// Record predicate settings. Every non-empty criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Accepted tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Accepted hostnames (records without a header never match)
    #[serde(default)]
    pub hostnames: Vec<String>,

    /// Accepted facilities
    #[serde(default)]
    pub facilities: Vec<Facility>,

    /// Least urgent severity accepted
    #[serde(default)]
    pub min_severity: Option<Severity>,
}

impl FilterConfig {
    /// True if no criterion is set (accepts everything)
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.hostnames.is_empty()
            && self.facilities.is_empty()
            && self.min_severity.is_none()
    }
}

impl ServerBlueprint {
    /// Add listeners given on the command line, skipping duplicates
    pub fn add_listen_addresses<I, S>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for address in addresses {
            let address = address.into();
            if !self.listeners.iter().any(|l| l.address == address) {
                self.listeners.push(ListenerConfig::new(address));
            }
        }
    }
}
