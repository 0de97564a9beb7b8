//! NetworkSink - relays records over UDP, fire-and-forget

use contracts::{ContractError, Record, RecordSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument};

/// Wire format for relayed records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// One JSON object per datagram
    #[default]
    Json,
    /// The record's display line
    Text,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Largest datagram sent; bigger payloads are rejected
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("text") => NetworkFormat::Text,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(s) => s
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", s, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends records to a remote collector
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(sink = %name, target = %config.addr, "NetworkSink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_connection(&name, e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))
    }

    fn prepare_payload(&self, record: &Record) -> Result<Vec<u8>, ContractError> {
        let data = match self.config.format {
            NetworkFormat::Json => serde_json::to_vec(record)
                .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {}", e)))?,
            NetworkFormat::Text => record.to_string().into_bytes(),
        };

        if data.len() > self.config.max_packet_size {
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "payload of {} bytes exceeds max_packet_size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(data)
    }
}

impl RecordSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
        let data = self.prepare_payload(record)?;
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))?;

        match socket.send(&data).await {
            Ok(sent) => debug!(sink = %self.name, bytes = sent, "Sent"),
            // UDP is best-effort; a missing collector is not a write failure
            Err(e) => error!(sink = %self.name, error = %e, "UDP send failed"),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use contracts::{Facility, Severity, Source};
    use tokio::time::{timeout, Duration};

    fn record() -> Record {
        Record {
            received_at: Local::now(),
            source: Source::Udp("127.0.0.1:40000".parse().unwrap()),
            facility: Facility::Local0,
            severity: Severity::Warning,
            header: None,
            tag: "app".to_string(),
            content: ": disk 91% full".to_string(),
        }
    }

    #[test]
    fn test_network_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "text".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Text);
        assert_eq!(config.max_packet_size, 65000);
    }

    #[test]
    fn test_network_sink_config_errors() {
        assert!(NetworkSinkConfig::from_params(&HashMap::new()).is_err());

        let mut params = HashMap::new();
        params.insert("addr".to_string(), "nowhere".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());

        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_delivers_json() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = NetworkSinkConfig {
            addr: collector.local_addr().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        let mut sink = NetworkSink::new("relay", config).await.unwrap();
        sink.write(&record()).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let n = timeout(Duration::from_secs(2), collector.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(value["tag"], "app");
        assert_eq!(value["facility"], "local0");
    }

    #[tokio::test]
    async fn test_network_sink_rejects_oversized_payload() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: NetworkFormat::Text,
            max_packet_size: 8,
        };

        let mut sink = NetworkSink::new("tiny", config).await.unwrap();
        assert!(sink.write(&record()).await.is_err());
    }

    #[tokio::test]
    async fn test_network_sink_write_after_close() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19997".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        let mut sink = NetworkSink::new("closed", config).await.unwrap();
        sink.close().await.unwrap();
        assert!(sink.write(&record()).await.is_err());
    }
}
