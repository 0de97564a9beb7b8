//! Listener - one bound endpoint and its receive loop

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::net::{UdpSocket, UnixDatagram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use contracts::{ListenerConfig, Source};
use dispatcher::Dispatcher;
use parser::Parser;

use crate::endpoint::Endpoint;
use crate::error::{IngestionError, Result};
use crate::metrics::ListenerMetrics;

/// Local datagram socket; the socket file goes away with it
struct UnixSocket {
    socket: UnixDatagram,
    path: PathBuf,
}

impl Drop for UnixSocket {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Socket file removed"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove socket file"),
        }
    }
}

enum Socket {
    Udp(UdpSocket),
    Unix(UnixSocket),
}

impl Socket {
    async fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, Source)> {
        match self {
            Socket::Udp(socket) => {
                let (len, peer) = socket.recv_from(buf).await?;
                Ok((len, Source::Udp(peer)))
            }
            Socket::Unix(unix) => {
                let (len, peer) = unix.socket.recv_from(buf).await?;
                // Unnamed senders are reported as the listening path
                let from = peer.as_pathname().unwrap_or(unix.path.as_path()).to_path_buf();
                Ok((len, Source::Unix(from)))
            }
        }
    }
}

/// A bound endpoint, ready to run
pub struct Listener {
    name: String,
    endpoint: Endpoint,
    socket: Socket,
    recv_buffer_size: usize,
    metrics: Arc<ListenerMetrics>,
}

impl Listener {
    /// Bind the configured endpoint
    #[instrument(name = "listener_bind", skip(config), fields(listener = %config.display_name()))]
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let endpoint = Endpoint::parse(&config.address)?;
        if config.recv_buffer_size == 0 {
            return Err(IngestionError::invalid_endpoint(
                &config.address,
                "recv_buffer_size must be greater than 0",
            ));
        }

        let bind_error = |source| IngestionError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };
        let socket = match &endpoint {
            Endpoint::Udp(address) => {
                let addr = resolve(address).await?;
                Socket::Udp(UdpSocket::bind(addr).await.map_err(bind_error)?)
            }
            Endpoint::Unix(path) => Socket::Unix(UnixSocket {
                socket: UnixDatagram::bind(path).map_err(bind_error)?,
                path: path.clone(),
            }),
        };

        info!(
            endpoint = %endpoint,
            recv_buffer_size = config.recv_buffer_size,
            "Listener bound"
        );

        Ok(Self {
            name: config.display_name().to_string(),
            endpoint,
            socket,
            recv_buffer_size: config.recv_buffer_size,
            metrics: Arc::new(ListenerMetrics::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Bound UDP address (resolves port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            Socket::Udp(socket) => socket.local_addr().ok(),
            Socket::Unix(_) => None,
        }
    }

    pub fn metrics(&self) -> &Arc<ListenerMetrics> {
        &self.metrics
    }

    /// Receive, parse and dispatch until cancelled or a read fails.
    #[instrument(name = "listener_run", skip_all, fields(listener = %self.name))]
    pub async fn run(self, dispatcher: Arc<Dispatcher>, parser: Parser, cancel: CancellationToken) {
        info!(endpoint = %self.endpoint, "Listener started");
        let mut buf = vec![0u8; self.recv_buffer_size];

        loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Listener cancelled");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => received,
            };

            match received {
                Ok((len, source)) => self.process(&buf[..len], source, &dispatcher, &parser),
                Err(e) => {
                    self.metrics.record_read_error();
                    observability::record_read_error(&self.name);
                    error!(error = %e, "Read error, listener stopping");
                    break;
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            datagrams = snapshot.datagrams_received,
            bytes = snapshot.bytes_received,
            "Listener stopped"
        );
    }

    fn process(&self, datagram: &[u8], source: Source, dispatcher: &Dispatcher, parser: &Parser) {
        self.metrics.record_datagram(datagram.len());
        observability::record_datagram_received(&self.name, datagram.len());

        let Some(record) = parser.parse(datagram, source, Local::now()) else {
            self.metrics.record_discarded();
            observability::record_datagram_discarded(&self.name);
            trace!("Datagram without priority discarded");
            return;
        };
        if record.header.is_none() {
            self.metrics.record_headerless();
        }
        observability::record_record_parsed(
            record.facility,
            record.severity,
            record.header.is_some(),
        );

        if let Some(record) = dispatcher.dispatch(Arc::new(record)) {
            self.metrics.record_unhandled();
            observability::record_record_unhandled(&self.name);
            trace!(source = %record.source, tag = %record.tag, "Record not handled");
        }
    }
}

async fn resolve(address: &str) -> Result<SocketAddr> {
    let resolve_error = |source| IngestionError::Resolve {
        address: address.to_string(),
        source,
    };
    tokio::net::lookup_host(address)
        .await
        .map_err(resolve_error)?
        .next()
        .ok_or_else(|| {
            resolve_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses found",
            ))
        })
}
