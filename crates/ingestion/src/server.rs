//! Server - running listeners sharing one dispatcher

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use contracts::ListenerConfig;
use dispatcher::Dispatcher;
use parser::Parser;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::listener::Listener;
use crate::metrics::{ListenerMetrics, ListenerSnapshot};

/// Bookkeeping for a spawned listener
struct RunningListener {
    name: String,
    endpoint: Endpoint,
    local_addr: Option<SocketAddr>,
    metrics: Arc<ListenerMetrics>,
    task: Option<JoinHandle<()>>,
}

/// Owns the listeners and the handler chain they feed
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    parser: Parser,
    cancel: CancellationToken,
    listeners: Vec<RunningListener>,
}

impl Server {
    /// Create a server; handlers must already be registered on `dispatcher`
    pub fn new(dispatcher: Arc<Dispatcher>, parser: Parser) -> Self {
        Self {
            dispatcher,
            parser,
            cancel: CancellationToken::new(),
            listeners: Vec::new(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Bind an endpoint and start its receive loop.
    ///
    /// A failure affects only this endpoint; listeners already running keep going.
    #[instrument(name = "server_listen", skip(self, config), fields(address = %config.address))]
    pub async fn listen(&mut self, config: &ListenerConfig) -> Result<()> {
        let listener = Listener::bind(config).await?;

        let name = listener.name().to_string();
        let endpoint = listener.endpoint().clone();
        let local_addr = listener.local_addr();
        let metrics = Arc::clone(listener.metrics());

        let task = tokio::spawn(listener.run(
            Arc::clone(&self.dispatcher),
            self.parser,
            self.cancel.child_token(),
        ));

        self.listeners.push(RunningListener {
            name,
            endpoint,
            local_addr,
            metrics,
            task: Some(task),
        });
        Ok(())
    }

    /// Listen on an address with default settings
    pub async fn listen_addr(&mut self, address: &str) -> Result<()> {
        self.listen(&ListenerConfig::new(address)).await
    }

    /// Number of listeners started
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners whose loop is still running
    pub fn active_listeners(&self) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.task.as_ref().is_some_and(|t| !t.is_finished()))
            .count()
    }

    /// Bound UDP addresses, in listen order
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.iter().filter_map(|l| l.local_addr).collect()
    }

    /// Endpoints, in listen order
    pub fn endpoints(&self) -> Vec<&Endpoint> {
        self.listeners.iter().map(|l| &l.endpoint).collect()
    }

    /// Per-listener metrics
    pub fn metrics(&self) -> Vec<(String, ListenerSnapshot)> {
        self.listeners
            .iter()
            .map(|l| (l.name.clone(), l.metrics.snapshot()))
            .collect()
    }

    /// Stop every listener, then deliver end-of-stream to the handler chain.
    ///
    /// Returns once every queue has been drained.
    #[instrument(name = "server_shutdown", skip(self), fields(listeners = self.listeners.len()))]
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();

        for listener in &mut self.listeners {
            if let Some(task) = listener.task.take() {
                if let Err(e) = task.await {
                    error!(listener = %listener.name, error = ?e, "Listener task panicked");
                }
            }
        }
        info!("All listeners stopped");

        self.dispatcher.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher::{QueueConfig, QueuingHandler};
    use tokio::net::UdpSocket;
    use tokio::time::{sleep, timeout, Duration};

    #[tokio::test]
    async fn test_listen_failure_is_local() {
        let dispatcher = Arc::new(Dispatcher::builder().build());
        let mut server = Server::new(dispatcher, Parser::default());

        server.listen_addr("127.0.0.1:0").await.unwrap();
        let taken = server.local_addrs()[0].to_string();

        // Same port again fails, the first listener keeps running
        assert!(server.listen_addr(&taken).await.is_err());
        assert!(server.listen_addr("/nonexistent-dir/x.sock").await.is_err());
        assert_eq!(server.listener_count(), 1);
        assert_eq!(server.active_listeners(), 1);

        server.shutdown().await;
        assert_eq!(server.active_listeners(), 0);
        assert!(server.dispatcher().is_shut_down());
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue_after_listeners() {
        let (queue, consumer) = QueuingHandler::new("q", QueueConfig::new(64));
        let dispatcher = Arc::new(Dispatcher::builder().queuing(queue).build());
        let mut server = Server::new(dispatcher, Parser::default());
        server.listen_addr("127.0.0.1:0").await.unwrap();
        let addr = server.local_addrs()[0];

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for i in 0..20 {
            client
                .send_to(format!("<13>app: {i}").as_bytes(), addr)
                .await
                .unwrap();
        }
        timeout(Duration::from_secs(2), async {
            while server.metrics()[0].1.datagrams_received < 20 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let drain = tokio::spawn(async move {
            let mut contents = Vec::new();
            while let Some(record) = consumer.dequeue().await {
                contents.push(record.content.clone());
            }
            consumer.signal_done();
            contents
        });

        server.shutdown().await;
        let contents = drain.await.unwrap();
        let expected: Vec<String> = (0..20).map(|i| format!(": {i}")).collect();
        assert_eq!(contents, expected);
    }
}
