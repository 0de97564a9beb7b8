//! Pipeline orchestrator - builds the handler chain, starts the listeners and
//! runs the server until asked to stop.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::ServerBlueprint;
use dispatcher::Dispatcher;
use ingestion::Server;
use observability::{record_handler_report, HandlerReport};
use parser::Parser;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{info, warn};

use super::ServerStats;
use crate::error::CliError;

/// How often the orchestrator checks that some listener is still running
const LIVENESS_INTERVAL: Duration = Duration::from_secs(1);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The validated server configuration
    pub blueprint: ServerBlueprint,

    /// Run timeout (None = run until the shutdown signal)
    pub timeout: Option<Duration>,

    /// Handler metrics report interval (None = report only at shutdown)
    pub report_interval: Option<Duration>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the server until `shutdown` resolves, the timeout expires, or every
    /// listener has stopped. Shutdown is always orderly: listeners first, then
    /// the handler chain drains.
    pub async fn run<F>(self, shutdown: F) -> Result<ServerStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        info!("Setting up handler chain...");
        if blueprint.handlers.is_empty() {
            warn!("No handlers configured - every record will be unhandled");
        }
        let dispatcher = dispatcher::create_dispatcher(&blueprint.handlers)
            .await
            .context("Failed to create dispatcher")?;
        let dispatcher = Arc::new(dispatcher);
        info!(handlers = ?dispatcher.handler_names(), "Handler chain ready");

        let mut server = Server::new(Arc::clone(&dispatcher), Parser::new(&blueprint.parser));

        let mut failed = 0usize;
        for listener in &blueprint.listeners {
            match server.listen(listener).await {
                Ok(()) => info!(
                    listener = listener.display_name(),
                    address = %listener.address,
                    "Listening"
                ),
                Err(e) => {
                    failed += 1;
                    warn!(
                        listener = listener.display_name(),
                        error = %e,
                        "Failed to start listener"
                    );
                }
            }
        }

        if server.listener_count() == 0 {
            server.shutdown().await;
            return Err(CliError::NoListeners { failed }.into());
        }

        info!(
            listeners = server.listener_count(),
            failed,
            timeout = ?self.config.timeout,
            "Server running"
        );

        self.wait(&server, &dispatcher, shutdown).await;

        info!("Shutting down server...");
        server.shutdown().await;
        report_handlers(&dispatcher);

        let stats = ServerStats {
            duration: start_time.elapsed(),
            listeners: server.metrics(),
            dispatch: dispatcher.dispatch_metrics(),
            handlers: dispatcher.metrics(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rate = format!("{:.2}", stats.records_per_sec()),
            "Server shutdown complete"
        );

        Ok(stats)
    }

    async fn wait<F>(&self, server: &Server, dispatcher: &Dispatcher, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(deadline);

        let mut report = self.config.report_interval.map(ticker);
        let mut liveness = ticker(LIVENESS_INTERVAL);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = &mut deadline => {
                    info!(timeout = ?self.config.timeout, "Run timeout reached");
                    break;
                }
                _ = tick(&mut report) => report_handlers(dispatcher),
                _ = liveness.tick() => {
                    if server.active_listeners() == 0 {
                        warn!("All listeners have stopped");
                        break;
                    }
                }
            }
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Publish every handler's counters to the metrics recorder
fn report_handlers(dispatcher: &Dispatcher) {
    for (name, snapshot) in dispatcher.metrics() {
        record_handler_report(&HandlerReport {
            handler: &name,
            queue_len: snapshot.queue_len,
            queued: snapshot.queued_count,
            forwarded: snapshot.forwarded_count,
            bypassed: snapshot.bypassed_count,
            rejected: snapshot.rejected_count,
            written: snapshot.write_count,
            failed: snapshot.failure_count,
        });
    }
}
