//! Dispatcher - ordered handler chain

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use contracts::{Handler, HandlerConfig, HandlerKind, Record, Signal, SinkType};

use crate::error::DispatcherError;
use crate::filter::{FilterHandler, RecordFilter};
use crate::metrics::{DispatchMetrics, DispatchSnapshot, HandlerMetrics, MetricsSnapshot};
use crate::queuing::{QueueConfig, QueuingHandler};
use crate::sinks::{ConsoleSink, LogSink, NetworkSink};

struct Stage {
    handler: Arc<dyn Handler>,
    metrics: Option<Arc<HandlerMetrics>>,
}

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    stages: Vec<Stage>,
}

impl DispatcherBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the chain
    pub fn handler(self, handler: impl Handler + 'static) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Append a handler that is also referenced elsewhere
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.stages.push(Stage {
            handler,
            metrics: None,
        });
        self
    }

    /// Append a queuing handler and track its metrics
    pub fn queuing(mut self, handler: QueuingHandler) -> Self {
        let metrics = Arc::clone(handler.metrics());
        self.stages.push(Stage {
            handler: Arc::new(handler),
            metrics: Some(metrics),
        });
        self
    }

    /// Append a filter handler and track its metrics
    pub fn filter(mut self, handler: FilterHandler) -> Self {
        let metrics = Arc::clone(handler.metrics());
        self.stages.push(Stage {
            handler: Arc::new(handler),
            metrics: Some(metrics),
        });
        self
    }

    /// Append handlers built from configuration, in order
    #[instrument(
        name = "dispatcher_builder_configs",
        skip(self, configs),
        fields(handler_count = configs.len())
    )]
    pub async fn with_configs(mut self, configs: &[HandlerConfig]) -> Result<Self, DispatcherError> {
        for config in configs {
            self = match config.kind {
                HandlerKind::Queue => self.queuing(create_queuing_handler(config).await?),
                HandlerKind::Filter => self.filter(create_filter_handler(config)?),
            };
        }
        Ok(self)
    }

    /// Build the dispatcher
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            stages: self.stages,
            closed: AtomicBool::new(false),
            metrics: DispatchMetrics::default(),
        }
    }
}

fn queue_config(config: &HandlerConfig) -> QueueConfig {
    QueueConfig {
        capacity: config.queue_capacity,
        forward_on_queue: config.forward_on_queue,
        filter: config
            .filter
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| RecordFilter::from_config(f).into_predicate()),
    }
}

/// Create a QueuingHandler draining into the configured sink
#[instrument(
    name = "dispatcher_create_queuing_handler",
    skip(config),
    fields(handler = %config.name, sink_type = ?config.sink)
)]
async fn create_queuing_handler(config: &HandlerConfig) -> Result<QueuingHandler, DispatcherError> {
    let queue = queue_config(config);
    match config.sink {
        SinkType::Log => Ok(QueuingHandler::spawn(LogSink::new(&config.name), queue)),
        SinkType::Console => Ok(QueuingHandler::spawn(ConsoleSink::new(&config.name), queue)),
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::handler_creation(&config.name, e.to_string()))?;
            Ok(QueuingHandler::spawn(sink, queue))
        }
    }
}

fn create_filter_handler(config: &HandlerConfig) -> Result<FilterHandler, DispatcherError> {
    let filter = config
        .filter
        .as_ref()
        .ok_or_else(|| DispatcherError::handler_creation(&config.name, "missing 'filter' table"))?;
    Ok(FilterHandler::from_predicate(
        &config.name,
        RecordFilter::from_config(filter).into_predicate(),
    ))
}

/// Ordered chain of handlers shared by every listener
pub struct Dispatcher {
    stages: Vec<Stage>,
    closed: AtomicBool,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    /// Start building a chain
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Handler names in dispatch order
    pub fn handler_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.handler.name()).collect()
    }

    /// True once end-of-stream has been delivered
    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Get metrics for handlers that report them
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.stages
            .iter()
            .filter_map(|s| {
                let metrics = s.metrics.as_ref()?;
                Some((s.handler.name().to_string(), metrics.snapshot()))
            })
            .collect()
    }

    /// Chain-level counters
    pub fn dispatch_metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Offer a record to each handler in order until one absorbs it.
    ///
    /// Returns the record if it made it past the last handler. After
    /// shutdown the record is returned untouched.
    pub fn dispatch(&self, record: Arc<Record>) -> Option<Arc<Record>> {
        if self.is_shut_down() {
            self.metrics.record_rejected_after_shutdown();
            warn!("Record dispatched after shutdown, ignoring");
            return Some(record);
        }
        self.metrics.record_dispatched();

        let mut current = record;
        for stage in &self.stages {
            match stage.handler.handle(current) {
                Some(next) => current = next,
                None => {
                    self.metrics.record_absorbed();
                    return None;
                }
            }
        }

        self.metrics.record_unhandled();
        trace!(tag = %current.tag, "Record passed through every handler");
        Some(current)
    }

    /// Deliver a signal: records are dispatched, end-of-stream shuts the chain down
    pub async fn deliver(&self, signal: Signal) -> Option<Arc<Record>> {
        match signal {
            Signal::Record(record) => self.dispatch(record),
            Signal::EndOfStream => {
                self.shutdown().await;
                None
            }
        }
    }

    /// Send end-of-stream to each handler in order, waiting for each.
    ///
    /// Only the first call has any effect.
    #[instrument(name = "dispatcher_shutdown", skip(self), fields(handlers = self.stages.len()))]
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            warn!("Dispatcher already shut down");
            return;
        }

        for stage in &self.stages {
            debug!(handler = %stage.handler.name(), "Shutting down handler");
            stage.handler.shutdown().await;
        }

        let snapshot = self.metrics.snapshot();
        info!(
            dispatched = snapshot.dispatched,
            absorbed = snapshot.absorbed,
            unhandled = snapshot.unhandled,
            "Dispatcher shutdown complete"
        );
    }
}

/// Convenience function to create a dispatcher from handler configs
#[instrument(name = "dispatcher_create", skip(configs))]
pub async fn create_dispatcher(configs: &[HandlerConfig]) -> Result<Dispatcher, DispatcherError> {
    Ok(DispatcherBuilder::new().with_configs(configs).await?.build())
}
