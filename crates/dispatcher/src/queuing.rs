//! QueuingHandler - bounded queue stage with a shutdown handshake
//!
//! The handler side is offered records by the chain and never blocks. The
//! consumer side ([`QueueConsumer`]) drains the queue, usually from a worker
//! task, and signals completion once it has seen the end of the queue.

use std::fmt;
use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, instrument, trace, warn};

use contracts::{Handler, Record, RecordSink, ShutdownFuture};

use crate::filter::RecordPredicate;
use crate::metrics::HandlerMetrics;

/// Queue settings
#[derive(Clone, Default)]
pub struct QueueConfig {
    /// Maximum records held (0 = always pass through)
    pub capacity: usize,
    /// Also pass accepted records to the next handler
    pub forward_on_queue: bool,
    /// Only records matching the predicate are queued
    pub filter: Option<RecordPredicate>,
}

impl QueueConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn forward_on_queue(mut self, forward: bool) -> Self {
        self.forward_on_queue = forward;
        self
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }
}

impl fmt::Debug for QueueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueConfig")
            .field("capacity", &self.capacity)
            .field("forward_on_queue", &self.forward_on_queue)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Handler that buffers records for a consumer
pub struct QueuingHandler {
    name: String,
    capacity: usize,
    forward_on_queue: bool,
    filter: Option<RecordPredicate>,
    tx: Sender<Arc<Record>>,
    /// Completion signal from the consumer, taken by the first shutdown
    done: Mutex<Option<oneshot::Receiver<()>>>,
    metrics: Arc<HandlerMetrics>,
}

/// Consumer end of a [`QueuingHandler`]
pub struct QueueConsumer {
    name: String,
    rx: Receiver<Arc<Record>>,
    done: oneshot::Sender<()>,
    metrics: Arc<HandlerMetrics>,
}

impl QueuingHandler {
    /// Create a handler and the consumer that drains it
    pub fn new(name: impl Into<String>, config: QueueConfig) -> (Self, QueueConsumer) {
        let name = name.into();
        // A zero-capacity handler never sends; the channel still needs a slot
        let (tx, rx) = async_channel::bounded(config.capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();
        let metrics = Arc::new(HandlerMetrics::new());

        let handler = Self {
            name: name.clone(),
            capacity: config.capacity,
            forward_on_queue: config.forward_on_queue,
            filter: config.filter,
            tx,
            done: Mutex::new(Some(done_rx)),
            metrics: Arc::clone(&metrics),
        };
        let consumer = QueueConsumer {
            name,
            rx,
            done: done_tx,
            metrics,
        };
        (handler, consumer)
    }

    /// Create a handler whose queue is drained into `sink` by a worker task
    pub fn spawn<S: RecordSink + Send + 'static>(sink: S, config: QueueConfig) -> Self {
        let (handler, consumer) = Self::new(sink.name(), config);
        tokio::spawn(sink_worker(sink, consumer));
        handler
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }

    fn accepts(&self, record: &Record) -> bool {
        self.filter.as_ref().map_or(true, |f| f(record))
    }
}

impl Handler for QueuingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, record: Arc<Record>) -> Option<Arc<Record>> {
        if !self.accepts(&record) {
            self.metrics.inc_rejected_count();
            return Some(record);
        }
        if self.capacity == 0 {
            self.metrics.inc_bypassed_count();
            return Some(record);
        }

        let forward = self.forward_on_queue.then(|| Arc::clone(&record));
        match self.tx.try_send(record) {
            Ok(()) => {
                self.metrics.inc_queued_count();
                self.metrics.set_queue_len(self.tx.len());
                if forward.is_some() {
                    self.metrics.inc_forwarded_count();
                }
                forward
            }
            Err(TrySendError::Full(record)) => {
                self.metrics.inc_bypassed_count();
                trace!(handler = %self.name, "Queue full, passing record on");
                Some(record)
            }
            Err(TrySendError::Closed(record)) => {
                warn!(handler = %self.name, "Record offered after shutdown, passing on");
                Some(record)
            }
        }
    }

    fn shutdown(&self) -> ShutdownFuture<'_> {
        Box::pin(async move {
            if !self.tx.close() {
                warn!(handler = %self.name, "Shutdown requested twice, ignoring");
                return;
            }
            debug!(handler = %self.name, pending = self.tx.len(), "Queue closed, waiting for consumer");

            let done = self.done.lock().await.take();
            if let Some(done) = done {
                if done.await.is_err() {
                    warn!(handler = %self.name, "Consumer went away without signalling completion");
                }
            }
            debug!(handler = %self.name, "QueuingHandler shutdown complete");
        })
    }
}

impl QueueConsumer {
    /// Name of the owning handler
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared metrics of the owning handler
    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }

    /// Wait for the next record.
    ///
    /// Returns `None` once the handler has been shut down and every record
    /// queued before that has been taken.
    pub async fn dequeue(&self) -> Option<Arc<Record>> {
        let record = self.rx.recv().await.ok();
        self.metrics.set_queue_len(self.rx.len());
        record
    }

    /// Take a record if one is ready
    pub fn try_dequeue(&self) -> Option<Arc<Record>> {
        let record = self.rx.try_recv().ok();
        self.metrics.set_queue_len(self.rx.len());
        record
    }

    /// Records currently waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Complete the shutdown handshake. Unblocks the handler's `shutdown`.
    pub fn signal_done(self) {
        if self.done.send(()).is_err() {
            debug!(handler = %self.name, "Handler dropped before completion signal");
        }
    }
}

/// Worker task that drains the queue into a sink
#[instrument(name = "queue_worker_loop", skip(sink, consumer), fields(handler = %consumer.name()))]
async fn sink_worker<S: RecordSink>(mut sink: S, consumer: QueueConsumer) {
    debug!("Queue worker started");
    let metrics = Arc::clone(consumer.metrics());

    while let Some(record) = consumer.dequeue().await {
        match sink.write(&record).await {
            Ok(()) => metrics.inc_write_count(),
            Err(e) => {
                metrics.inc_failure_count();
                error!(error = %e, source = %record.source, "Write failed");
                // Keep draining; one bad write must not stall the queue
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(error = %e, "Close failed on shutdown");
    }

    debug!("Queue worker stopped");
    consumer.signal_done();
}
