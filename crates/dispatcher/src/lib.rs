//! # Dispatcher
//!
//! Handler chain for parsed syslog records.
//!
//! Responsibilities:
//! - Offer each record to an ordered chain of handlers until one absorbs it
//! - Buffer records for slow consumers without blocking listeners
//! - Propagate end-of-stream and wait for queues to drain

pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod queuing;
pub mod sinks;

pub use contracts::{Handler, Record, RecordSink, Signal};
pub use dispatcher::{Dispatcher, DispatcherBuilder, create_dispatcher};
pub use error::DispatcherError;
pub use filter::{FilterHandler, RecordFilter, RecordPredicate};
pub use metrics::{DispatchSnapshot, HandlerMetrics, MetricsSnapshot};
pub use queuing::{QueueConfig, QueueConsumer, QueuingHandler};
pub use sinks::{ConsoleSink, LogSink, NetworkSink};
