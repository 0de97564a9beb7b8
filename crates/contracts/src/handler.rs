//! Handler trait - one stage of the dispatch chain
//!
//! A handler absorbs a record (`None`) or passes it on (`Some`), possibly
//! replaced. The same interface serves filters, transforms and terminal sinks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::Record;

/// Future returned by [`Handler::shutdown`]
pub type ShutdownFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// What travels down the chain: a record or the end-of-stream marker
#[derive(Debug, Clone)]
pub enum Signal {
    /// A parsed record
    Record(Arc<Record>),
    /// No more records will follow
    EndOfStream,
}

/// One stage of the handler chain.
///
/// Handlers are shared by every listener feeding the same dispatcher, so both
/// methods take `&self`.
pub trait Handler: Send + Sync {
    /// Handler name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Offer a record.
    ///
    /// Must not block. Return `None` to absorb the record, or `Some` to pass it
    /// (or a replacement) to the next handler.
    fn handle(&self, record: Arc<Record>) -> Option<Arc<Record>>;

    /// Receive the end-of-stream signal.
    ///
    /// Called exactly once, after the last `handle`. The future resolves only
    /// after in-flight work is complete and resources are released.
    fn shutdown(&self) -> ShutdownFuture<'_> {
        Box::pin(std::future::ready(()))
    }
}
