//! # Ingestion
//!
//! Syslog datagram listeners.
//!
//! Responsibilities:
//! - Bind UDP (`host:port`) and local datagram socket (path) endpoints
//! - Receive, timestamp, parse and dispatch each datagram in arrival order
//! - Stop listeners before the handler chain sees end-of-stream
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dispatcher::Dispatcher;
//! use ingestion::Server;
//! use parser::Parser;
//!
//! let dispatcher = Arc::new(Dispatcher::builder().queuing(queue).build());
//! let mut server = Server::new(dispatcher, Parser::default());
//! server.listen_addr("0.0.0.0:1514").await?;
//! server.listen_addr("/run/syslog.sock").await?;
//!
//! // ...
//! server.shutdown().await;
//! ```

mod endpoint;
mod error;
mod listener;
mod metrics;
mod server;

// Re-exports
pub use endpoint::Endpoint;
pub use error::{IngestionError, Result};
pub use listener::Listener;
pub use metrics::{ListenerMetrics, ListenerSnapshot};
pub use server::Server;
