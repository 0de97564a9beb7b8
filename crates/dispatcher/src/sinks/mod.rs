//! Sink implementations
//!
//! Contains LogSink, ConsoleSink, and NetworkSink.

mod console;
mod log;
mod network;

pub use self::console::ConsoleSink;
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
