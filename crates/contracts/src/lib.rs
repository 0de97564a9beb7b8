//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the syslog server.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Record model
//! - One [`Record`] per received datagram, immutable once built
//! - Records travel through the handler chain as `Arc<Record>`; a handler that
//!   needs a different view returns a replacement instead of mutating

mod blueprint;
mod error;
mod handler;
mod priority;
mod record;
mod sink;
mod source;

pub use blueprint::*;
pub use error::*;
pub use handler::{Handler, ShutdownFuture, Signal};
pub use priority::{Facility, Priority, Severity, DEFAULT_PRIORITY};
pub use record::{Header, Record};
pub use sink::*;
pub use source::Source;
