//! Server run statistics.

use std::time::Duration;

use dispatcher::{DispatchSnapshot, MetricsSnapshot};
use ingestion::ListenerSnapshot;

/// Statistics from a server run
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Per-listener counters, in listen order
    pub listeners: Vec<(String, ListenerSnapshot)>,

    /// Chain-level counters
    pub dispatch: DispatchSnapshot,

    /// Per-handler counters, in chain order
    pub handlers: Vec<(String, MetricsSnapshot)>,
}

impl ServerStats {
    /// Counters summed over every listener
    pub fn listeners_total(&self) -> ListenerSnapshot {
        self.listeners
            .iter()
            .fold(ListenerSnapshot::default(), |acc, (_, s)| acc + *s)
    }

    /// Records dispatched per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of dispatched records no handler took, as a percentage
    pub fn unhandled_rate(&self) -> f64 {
        if self.dispatch.dispatched > 0 {
            (self.dispatch.unhandled as f64 / self.dispatch.dispatched as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let total = self.listeners_total();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Server Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Datagrams received: {}", total.datagrams_received);
        println!("   ├─ Bytes received: {}", total.bytes_received);
        println!("   ├─ Records dispatched: {}", self.dispatch.dispatched);
        println!("   ├─ Records/s: {:.2}", self.records_per_sec());
        println!(
            "   └─ Unhandled: {} ({:.2}%)",
            self.dispatch.unhandled,
            self.unhandled_rate()
        );

        if !self.listeners.is_empty() {
            println!("\n📥 Listeners");
            for (i, (name, s)) in self.listeners.iter().enumerate() {
                let prefix = if i == self.listeners.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} datagrams, {} discarded, {} without header, {} read errors",
                    prefix,
                    name,
                    s.datagrams_received,
                    s.datagrams_discarded,
                    s.headerless_records,
                    s.read_errors
                );
            }
        }

        if !self.handlers.is_empty() {
            println!("\n⚙️  Handlers");
            for (i, (name, s)) in self.handlers.iter().enumerate() {
                let prefix = if i == self.handlers.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} queued, {} forwarded, {} bypassed, {} rejected, {} written, {} failed",
                    prefix,
                    name,
                    s.queued_count,
                    s.forwarded_count,
                    s.bypassed_count,
                    s.rejected_count,
                    s.write_count,
                    s.failure_count
                );
            }
        }

        if self.dispatch.rejected_after_shutdown > 0 {
            println!(
                "\n⚠️  Records offered after shutdown: {}",
                self.dispatch.rejected_after_shutdown
            );
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let stats = ServerStats {
            duration: Duration::from_secs(2),
            dispatch: DispatchSnapshot {
                dispatched: 10,
                absorbed: 6,
                unhandled: 4,
                rejected_after_shutdown: 0,
            },
            ..Default::default()
        };
        assert_eq!(stats.records_per_sec(), 5.0);
        assert_eq!(stats.unhandled_rate(), 40.0);
        assert_eq!(ServerStats::default().records_per_sec(), 0.0);
        assert_eq!(ServerStats::default().unhandled_rate(), 0.0);
    }

    #[test]
    fn test_listeners_total() {
        let snapshot = |n| ListenerSnapshot {
            datagrams_received: n,
            bytes_received: n * 10,
            ..Default::default()
        };
        let stats = ServerStats {
            listeners: vec![("udp".into(), snapshot(3)), ("unix".into(), snapshot(4))],
            ..Default::default()
        };
        let total = stats.listeners_total();
        assert_eq!(total.datagrams_received, 7);
        assert_eq!(total.bytes_received, 70);
    }
}
