//! LogSink - emits one tracing event per record

use contracts::{ContractError, Record, RecordSink};
use tracing::{info, instrument};

/// Sink that logs records through `tracing`
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record(&self, record: &Record) {
        info!(
            sink = %self.name,
            source = %record.source,
            facility = %record.facility,
            severity = %record.severity,
            hostname = record.hostname().unwrap_or("-"),
            tag = %record.tag,
            content = %record.content,
            "Syslog record"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
        self.log_record(record);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
