//! ConsoleSink - one human-readable line per record

use contracts::{ContractError, Record, RecordSink};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};

/// Sink that prints records in their display form
pub struct ConsoleSink<W = Stdout> {
    name: String,
    out: BufWriter<W>,
}

impl ConsoleSink<Stdout> {
    /// Console sink writing to stdout
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_writer(name, tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> ConsoleSink<W> {
    pub fn with_writer(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            out: BufWriter::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: AsyncWrite + Unpin + Send> RecordSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &Record) -> Result<(), ContractError> {
        let line = format!("{record}\n");
        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.out.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await
    }
}
