//! Console event sink

use std::io::{self, Write};

use port_watch::{Port, PortEvent, PortEventSink};
use tracing::warn;

/// How events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable blocks
    Text,
    /// One JSON object per line
    Json,
}

/// Writes port events to a terminal or any other writer
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
    format: OutputFormat,
}

impl ConsoleSink {
    /// Create a sink writing to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Create a sink over a writer
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    fn write_event(&mut self, event: PortEvent) {
        let result = match self.format {
            OutputFormat::Text => writeln!(self.out, "{}\n{}\n", event.label(), event.port()),
            OutputFormat::Json => match serde_json::to_string(&event) {
                Ok(line) => writeln!(self.out, "{}", line),
                Err(e) => {
                    warn!("Failed to encode event: {}", e);
                    return;
                }
            },
        };

        if let Err(e) = result.and_then(|_| self.out.flush()) {
            warn!("Failed to write event: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PortEventSink for ConsoleSink<W> {
    fn on_initial_port(&mut self, port: Port) {
        self.write_event(PortEvent::InitialDetected(port));
    }

    fn on_port_added(&mut self, port: Port) {
        self.write_event(PortEvent::Added(port));
    }

    fn on_port_removed(&mut self, port: Port) {
        self.write_event(PortEvent::Removed(port));
    }
}
