//! Execution decorator that records telemetry around every command.
//!
//! [`Logger::command`] never changes the outcome of the wrapped body. It
//! emits one `started` event and exactly one terminal event, even when the
//! body panics or the future is dropped before completing.

use crate::command::{LoggedProperties, TerraformCommand};
use crate::error::CommandError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const ABORTED: &str = "command aborted before completion";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    Started {
        execution_id: String,
        command: String,
        properties: LoggedProperties,
        timestamp: String,
    },
    Succeeded {
        execution_id: String,
        command: String,
        duration_ms: u64,
        status: serde_json::Value,
        timestamp: String,
    },
    Failed {
        execution_id: String,
        command: String,
        duration_ms: u64,
        error: String,
        timestamp: String,
    },
}

impl TelemetryEvent {
    pub fn command(&self) -> &str {
        match self {
            TelemetryEvent::Started { command, .. }
            | TelemetryEvent::Succeeded { command, .. }
            | TelemetryEvent::Failed { command, .. } => command,
        }
    }

    pub fn execution_id(&self) -> &str {
        match self {
            TelemetryEvent::Started { execution_id, .. }
            | TelemetryEvent::Succeeded { execution_id, .. }
            | TelemetryEvent::Failed { execution_id, .. } => execution_id,
        }
    }
}

/// Destination for telemetry events.
///
/// Recording must not fail the command, so it has no error channel.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &TelemetryEvent);
}

/// Sink that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &TelemetryEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        match event {
            TelemetryEvent::Failed { .. } => {
                warn!(target: "tfcli::telemetry", command = event.command(), "{}", payload)
            }
            _ => info!(target: "tfcli::telemetry", command = event.command(), "{}", payload),
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn TelemetrySink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Run `body` for `command`, measuring its duration and outcome.
    pub async fn command<T, Fut>(
        &self,
        command: &TerraformCommand,
        properties: LoggedProperties,
        body: Fut,
    ) -> Result<T, CommandError>
    where
        T: Serialize,
        Fut: Future<Output = Result<T, CommandError>>,
    {
        let mut flight = InFlight::start(self.sink.as_ref(), command.name(), properties);
        let result = body.await;
        match &result {
            Ok(status) => flight.succeeded(serde_json::to_value(status).unwrap_or_default()),
            Err(err) => flight.failed(err.to_string()),
        }
        result
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

/// Tracks an execution between its start and terminal events.
struct InFlight<'a> {
    sink: &'a dyn TelemetrySink,
    execution_id: String,
    command: String,
    started: Instant,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn start(sink: &'a dyn TelemetrySink, command: &str, properties: LoggedProperties) -> Self {
        let execution_id = uuid::Uuid::new_v4().to_string();
        sink.record(&TelemetryEvent::Started {
            execution_id: execution_id.clone(),
            command: command.to_string(),
            properties,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });

        Self {
            sink,
            execution_id,
            command: command.to_string(),
            started: Instant::now(),
            finished: false,
        }
    }

    fn duration_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn succeeded(&mut self, status: serde_json::Value) {
        self.finished = true;
        self.sink.record(&TelemetryEvent::Succeeded {
            execution_id: self.execution_id.clone(),
            command: self.command.clone(),
            duration_ms: self.duration_ms(),
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    fn failed(&mut self, error: String) {
        self.finished = true;
        self.sink.record(&TelemetryEvent::Failed {
            execution_id: self.execution_id.clone(),
            command: self.command.clone(),
            duration_ms: self.duration_ms(),
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.failed(ABORTED.to_string());
        }
    }
}
