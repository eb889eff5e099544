//! Instrumentation settings, loadable from any serde format.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sink::{LogSink, NoopSink, TraceSink, default_sink};

/// Which sink instrumentation writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkKind {
    /// The task-local collector (`huginn-tracing`).
    #[default]
    Collector,
    /// `tracing` DEBUG records.
    Log,
    /// Nothing.
    Off,
}

impl std::str::FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collector" => Ok(SinkKind::Collector),
            "log" => Ok(SinkKind::Log),
            "off" => Ok(SinkKind::Off),
            other => Err(format!(
                "Invalid sink '{other}'. Expected one of: collector, log, off."
            )),
        }
    }
}

/// Instrumentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Turn instrumentation off without unwiring it.
    pub enabled: bool,
    /// Label shown in span prefixes and event messages.
    pub label: String,
    pub sink: SinkKind,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: String::new(),
            sink: SinkKind::default(),
        }
    }
}

impl InstrumentationConfig {
    /// Build the configured sink.
    ///
    /// The collector resolves to the shared [`default_sink`].
    pub fn build_sink(&self) -> Arc<dyn TraceSink> {
        if !self.enabled {
            return Arc::new(NoopSink);
        }
        match self.sink {
            SinkKind::Collector => default_sink(),
            SinkKind::Log => Arc::new(LogSink),
            SinkKind::Off => Arc::new(NoopSink),
        }
    }
}
