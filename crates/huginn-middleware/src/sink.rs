//! Trace sinks: where instrumentation sends its spans and events.

use std::sync::{Arc, LazyLock};

/// Backend that records spans and events.
///
/// Calls are fire-and-forget. Instrumentation checks [`is_active`] before
/// formatting anything, so an inactive sink costs one call per action.
/// Spans are paired by position: every `begin_span` is followed by exactly
/// one `end_span` with the same name.
///
/// [`is_active`]: TraceSink::is_active
pub trait TraceSink: Send + Sync {
    /// Whether anything would be recorded right now.
    fn is_active(&self) -> bool;

    fn begin_span(&self, name: &str, message: &str);

    fn end_span(&self, name: &str);

    fn emit_event(&self, name: &str, message: &str);
}

impl<T: TraceSink + ?Sized> TraceSink for Arc<T> {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn begin_span(&self, name: &str, message: &str) {
        (**self).begin_span(name, message)
    }

    fn end_span(&self, name: &str) {
        (**self).end_span(name)
    }

    fn emit_event(&self, name: &str, message: &str) {
        (**self).emit_event(name, message)
    }
}

/// Records into the task-local collector of `huginn-tracing`.
///
/// Active only while the current task runs inside
/// [`huginn_tracing::with_tracing`].
///
/// Spans are ended by name, so `end_span` closes the most recent open
/// `Action` span. Effects of several actions polled concurrently in one
/// task (`join!`, `FuturesUnordered`) can therefore close each other's
/// spans and record events into the wrong one. Run such effects in
/// separate traced tasks, or one at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorSink;

impl TraceSink for CollectorSink {
    fn is_active(&self) -> bool {
        huginn_tracing::is_tracing_active()
    }

    fn begin_span(&self, name: &str, message: &str) {
        huginn_tracing::start_span(name, message);
    }

    fn end_span(&self, name: &str) {
        huginn_tracing::end_span(name);
    }

    fn emit_event(&self, name: &str, message: &str) {
        huginn_tracing::record_event(name, message);
    }
}

/// Target used by [`LogSink`].
pub const LOG_TARGET: &str = "huginn::signpost";

/// Writes spans and events as `tracing` DEBUG records.
///
/// Active when DEBUG is enabled for [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn is_active(&self) -> bool {
        tracing::enabled!(target: LOG_TARGET, tracing::Level::DEBUG)
    }

    fn begin_span(&self, name: &str, message: &str) {
        tracing::debug!(target: LOG_TARGET, span = name, phase = "begin", "{message}");
    }

    fn end_span(&self, name: &str) {
        tracing::debug!(target: LOG_TARGET, span = name, phase = "end");
    }

    fn emit_event(&self, name: &str, message: &str) {
        tracing::debug!(target: LOG_TARGET, event = name, "{message}");
    }
}

/// Never active; records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn is_active(&self) -> bool {
        false
    }

    fn begin_span(&self, _name: &str, _message: &str) {}

    fn end_span(&self, _name: &str) {}

    fn emit_event(&self, _name: &str, _message: &str) {}
}

static DEFAULT_SINK: LazyLock<Arc<dyn TraceSink>> = LazyLock::new(|| Arc::new(CollectorSink));

/// The process-wide default sink, a shared [`CollectorSink`].
pub fn default_sink() -> Arc<dyn TraceSink> {
    Arc::clone(&DEFAULT_SINK)
}
