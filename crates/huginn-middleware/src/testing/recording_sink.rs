//! Trace sink that records calls instead of tracing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::sink::TraceSink;

/// A call made against a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    BeginSpan { name: String, message: String },
    EndSpan { name: String },
    Event { name: String, message: String },
}

impl SinkCall {
    pub fn begin(name: impl Into<String>, message: impl Into<String>) -> Self {
        SinkCall::BeginSpan {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        SinkCall::EndSpan { name: name.into() }
    }

    pub fn event(name: impl Into<String>, message: impl Into<String>) -> Self {
        SinkCall::Event {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A sink that captures calls for assertions.
///
/// # Example
///
/// ```
/// use huginn_middleware::TraceSink;
/// use huginn_middleware::testing::{RecordingSink, SinkCall};
///
/// let sink = RecordingSink::new();
/// sink.begin_span("Action", "[Auth] .login");
/// sink.end_span("Action");
///
/// assert_eq!(sink.calls()[0], SinkCall::begin("Action", "[Auth] .login"));
/// sink.assert_balanced();
/// ```
#[derive(Debug)]
pub struct RecordingSink {
    active: AtomicBool,
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    /// An active sink.
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An inactive sink; instrumentation should never call it.
    pub fn inactive() -> Self {
        let sink = Self::new();
        sink.set_active(false);
        sink
    }

    /// Switch tracing on or off.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn begin_count(&self) -> usize {
        self.count(|call| matches!(call, SinkCall::BeginSpan { .. }))
    }

    pub fn end_count(&self) -> usize {
        self.count(|call| matches!(call, SinkCall::EndSpan { .. }))
    }

    pub fn event_count(&self) -> usize {
        self.count(|call| matches!(call, SinkCall::Event { .. }))
    }

    /// Assert every begun span was ended, and never before it began.
    ///
    /// # Panics
    ///
    /// Panics if an end has no open span or a span is left open.
    pub fn assert_balanced(&self) {
        let mut open = 0usize;
        for (index, call) in self.lock().iter().enumerate() {
            match call {
                SinkCall::BeginSpan { .. } => open += 1,
                SinkCall::EndSpan { name } => {
                    assert!(open > 0, "end of span {name:?} at call {index} with no open span");
                    open -= 1;
                }
                SinkCall::Event { .. } => {}
            }
        }
        assert_eq!(open, 0, "{open} span(s) left open");
    }

    fn count(&self, predicate: impl Fn(&SinkCall) -> bool) -> usize {
        self.lock().iter().filter(|call| predicate(call)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkCall>> {
        // A panicking test thread must not hide what was recorded.
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: SinkCall) {
        self.lock().push(call);
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for RecordingSink {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn begin_span(&self, name: &str, message: &str) {
        self.record(SinkCall::begin(name, message));
    }

    fn end_span(&self, name: &str) {
        self.record(SinkCall::end(name));
    }

    fn emit_event(&self, name: &str, message: &str) {
        self.record(SinkCall::event(name, message));
    }
}
