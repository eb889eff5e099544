//! Task-local trace collector.
//!
//! Spans and events are collected per async task. Code running outside a
//! [`with_tracing`] scope sees tracing as inactive and every call is a no-op,
//! so concurrent tasks never share a span stack. Futures joined within one
//! task do share it, and same-name spans pair latest first.

use std::cell::RefCell;
use std::mem;

use crate::types::{Event, Span, SpanStatus, Trace};

tokio::task_local! {
    static CURRENT_COLLECTOR: RefCell<TraceCollector>;
}

/// Collects spans and events for one traced task.
#[derive(Debug)]
pub struct TraceCollector {
    trace: Trace,
    open: Vec<Span>,
}

impl TraceCollector {
    /// Create a new collector with a random trace ID.
    pub fn new() -> Self {
        Self {
            trace: Trace::new_random(),
            open: Vec::new(),
        }
    }

    /// Create a new collector with a specific trace ID.
    pub fn with_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace: Trace::new(trace_id),
            open: Vec::new(),
        }
    }

    /// Add metadata to the trace.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl serde::Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.trace.metadata.insert(key.into(), v);
        }
    }

    /// Open a span. Closed by `end_span` with the same name.
    pub fn start_span(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.open.push(Span::new(name, message));
    }

    /// Record an event in the innermost open span, or on the trace itself.
    pub fn record_event(&mut self, name: impl Into<String>, message: impl Into<String>) {
        match self.open.last_mut() {
            Some(span) => span.record_event(name, message),
            None => self.trace.events.push(Event::now(name, message)),
        }
    }

    /// Close the most recently opened span called `name`.
    ///
    /// Spans opened after it stay open and are attached to whatever encloses
    /// them when they close. Returns `false` when no open span has that name.
    pub fn end_span(&mut self, name: &str) -> bool {
        let Some(index) = self.open.iter().rposition(|span| span.name == name) else {
            return false;
        };

        let later: Vec<Span> = self.open.drain(index + 1..).collect();
        let Some(mut span) = self.open.pop() else {
            return false;
        };
        span.close(SpanStatus::Closed);
        self.attach_span(span);
        self.open.extend(later);
        true
    }

    /// Number of spans currently open.
    pub fn open_spans(&self) -> usize {
        self.open.len()
    }

    fn attach_span(&mut self, span: Span) {
        if let Some(parent) = self.open.last_mut() {
            parent.add_child(span);
        } else {
            self.trace.add_span(span);
        }
    }

    /// Finalize the trace and return it.
    pub fn finalize(mut self) -> Trace {
        while let Some(mut span) = self.open.pop() {
            span.close(SpanStatus::Leaked);
            self.attach_span(span);
        }

        self.trace.complete();
        self.trace
    }

    /// Get the trace ID.
    pub fn trace_id(&self) -> &str {
        &self.trace.trace_id
    }
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute an async operation with tracing enabled.
///
/// Returns both the operation result and the completed trace.
pub async fn with_tracing<F, T>(f: F) -> (T, Trace)
where
    F: std::future::Future<Output = T>,
{
    scoped(TraceCollector::new(), f).await
}

/// Execute an async operation with tracing, using a specific trace ID.
pub async fn with_tracing_id<F, T>(trace_id: impl Into<String>, f: F) -> (T, Trace)
where
    F: std::future::Future<Output = T>,
{
    scoped(TraceCollector::with_trace_id(trace_id), f).await
}

async fn scoped<F, T>(collector: TraceCollector, f: F) -> (T, Trace)
where
    F: std::future::Future<Output = T>,
{
    CURRENT_COLLECTOR
        .scope(RefCell::new(collector), async {
            let result = f.await;
            let trace = CURRENT_COLLECTOR.with(|tc| {
                let collector = mem::take(&mut *tc.borrow_mut());
                collector.finalize()
            });
            (result, trace)
        })
        .await
}

/// Check if tracing is active in the current task.
pub fn is_tracing_active() -> bool {
    CURRENT_COLLECTOR.try_with(|_| ()).is_ok()
}

/// Add metadata to the current trace (no-op if tracing not active).
pub fn add_metadata(key: impl Into<String>, value: impl serde::Serialize) {
    let _ = CURRENT_COLLECTOR.try_with(|tc| tc.borrow_mut().add_metadata(key, value));
}

/// Open a span in the current trace (no-op if tracing not active).
pub fn start_span(name: impl Into<String>, message: impl Into<String>) {
    let _ = CURRENT_COLLECTOR.try_with(|tc| tc.borrow_mut().start_span(name, message));
}

/// Record an event in the current span (no-op if tracing not active).
pub fn record_event(name: impl Into<String>, message: impl Into<String>) {
    let _ = CURRENT_COLLECTOR.try_with(|tc| tc.borrow_mut().record_event(name, message));
}

/// Close the latest open span called `name` (no-op if tracing not active).
pub fn end_span(name: &str) {
    let _ = CURRENT_COLLECTOR.try_with(|tc| tc.borrow_mut().end_span(name));
}

/// Get the current trace ID (returns None if tracing not active).
pub fn current_trace_id() -> Option<String> {
    CURRENT_COLLECTOR
        .try_with(|tc| tc.borrow().trace_id().to_string())
        .ok()
}
