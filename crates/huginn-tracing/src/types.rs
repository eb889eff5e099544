//! Trace data types.
//!
//! A [`Trace`] is the record of one traced task: every span opened while the
//! task ran inside [`with_tracing`](crate::with_tracing), with the events
//! recorded while each span was the innermost open one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete trace for one traced task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Unique identifier for this trace.
    pub trace_id: String,

    /// When the trace started.
    pub started_at: DateTime<Utc>,

    /// When the trace completed.
    pub ended_at: Option<DateTime<Utc>>,

    /// Total duration in milliseconds.
    pub duration_ms: Option<u64>,

    /// Top-level spans in this trace.
    pub spans: Vec<Span>,

    /// Events recorded while no span was open.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,

    /// Trace-level metadata (e.g., pipeline name, run configuration).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A named scope with a free-form message, e.g. `Action` / `[Auth] .login(..)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique identifier for this span within the trace.
    pub span_id: String,

    /// Span name, used to pair begin and end calls.
    pub name: String,

    /// Message attached when the span was opened.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    pub started_at: DateTime<Utc>,

    pub ended_at: Option<DateTime<Utc>>,

    pub duration_ms: Option<u64>,

    /// Events recorded while this span was the innermost open span.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,

    /// Spans opened while this one was open.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Span>,

    /// How the span was closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
}

/// How a span was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// Closed by a matching `end_span` call.
    Closed,

    /// Still open when the trace was finalized.
    Leaked,
}

/// A point-in-time record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,

    pub message: String,

    pub timestamp: DateTime<Utc>,
}

impl Trace {
    /// Create a new trace with the given ID.
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            spans: Vec::new(),
            events: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Generate a new trace with a random UUID.
    pub fn new_random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Add metadata to the trace.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }

    /// Mark the trace as complete.
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
    }

    /// Add a top-level span.
    pub fn add_span(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Total number of spans, nested ones included.
    pub fn span_count(&self) -> usize {
        let mut count = 0;
        for span in &self.spans {
            span.walk(&mut |_, _| count += 1);
        }
        count
    }

    /// Every span with the given name, in depth-first order.
    pub fn spans_named(&self, name: &str) -> Vec<&Span> {
        let mut found = Vec::new();
        for span in &self.spans {
            collect_named(span, name, &mut found);
        }
        found
    }
}

fn collect_named<'a>(span: &'a Span, name: &str, found: &mut Vec<&'a Span>) {
    if span.name == name {
        found.push(span);
    }
    for child in &span.children {
        collect_named(child, name, found);
    }
}

impl Span {
    /// Open a new span.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            message: message.into(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            events: Vec::new(),
            children: Vec::new(),
            status: None,
        }
    }

    /// Close the span with the given status.
    pub fn close(&mut self, status: SpanStatus) {
        let now = Utc::now();
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
        self.status = Some(status);
    }

    /// Record an event with the given name and message.
    pub fn record_event(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.events.push(Event::now(name, message));
    }

    /// Add a child span.
    pub fn add_child(&mut self, child: Span) {
        self.children.push(child);
    }

    /// Visit this span and its descendants depth-first, with their depth.
    pub fn walk<F: FnMut(&Span, usize)>(&self, visit: &mut F) {
        self.walk_at(0, visit);
    }

    fn walk_at<F: FnMut(&Span, usize)>(&self, depth: usize, visit: &mut F) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn now(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}
