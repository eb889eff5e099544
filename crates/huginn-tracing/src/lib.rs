//! Task-local trace collection.
//!
//! This crate is the default backend behind huginn's instrumented middleware:
//!
//! - **Types**: `Trace`, `Span` and `Event` records, all serializable
//! - **Collector**: task-local collection via `with_tracing()` and free
//!   functions that are no-ops outside a traced task
//!
//! # Usage
//!
//! ```rust,no_run
//! use huginn_tracing::{end_span, record_event, start_span, with_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (result, trace) = with_tracing(async {
//!         start_span("Action", "[Counter] .increment");
//!         record_event("Middleware Effect", "CounterOutput .saved(1) from main.rs:12");
//!         end_span("Action");
//!         "done"
//!     })
//!     .await;
//!
//!     assert_eq!(result, "done");
//!     assert_eq!(trace.spans.len(), 1);
//! }
//! ```
//!
//! Spans are paired by name: `end_span(name)` closes the most recent open
//! span with that name. Spans still open when the traced future completes
//! are kept in the trace with [`SpanStatus::Leaked`].

pub mod collector;
pub mod types;

pub use collector::{
    TraceCollector, add_metadata, current_trace_id, end_span, is_tracing_active, record_event,
    start_span, with_tracing, with_tracing_id,
};
pub use types::{Event, Span, SpanStatus, Trace};
