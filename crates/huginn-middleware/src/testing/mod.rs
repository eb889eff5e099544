//! Testing utilities for instrumented middleware.
//!
//! - [`RecordingSink`]: a trace sink that captures every call for assertions
//! - [`SinkCall`]: one captured call

mod recording_sink;

pub use recording_sink::{RecordingSink, SinkCall};
