//! Plain-text outline of a collected trace.

use std::fmt::Write;

use huginn_tracing::{Event, Span, SpanStatus, Trace};

const INDENT: &str = "  ";

/// Render a trace as an indented outline, one line per span or event.
pub fn outline(trace: &Trace) -> String {
    let mut out = String::new();
    let _ = write!(out, "trace {}", trace.trace_id);
    if let Some(ms) = trace.duration_ms {
        let _ = write!(out, " ({ms} ms)");
    }
    out.push('\n');

    for event in &trace.events {
        push_event(&mut out, event, 1);
    }
    for span in &trace.spans {
        span.walk(&mut |span, depth| push_span(&mut out, span, depth + 1));
    }
    out
}

fn push_span(out: &mut String, span: &Span, depth: usize) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&span.name);
    if !span.message.is_empty() {
        let _ = write!(out, " {}", span.message);
    }
    match (span.status, span.duration_ms) {
        (Some(SpanStatus::Leaked), _) => out.push_str(" [leaked]"),
        (_, Some(ms)) => {
            let _ = write!(out, " ({ms} ms)");
        }
        _ => {}
    }
    out.push('\n');

    for event in &span.events {
        push_event(out, event, depth + 1);
    }
}

fn push_event(out: &mut String, event: &Event, depth: usize) {
    let _ = writeln!(
        out,
        "{}- {}: {}",
        INDENT.repeat(depth),
        event.name,
        event.message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_nests_spans_and_events() {
        let mut trace = Trace::new("t-1");
        let mut parent = Span::new("Action", "[Counter] .increment");
        parent.record_event("Middleware Effect", "CounterOutput .saved(value: 1) from demo.rs:1");
        let mut child = Span::new("Action", "[Counter] .saved(value: 1)");
        child.close(SpanStatus::Closed);
        parent.add_child(child);
        parent.close(SpanStatus::Closed);
        trace.add_span(parent);

        let mut leaked = Span::new("Action", "[Counter] .reset");
        leaked.close(SpanStatus::Leaked);
        trace.add_span(leaked);

        let text = outline(&trace);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "trace t-1");
        assert!(lines[1].starts_with("  Action [Counter] .increment ("));
        assert_eq!(
            lines[2],
            "    - Middleware Effect: CounterOutput .saved(value: 1) from demo.rs:1"
        );
        assert!(lines[3].starts_with("    Action [Counter] .saved(value: 1) ("));
        assert_eq!(lines[4], "  Action [Counter] .reset [leaked]");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_outline_top_level_events() {
        let mut trace = Trace::new("t-2");
        trace.events.push(Event::now("Middleware Effect", "loose"));

        let text = outline(&trace);
        assert!(text.contains("\n  - Middleware Effect: loose\n"));
    }
}
