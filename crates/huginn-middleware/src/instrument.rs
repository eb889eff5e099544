//! Instrumentation decorator for middleware.
//!
//! [`InstrumentationMiddleware`] wraps another middleware without changing
//! what it does. Every inbound action is bracketed by an `Action` span, and
//! every action the wrapped middleware dispatches is recorded as a
//! `Middleware Effect` event:
//!
//! ```text
//! begin  Action             "[Auth] .login(user: ada)"
//! event  Middleware Effect  "AuthOutput .loggedIn from src/auth.rs:42"
//! end    Action
//! ```
//!
//! The span ends only after the wrapped middleware's effect has completed,
//! so events from asynchronous effects always land inside it. When the sink
//! is inactive nothing is formatted and no sink call is made.

use std::sync::{Arc, OnceLock};

use crate::effect::Effect;
use crate::format::{DebugCase, debug_case};
use crate::middleware::{ActionHandler, ActionSource, GetState, Middleware};
use crate::sink::TraceSink;

/// Name of the span opened for each inbound action.
pub const ACTION_SPAN: &str = "Action";

/// Name of the event recorded for each dispatched action.
pub const EFFECT_EVENT: &str = "Middleware Effect";

/// Stands in for an empty label so prefix-grouping tools still get a key.
const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Middleware decorator that traces another middleware.
pub struct InstrumentationMiddleware<M: Middleware> {
    middleware: M,
    label: Arc<str>,
    sink: Arc<dyn TraceSink>,
    output: OnceLock<ActionHandler<M::OutputAction>>,
}

impl<M: Middleware> InstrumentationMiddleware<M> {
    pub fn new(middleware: M, label: impl Into<String>, sink: Arc<dyn TraceSink>) -> Self {
        let label: Arc<str> = Arc::from(label.into());
        tracing::debug!(label = %label, "Instrumenting middleware");
        Self {
            middleware,
            label,
            sink,
            output: OnceLock::new(),
        }
    }

    /// The wrapped middleware.
    pub fn inner(&self) -> &M {
        &self.middleware
    }

    /// Unwrap, discarding the instrumentation.
    pub fn into_inner(self) -> M {
        self.middleware
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The real output handler, once `receive_context` has run.
    pub fn output(&self) -> Option<&ActionHandler<M::OutputAction>> {
        self.output.get()
    }
}

impl<M> Middleware for InstrumentationMiddleware<M>
where
    M: Middleware,
    M::InputAction: DebugCase,
    M::OutputAction: DebugCase + 'static,
{
    type InputAction = M::InputAction;
    type OutputAction = M::OutputAction;
    type State = M::State;

    fn receive_context(
        &mut self,
        get_state: GetState<Self::State>,
        output: ActionHandler<Self::OutputAction>,
    ) {
        if self.output.set(output.clone()).is_err() {
            tracing::warn!(
                label = %self.label,
                "Context received more than once, keeping the first output handler"
            );
            return;
        }

        let label = Arc::clone(&self.label);
        let sink = Arc::clone(&self.sink);
        let proxied = ActionHandler::new(move |action: M::OutputAction, source: ActionSource| {
            // Forwarding consumes the action, so the message is rendered
            // first. The event itself depends on the sink after forwarding.
            let message = sink
                .is_active()
                .then(|| effect_message(&label, &action, &source));

            output.dispatch(action, source);

            if let Some(message) = message.filter(|_| sink.is_active()) {
                sink.emit_event(EFFECT_EVENT, &message);
            }
        });

        self.middleware.receive_context(get_state, proxied);
    }

    fn handle(&self, action: Self::InputAction, source: ActionSource) -> Effect {
        if !self.sink.is_active() {
            return self.middleware.handle(action, source);
        }

        let message = format!("{}{}", display_prefix(&self.label), debug_case(&action));
        self.sink.begin_span(ACTION_SPAN, &message);

        let effect = self.middleware.handle(action, source);
        if effect.is_none() {
            self.sink.end_span(ACTION_SPAN);
            return effect;
        }

        let sink = Arc::clone(&self.sink);
        effect.finally(move || sink.end_span(ACTION_SPAN))
    }
}

/// `[label] `, or a zero-width space when there is no label.
fn display_prefix(label: &str) -> String {
    if label.is_empty() {
        ZERO_WIDTH_SPACE.to_string()
    } else {
        format!("[{label}] ")
    }
}

/// `<label>Output <action> from <file>:<line>:<info>`.
fn effect_message<A: DebugCase + ?Sized>(label: &str, action: &A, source: &ActionSource) -> String {
    format!(
        "{label}Output {} from {}",
        debug_case(action),
        source.location()
    )
}
