//! Demo counter pipeline.
//!
//! A reducer keeps a counter; an autosave middleware answers every change
//! with a `saved` action dispatched after a delay. The middleware is
//! instrumented, so running the pipeline inside `with_tracing` yields one
//! `Action` span per action with the autosave dispatches as events.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Result;
use huginn_middleware::{
    ActionHandler, ActionSource, DebugCase, Effect, GetState, InstrumentExt,
    InstrumentationConfig, Middleware, MiddlewareError,
};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, DebugCase)]
pub enum CounterAction {
    #[debug_case(rename = "increment")]
    Increment,
    #[debug_case(rename = "decrement")]
    Decrement,
    #[debug_case(rename = "add")]
    Add(i64),
    #[debug_case(rename = "reset")]
    Reset,
    #[debug_case(rename = "saved")]
    Saved { value: i64 },
}

impl FromStr for CounterAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => match s {
                "increment" => Ok(CounterAction::Increment),
                "decrement" => Ok(CounterAction::Decrement),
                "reset" => Ok(CounterAction::Reset),
                other => Err(format!(
                    "Unknown action '{other}'. Expected increment, decrement, reset or add:<n>."
                )),
            },
            Some(("add", amount)) => amount
                .trim()
                .parse()
                .map(CounterAction::Add)
                .map_err(|e| format!("Invalid amount '{amount}': {e}")),
            Some((other, _)) => Err(format!("Action '{other}' takes no argument.")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub value: i64,
    /// Last value the autosave middleware saved.
    pub saved: Option<i64>,
    pub actions: u32,
}

fn reduce(state: &mut CounterState, action: &CounterAction) {
    state.actions += 1;
    match action {
        CounterAction::Increment => state.value += 1,
        CounterAction::Decrement => state.value -= 1,
        CounterAction::Add(amount) => state.value += amount,
        CounterAction::Reset => state.value = 0,
        CounterAction::Saved { value } => state.saved = Some(*value),
    }
}

/// Saves the counter after every change.
pub struct AutosaveMiddleware {
    delay: Duration,
    get_state: Option<GetState<CounterState>>,
    output: Option<ActionHandler<CounterAction>>,
}

impl AutosaveMiddleware {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            get_state: None,
            output: None,
        }
    }
}

impl Middleware for AutosaveMiddleware {
    type InputAction = CounterAction;
    type OutputAction = CounterAction;
    type State = CounterState;

    fn receive_context(
        &mut self,
        get_state: GetState<CounterState>,
        output: ActionHandler<CounterAction>,
    ) {
        self.get_state = Some(get_state);
        self.output = Some(output);
    }

    fn handle(&self, action: CounterAction, _source: ActionSource) -> Effect {
        if matches!(action, CounterAction::Saved { .. }) {
            return Effect::none();
        }
        let (Some(get_state), Some(output)) = (self.get_state.clone(), self.output.clone()) else {
            return Effect::new(async { Err(MiddlewareError::MissingContext("autosave context")) });
        };

        let delay = self.delay;
        Effect::new(async move {
            tokio::time::sleep(delay).await;
            let value = get_state.get().value;
            output.dispatch(
                CounterAction::Saved { value },
                ActionSource::here().with_info("autosave"),
            );
            Ok(())
        })
    }
}

/// Minimal store driving one middleware.
///
/// Actions dispatched by the middleware are queued and processed after the
/// current one, each effect awaited in this task.
pub struct Store<M> {
    state: Arc<RwLock<CounterState>>,
    middleware: M,
    queue: mpsc::UnboundedReceiver<(CounterAction, ActionSource)>,
    sender: mpsc::UnboundedSender<(CounterAction, ActionSource)>,
}

impl<M> Store<M>
where
    M: Middleware<InputAction = CounterAction, OutputAction = CounterAction, State = CounterState>,
{
    pub fn new(mut middleware: M) -> Self {
        let state = Arc::new(RwLock::new(CounterState::default()));
        let (sender, queue) = mpsc::unbounded_channel();

        let reader = Arc::clone(&state);
        let get_state = GetState::new(move || {
            reader
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        });
        let output_sender = sender.clone();
        let output = ActionHandler::new(move |action, source| {
            if output_sender.send((action, source)).is_err() {
                tracing::warn!("Store dropped, discarding dispatched action");
            }
        });
        middleware.receive_context(get_state, output);

        Self {
            state,
            middleware,
            queue,
            sender,
        }
    }

    /// Dispatch an action and process everything it causes.
    pub async fn dispatch(&mut self, action: CounterAction, source: ActionSource) -> Result<()> {
        // The receiver lives in `self`, so sending cannot fail here.
        let _ = self.sender.send((action, source));

        while let Ok((action, source)) = self.queue.try_recv() {
            tracing::debug!(action = ?action, source = %source, "Processing action");
            reduce(
                &mut self.state.write().unwrap_or_else(PoisonError::into_inner),
                &action,
            );
            self.middleware.handle(action, source).await?;
        }
        Ok(())
    }

    pub fn state(&self) -> CounterState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Run the configured actions through an instrumented autosave pipeline.
pub async fn run(
    actions: &[CounterAction],
    autosave_delay: Duration,
    instrumentation: &InstrumentationConfig,
) -> Result<CounterState> {
    let middleware = AutosaveMiddleware::new(autosave_delay).instrument_from_config(instrumentation);
    let mut store = Store::new(middleware);

    for action in actions {
        store
            .dispatch(action.clone(), ActionSource::here().with_info("cli"))
            .await?;
    }

    Ok(store.state())
}
