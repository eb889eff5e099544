//! The middleware abstraction.
//!
//! A middleware is set up once with a way to read state and a way to
//! dispatch actions, and is then asked to handle every inbound action. What
//! it does in response is returned as an [`Effect`], which the pipeline runs.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::effect::Effect;

/// Where a dispatched action came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSource {
    /// Source file of the dispatch call.
    pub file: Option<Cow<'static, str>>,

    /// Line of the dispatch call.
    pub line: Option<u32>,

    /// Free-form context supplied by the dispatcher.
    pub info: Option<String>,
}

impl ActionSource {
    /// The location of the caller.
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: Some(Cow::Borrowed(location.file())),
            line: Some(location.line()),
            info: None,
        }
    }

    /// A source with no location.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            info: None,
        }
    }

    /// Attach free-form context.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// `file:line:info`, leaving out whatever is absent.
    pub fn location(&self) -> String {
        let line = self.line.map(|line| line.to_string());
        [self.file.as_deref(), line.as_deref(), self.info.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for ActionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Capability to dispatch actions into the pipeline.
pub struct ActionHandler<A> {
    dispatch: Arc<dyn Fn(A, ActionSource) + Send + Sync>,
}

impl<A> ActionHandler<A> {
    pub fn new<F>(dispatch: F) -> Self
    where
        F: Fn(A, ActionSource) + Send + Sync + 'static,
    {
        Self {
            dispatch: Arc::new(dispatch),
        }
    }

    /// Dispatch an action with an explicit source.
    pub fn dispatch(&self, action: A, source: ActionSource) {
        (self.dispatch)(action, source)
    }

    /// Dispatch an action, recording the caller's location as its source.
    #[track_caller]
    pub fn dispatch_here(&self, action: A) {
        self.dispatch(action, ActionSource::here())
    }
}

impl<A> Clone for ActionHandler<A> {
    fn clone(&self) -> Self {
        Self {
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<A> fmt::Debug for ActionHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler").finish_non_exhaustive()
    }
}

/// Capability to read the current state.
pub struct GetState<S> {
    read: Arc<dyn Fn() -> S + Send + Sync>,
}

impl<S> GetState<S> {
    pub fn new<F>(read: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            read: Arc::new(read),
        }
    }

    /// Read the state as of now.
    pub fn get(&self) -> S {
        (self.read)()
    }
}

impl<S> Clone for GetState<S> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
        }
    }
}

impl<S> fmt::Debug for GetState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetState").finish_non_exhaustive()
    }
}

/// A unit of an action-dispatch pipeline.
pub trait Middleware {
    /// Actions this middleware handles.
    type InputAction;

    /// Actions this middleware dispatches.
    type OutputAction;

    /// State this middleware can read.
    type State;

    /// Receive the pipeline capabilities. Called once, before any action is
    /// handled.
    fn receive_context(
        &mut self,
        get_state: GetState<Self::State>,
        output: ActionHandler<Self::OutputAction>,
    );

    /// Handle an inbound action. Anything that should happen as a result,
    /// including dispatching through the output handler, goes in the
    /// returned effect.
    fn handle(&self, action: Self::InputAction, source: ActionSource) -> Effect;
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    type InputAction = M::InputAction;
    type OutputAction = M::OutputAction;
    type State = M::State;

    fn receive_context(
        &mut self,
        get_state: GetState<Self::State>,
        output: ActionHandler<Self::OutputAction>,
    ) {
        (**self).receive_context(get_state, output)
    }

    fn handle(&self, action: Self::InputAction, source: ActionSource) -> Effect {
        (**self).handle(action, source)
    }
}
