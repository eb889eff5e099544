//! Instrumentation for action-processing middleware.
//!
//! This crate traces a middleware without changing its behavior:
//!
//! - **Middleware**: the `Middleware` trait with its `ActionHandler`,
//!   `GetState` and `Effect` capabilities
//! - **Instrumentation**: `InstrumentationMiddleware`, which opens an
//!   `Action` span per inbound action and records a `Middleware Effect`
//!   event per dispatched action
//! - **Formatting**: `DebugCase` and `debug_case()`, rendering actions as
//!   compact strings like `.login(user: ada)`
//! - **Sinks**: `TraceSink` with collector, `tracing` and no-op backends
//!
//! # Usage
//!
//! ```rust,no_run
//! use huginn_middleware::{DebugCase, InstrumentExt};
//! # use huginn_middleware::{ActionHandler, ActionSource, Effect, GetState, Middleware};
//!
//! #[derive(DebugCase)]
//! enum AuthAction {
//!     Login { user: String },
//!     LoggedIn,
//! }
//! # struct AuthMiddleware;
//! # impl Middleware for AuthMiddleware {
//! #     type InputAction = AuthAction;
//! #     type OutputAction = AuthAction;
//! #     type State = ();
//! #     fn receive_context(&mut self, _: GetState<()>, _: ActionHandler<AuthAction>) {}
//! #     fn handle(&self, _: AuthAction, _: ActionSource) -> Effect { Effect::none() }
//! # }
//!
//! // Spans go to the task-local collector unless another sink is given.
//! let middleware = AuthMiddleware.instrument("Auth");
//! ```

// Lets `#[derive(DebugCase)]` refer to this crate by name from inside it.
extern crate self as huginn_middleware;

pub mod config;
pub mod effect;
pub mod error;
pub mod ext;
pub mod format;
pub mod instrument;
pub mod middleware;
pub mod sink;
pub mod testing;

pub use config::{InstrumentationConfig, SinkKind};
pub use effect::Effect;
pub use error::{MiddlewareError, Result};
pub use ext::InstrumentExt;
pub use format::{Child, DebugCase, Field, Payload, Shape, debug_case};
pub use huginn_macros::DebugCase;
pub use instrument::{ACTION_SPAN, EFFECT_EVENT, InstrumentationMiddleware};
pub use middleware::{ActionHandler, ActionSource, GetState, Middleware};
pub use sink::{CollectorSink, LogSink, NoopSink, TraceSink, default_sink};
