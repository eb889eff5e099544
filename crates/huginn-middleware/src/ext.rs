//! Wiring helpers attached to every middleware.

use std::sync::Arc;

use crate::config::InstrumentationConfig;
use crate::instrument::InstrumentationMiddleware;
use crate::middleware::Middleware;
use crate::sink::{TraceSink, default_sink};

/// Wrap any middleware in an [`InstrumentationMiddleware`].
///
/// ```
/// # use huginn_middleware::{ActionHandler, ActionSource, Effect, GetState, InstrumentExt, Middleware};
/// struct Logger;
///
/// impl Middleware for Logger {
///     type InputAction = String;
///     type OutputAction = String;
///     type State = ();
///
///     fn receive_context(&mut self, _: GetState<()>, _: ActionHandler<String>) {}
///
///     fn handle(&self, _action: String, _source: ActionSource) -> Effect {
///         Effect::none()
///     }
/// }
///
/// let traced = Logger.instrument("Logger");
/// assert_eq!(traced.label(), "Logger");
/// ```
pub trait InstrumentExt: Middleware + Sized {
    /// No label, default sink.
    fn instrumented(self) -> InstrumentationMiddleware<Self> {
        self.instrument_with("", default_sink())
    }

    /// The given label, default sink.
    fn instrument(self, label: impl Into<String>) -> InstrumentationMiddleware<Self> {
        self.instrument_with(label, default_sink())
    }

    /// The given label and sink.
    fn instrument_with(
        self,
        label: impl Into<String>,
        sink: Arc<dyn TraceSink>,
    ) -> InstrumentationMiddleware<Self> {
        InstrumentationMiddleware::new(self, label, sink)
    }

    /// Label and sink taken from configuration.
    fn instrument_from_config(self, config: &InstrumentationConfig) -> InstrumentationMiddleware<Self> {
        self.instrument_with(config.label.clone(), config.build_sink())
    }
}

impl<M: Middleware> InstrumentExt for M {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use crate::effect::Effect;
    use crate::middleware::{ActionHandler, ActionSource, GetState};
    use crate::sink::TraceSink;

    struct Passive;

    impl Middleware for Passive {
        type InputAction = u8;
        type OutputAction = u8;
        type State = ();

        fn receive_context(&mut self, _: GetState<()>, _: ActionHandler<u8>) {}

        fn handle(&self, _action: u8, _source: ActionSource) -> Effect {
            Effect::none()
        }
    }

    #[test]
    fn test_defaults() {
        let traced = Passive.instrumented();
        assert_eq!(traced.label(), "");
    }

    #[test]
    fn test_label() {
        assert_eq!(Passive.instrument("Auth").label(), "Auth");
    }

    #[test]
    fn test_from_config() {
        let config = InstrumentationConfig {
            label: "Auth".to_string(),
            sink: SinkKind::Off,
            ..Default::default()
        };
        let traced = Passive.instrument_from_config(&config);
        assert_eq!(traced.label(), "Auth");
    }

    #[tokio::test]
    async fn test_custom_sink_receives_spans() {
        let sink = Arc::new(crate::testing::RecordingSink::new());
        let dyn_sink: Arc<dyn TraceSink> = sink.clone();
        let traced = Passive.instrument_with("P", dyn_sink);

        traced.handle(3, ActionSource::unknown()).await.unwrap();
        assert_eq!(sink.begin_count(), 1);
        assert_eq!(sink.end_count(), 1);
    }
}
