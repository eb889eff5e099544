//! Cross-crate integration tests
//!
//! Instrumented middleware writing through the default collector sink into
//! a `huginn-tracing` trace.

use std::sync::{Arc, Mutex};

use huginn_middleware::testing::{RecordingSink, SinkCall};
use huginn_middleware::{
    ACTION_SPAN, ActionHandler, ActionSource, DebugCase, EFFECT_EVENT, Effect, GetState,
    InstrumentExt, Middleware, TraceSink,
};
use huginn_tracing::{SpanStatus, with_tracing, with_tracing_id};

#[derive(Debug, Clone, PartialEq, DebugCase)]
enum AuthAction {
    #[debug_case(rename = "login")]
    Login { user: String },
    #[debug_case(rename = "loggedIn")]
    LoggedIn(String),
    #[debug_case(rename = "logout")]
    Logout,
}

/// Answers `login` with an asynchronous `loggedIn`.
#[derive(Default)]
struct AuthMiddleware {
    output: Option<ActionHandler<AuthAction>>,
}

impl Middleware for AuthMiddleware {
    type InputAction = AuthAction;
    type OutputAction = AuthAction;
    type State = ();

    fn receive_context(&mut self, _get_state: GetState<()>, output: ActionHandler<AuthAction>) {
        self.output = Some(output);
    }

    fn handle(&self, action: AuthAction, _source: ActionSource) -> Effect {
        let AuthAction::Login { user } = action else {
            return Effect::none();
        };
        let Some(output) = self.output.clone() else {
            return Effect::none();
        };
        Effect::new(async move {
            tokio::task::yield_now().await;
            output.dispatch(
                AuthAction::LoggedIn(user),
                ActionSource::new("auth.rs", 42).with_info("session"),
            );
            Ok(())
        })
    }
}

fn store() -> (ActionHandler<AuthAction>, Arc<Mutex<Vec<AuthAction>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let handler = ActionHandler::new(move |action: AuthAction, _source: ActionSource| {
        sink.lock().unwrap().push(action);
    });
    (handler, received)
}

/// Answers `login` with `loggedIn`, passing the inbound source along.
#[derive(Default)]
struct RelayMiddleware {
    output: Option<ActionHandler<AuthAction>>,
}

impl Middleware for RelayMiddleware {
    type InputAction = AuthAction;
    type OutputAction = AuthAction;
    type State = ();

    fn receive_context(&mut self, _get_state: GetState<()>, output: ActionHandler<AuthAction>) {
        self.output = Some(output);
    }

    fn handle(&self, action: AuthAction, source: ActionSource) -> Effect {
        let AuthAction::Login { user } = action else {
            return Effect::none();
        };
        let Some(output) = self.output.clone() else {
            return Effect::none();
        };
        Effect::new(async move {
            tokio::task::yield_now().await;
            output.dispatch(AuthAction::LoggedIn(user), source);
            Ok(())
        })
    }
}

type Forwarded = Arc<Mutex<Vec<(AuthAction, ActionSource)>>>;

/// Run inbound actions through `middleware`, recording what reaches the store.
async fn forwarded_by<M>(
    mut middleware: M,
    inbound: &[(AuthAction, ActionSource)],
) -> Vec<(AuthAction, ActionSource)>
where
    M: Middleware<InputAction = AuthAction, OutputAction = AuthAction, State = ()>,
{
    let forwarded: Forwarded = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&forwarded);
    middleware.receive_context(
        GetState::new(|| ()),
        ActionHandler::new(move |action: AuthAction, source: ActionSource| {
            store.lock().unwrap().push((action, source));
        }),
    );

    for (action, source) in inbound {
        middleware.handle(action.clone(), source.clone()).await.unwrap();
    }

    forwarded.lock().unwrap().clone()
}

fn login(user: &str) -> AuthAction {
    AuthAction::Login {
        user: user.to_string(),
    }
}

#[tokio::test]
async fn test_e2e_span_with_effect_event() {
    let (output, received) = store();
    let mut auth = AuthMiddleware::default().instrument("Auth");
    auth.receive_context(GetState::new(|| ()), output);

    let (result, trace) = with_tracing(async {
        auth.handle(login("ada"), ActionSource::here()).await
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(*received.lock().unwrap(), vec![AuthAction::LoggedIn("ada".to_string())]);

    assert_eq!(trace.spans.len(), 1);
    let span = &trace.spans[0];
    assert_eq!(span.name, ACTION_SPAN);
    assert_eq!(span.message, "[Auth] .login(user: ada)");
    assert_eq!(span.status, Some(SpanStatus::Closed));

    assert_eq!(span.events.len(), 1);
    assert_eq!(span.events[0].name, EFFECT_EVENT);
    assert_eq!(
        span.events[0].message,
        "AuthOutput .loggedIn(ada) from auth.rs:42:session"
    );
    assert!(trace.events.is_empty());
}

#[tokio::test]
async fn test_e2e_action_without_effect() {
    let (output, received) = store();
    let mut auth = AuthMiddleware::default().instrumented();
    auth.receive_context(GetState::new(|| ()), output);

    let (result, trace) = with_tracing(async {
        auth.handle(AuthAction::Logout, ActionSource::unknown()).await
    })
    .await;

    assert!(result.is_ok());
    assert!(received.lock().unwrap().is_empty());
    assert_eq!(trace.span_count(), 1);
    // No label: the prefix is a single zero-width space.
    assert_eq!(trace.spans[0].message, "\u{200B}.logout");
    assert!(trace.spans[0].events.is_empty());
    assert_eq!(trace.spans[0].status, Some(SpanStatus::Closed));
}

#[tokio::test]
async fn test_e2e_sequential_actions_are_siblings() {
    let (output, _received) = store();
    let mut auth = AuthMiddleware::default().instrument("Auth");
    auth.receive_context(GetState::new(|| ()), output);

    let (_, trace) = with_tracing_id("run-1", async {
        auth.handle(login("ada"), ActionSource::unknown()).await.unwrap();
        auth.handle(AuthAction::Logout, ActionSource::unknown()).await.unwrap();
        auth.handle(login("bob"), ActionSource::unknown()).await.unwrap();
    })
    .await;

    assert_eq!(trace.trace_id, "run-1");
    let messages: Vec<&str> = trace.spans.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "[Auth] .login(user: ada)",
            "[Auth] .logout",
            "[Auth] .login(user: bob)",
        ]
    );
    assert_eq!(trace.spans[0].events.len(), 1);
    assert!(trace.spans[1].events.is_empty());
    assert_eq!(trace.spans[2].events.len(), 1);
    assert!(trace.spans.iter().all(|s| s.children.is_empty()));
}

#[tokio::test]
async fn test_e2e_stacked_decorators_nest() {
    let (output, received) = store();
    let mut stacked = AuthMiddleware::default()
        .instrument("Inner")
        .instrument("Outer");
    stacked.receive_context(GetState::new(|| ()), output);

    let (result, trace) = with_tracing(async {
        stacked.handle(login("ada"), ActionSource::unknown()).await
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(received.lock().unwrap().len(), 1);

    assert_eq!(trace.spans.len(), 1);
    let outer = &trace.spans[0];
    assert_eq!(outer.message, "[Outer] .login(user: ada)");
    assert_eq!(outer.children.len(), 1);

    let inner = &outer.children[0];
    assert_eq!(inner.message, "[Inner] .login(user: ada)");
    // The outer proxy forwards first, so its event lands first.
    let events: Vec<&str> = inner.events.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        events,
        vec![
            "OuterOutput .loggedIn(ada) from auth.rs:42:session",
            "InnerOutput .loggedIn(ada) from auth.rs:42:session",
        ]
    );
}

#[tokio::test]
async fn test_e2e_dropped_effect_leaks_span() {
    let (output, received) = store();
    let mut auth = AuthMiddleware::default().instrument("Auth");
    auth.receive_context(GetState::new(|| ()), output);

    let (_, trace) = with_tracing(async {
        let effect = auth.handle(login("ada"), ActionSource::unknown());
        drop(effect);
    })
    .await;

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(trace.spans.len(), 1);
    assert_eq!(trace.spans[0].status, Some(SpanStatus::Leaked));
}

#[tokio::test]
async fn test_e2e_outside_trace_is_transparent() {
    let (output, received) = store();
    let mut auth = AuthMiddleware::default().instrument("Auth");
    auth.receive_context(GetState::new(|| ()), output);

    auth.handle(login("ada"), ActionSource::unknown()).await.unwrap();

    assert_eq!(*received.lock().unwrap(), vec![AuthAction::LoggedIn("ada".to_string())]);
}

#[tokio::test]
async fn test_e2e_trace_serializes() {
    let (output, _received) = store();
    let mut auth = AuthMiddleware::default().instrument("Auth");
    auth.receive_context(GetState::new(|| ()), output);

    let (_, trace) = with_tracing(async {
        auth.handle(login("ada"), ActionSource::unknown()).await.unwrap();
    })
    .await;

    let json = serde_json::to_value(&trace).unwrap();
    assert_eq!(json["spans"][0]["name"], "Action");
    assert_eq!(json["spans"][0]["status"], "closed");
    assert_eq!(json["spans"][0]["events"][0]["name"], "Middleware Effect");
}

#[tokio::test]
async fn test_e2e_forwarding_is_transparent() {
    let inbound = vec![
        (login("ada"), ActionSource::new("x.rs", 9).with_info("ctx")),
        (AuthAction::Logout, ActionSource::new("y.rs", 3)),
        (login("bob"), ActionSource::unknown().with_info("retry")),
        (login("cy"), ActionSource::unknown()),
    ];

    let plain = forwarded_by(RelayMiddleware::default(), &inbound).await;
    assert_eq!(
        plain[0],
        (
            AuthAction::LoggedIn("ada".to_string()),
            ActionSource::new("x.rs", 9).with_info("ctx")
        )
    );
    assert_eq!(plain.len(), 3);

    let active = Arc::new(RecordingSink::new());
    let active_dyn: Arc<dyn TraceSink> = active.clone();
    let traced = forwarded_by(
        RelayMiddleware::default().instrument_with("L", active_dyn),
        &inbound,
    )
    .await;
    assert_eq!(traced, plain);
    assert_eq!(active.event_count(), 3);
    assert!(
        active
            .calls()
            .contains(&SinkCall::event(
                EFFECT_EVENT,
                "LOutput .loggedIn(ada) from x.rs:9:ctx"
            ))
    );
    active.assert_balanced();

    let inactive = Arc::new(RecordingSink::inactive());
    let inactive_dyn: Arc<dyn TraceSink> = inactive.clone();
    let silent = forwarded_by(
        RelayMiddleware::default().instrument_with("L", inactive_dyn),
        &inbound,
    )
    .await;
    assert_eq!(silent, plain);
    assert!(inactive.calls().is_empty());

    let (collected, trace) = with_tracing(forwarded_by(
        RelayMiddleware::default().instrument("L"),
        &inbound,
    ))
    .await;
    assert_eq!(collected, plain);
    assert_eq!(trace.spans.len(), 4);
}
