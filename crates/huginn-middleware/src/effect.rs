//! Deferred middleware effects.
//!
//! Whatever a middleware wants to happen after it handled an action is
//! returned as an [`Effect`]: a single deferred computation that may
//! dispatch zero or more actions and then completes. Both the
//! "run this after the reducer" continuation style ([`Effect::after`]) and
//! asynchronous work ([`Effect::new`]) are expressed through it, and
//! effects compose by sequencing rather than by global operators.

use std::fmt;
use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::Result;

/// A deferred computation returned from [`Middleware::handle`](crate::Middleware::handle).
///
/// Nothing runs until the effect is awaited.
#[must_use = "effects do nothing unless they are run"]
pub struct Effect {
    future: Option<BoxFuture<'static, Result<()>>>,
}

impl Effect {
    /// An effect that does nothing.
    pub fn none() -> Self {
        Self { future: None }
    }

    /// An effect backed by an async computation.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            future: Some(future.boxed()),
        }
    }

    /// A synchronous continuation, run when the effect runs.
    pub fn after<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(async move {
            f();
            Ok(())
        })
    }

    /// Whether this effect is known to do nothing.
    pub fn is_none(&self) -> bool {
        self.future.is_none()
    }

    /// Run `self`, then `next` if `self` succeeded.
    pub fn and_then(self, next: Effect) -> Effect {
        match (self.future, next.future) {
            (None, next) => Effect { future: next },
            (first, None) => Effect { future: first },
            (Some(first), Some(second)) => Effect::new(async move {
                first.await?;
                second.await
            }),
        }
    }

    /// Run `f` once `self` has completed, successfully or not.
    ///
    /// The result of `self` is returned unchanged.
    pub fn finally<F>(self, f: F) -> Effect
    where
        F: FnOnce() + Send + 'static,
    {
        let future = self.future;
        Effect::new(async move {
            let result = match future {
                Some(future) => future.await,
                None => Ok(()),
            };
            f();
            result
        })
    }

    /// Run the effect to completion.
    pub async fn run(self) -> Result<()> {
        match self.future {
            Some(future) => future.await,
            None => Ok(()),
        }
    }
}

impl Default for Effect {
    fn default() -> Self {
        Self::none()
    }
}

impl IntoFuture for Effect {
    type Output = Result<()>;
    type IntoFuture = BoxFuture<'static, Result<()>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run().boxed()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("is_none", &self.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MiddlewareError;
    use std::sync::{Arc, Mutex};

    fn log() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(log: &Arc<Mutex<Vec<&'static str>>>, entry: &'static str) -> Effect {
        let log = Arc::clone(log);
        Effect::after(move || log.lock().unwrap().push(entry))
    }

    #[tokio::test]
    async fn test_none_completes() {
        let effect = Effect::none();
        assert!(effect.is_none());
        effect.await.unwrap();
    }

    #[tokio::test]
    async fn test_after_is_deferred() {
        let entries = log();
        let effect = push(&entries, "ran");
        assert!(entries.lock().unwrap().is_empty());
        effect.run().await.unwrap();
        assert_eq!(*entries.lock().unwrap(), vec!["ran"]);
    }

    #[tokio::test]
    async fn test_and_then_sequences() {
        let entries = log();
        push(&entries, "first")
            .and_then(push(&entries, "second"))
            .await
            .unwrap();
        assert_eq!(*entries.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_and_then_stops_on_error() {
        let entries = log();
        let failing = Effect::new(async { Err(MiddlewareError::Effect("boom".into())) });
        let result = failing.and_then(push(&entries, "skipped")).await;
        assert!(result.is_err());
        assert!(entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finally_runs_after_async_work() {
        let entries = log();
        let worker = Arc::clone(&entries);
        let effect = Effect::new(async move {
            tokio::task::yield_now().await;
            worker.lock().unwrap().push("work");
            Ok(())
        });
        let closer = Arc::clone(&entries);
        effect
            .finally(move || closer.lock().unwrap().push("finally"))
            .await
            .unwrap();
        assert_eq!(*entries.lock().unwrap(), vec!["work", "finally"]);
    }

    #[tokio::test]
    async fn test_finally_preserves_error() {
        let entries = log();
        let closer = Arc::clone(&entries);
        let result = Effect::new(async { Err(MiddlewareError::MissingContext("output")) })
            .finally(move || closer.lock().unwrap().push("finally"))
            .await;
        assert!(matches!(result, Err(MiddlewareError::MissingContext("output"))));
        assert_eq!(*entries.lock().unwrap(), vec!["finally"]);
    }

    #[tokio::test]
    async fn test_finally_on_none() {
        let entries = log();
        let closer = Arc::clone(&entries);
        let effect = Effect::none().finally(move || closer.lock().unwrap().push("finally"));
        assert!(!effect.is_none());
        effect.await.unwrap();
        assert_eq!(*entries.lock().unwrap(), vec!["finally"]);
    }
}
