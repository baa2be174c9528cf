//! # Registrations: one listener bound to one event.
//!
//! A [`Registration`] is created by the dispatcher's `on*`/`subscribe` calls
//! and never mutated afterwards. Emissions hold it behind an `Arc`, so removing
//! a registration while an emission is running does not affect that emission.
//!
//! ## Invocation shapes
//! ```text
//! Callback::Blocking ──► f(&payload)                  (runs inline)
//! Callback::Async    ──► f(payload.clone()).await     (owned copy)
//! Callback::Shared   ──► listener.on_event(&payload)  (borrowed)
//! ```
//! Every shape optionally runs under `catch_unwind`, turning a panic into
//! [`ListenerError::Panicked`].

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::error::ListenerError;
use crate::events::Event;
use crate::listeners::listener::Listener;
use crate::listeners::options::{ListenerOptions, OnErrorHook};

/// Opaque handle identifying one registration.
///
/// Returned by every registration call and accepted by
/// [`Dispatcher::off`](crate::Dispatcher::off). Ids are unique across all
/// dispatchers in the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Process-wide id source.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    pub(crate) fn next() -> Self {
        ListenerId(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value, useful in logs.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type BlockingFn<P> = Arc<dyn Fn(&P) -> Result<(), ListenerError> + Send + Sync>;
pub(crate) type AsyncFn<P> =
    Arc<dyn Fn(P) -> BoxFuture<'static, Result<(), ListenerError>> + Send + Sync>;

/// The three ways a listener can be supplied.
pub(crate) enum Callback<E: Event> {
    Blocking(BlockingFn<E::Payload>),
    Async(AsyncFn<E::Payload>),
    Shared(Arc<dyn Listener<E>>),
}

/// One subscribed listener plus its dispatch options.
pub(crate) struct Registration<E: Event> {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback<E>,
    pub(crate) priority: i32,
    pub(crate) abort_all_on_error: bool,
    pub(crate) on_error: Option<OnErrorHook<E::Payload>>,
}

impl<E: Event> Registration<E> {
    pub(crate) fn new(callback: Callback<E>, opts: ListenerOptions<E::Payload>) -> Self {
        Self {
            id: ListenerId::next(),
            callback,
            priority: opts.priority,
            abort_all_on_error: opts.abort_all_on_error,
            on_error: opts.on_error,
        }
    }

    /// Name used in logs.
    pub(crate) fn name(&self) -> &'static str {
        match &self.callback {
            Callback::Blocking(_) => "blocking-fn",
            Callback::Async(_) => "async-fn",
            Callback::Shared(l) => l.name(),
        }
    }

    /// True when the listener can only complete by being awaited.
    pub(crate) fn is_async(&self) -> bool {
        !matches!(self.callback, Callback::Blocking(_))
    }

    /// True if this registration holds the allocation at `ptr`.
    pub(crate) fn holds(&self, ptr: *const ()) -> bool {
        match &self.callback {
            Callback::Shared(l) => Arc::as_ptr(l) as *const () == ptr,
            _ => false,
        }
    }

    /// Runs a blocking listener inline.
    ///
    /// Must only be called when `!self.is_async()`; async shapes report
    /// themselves as delivered without running.
    pub(crate) fn call_blocking(
        &self,
        payload: &E::Payload,
        catch_panics: bool,
    ) -> Result<(), ListenerError> {
        let Callback::Blocking(f) = &self.callback else {
            return Ok(());
        };
        if catch_panics {
            std::panic::catch_unwind(AssertUnwindSafe(|| f(payload)))
                .unwrap_or_else(|panic| Err(ListenerError::from_panic(panic)))
        } else {
            f(payload)
        }
    }

    /// Returns the listener's outcome as a future.
    ///
    /// Nothing runs until the first poll: a blocking listener runs inside that
    /// poll, an async one is created there and driven from then on. Polling a
    /// batch of these in order therefore starts them in order.
    pub(crate) fn start<'a>(
        &'a self,
        payload: &'a E::Payload,
        catch_panics: bool,
    ) -> BoxFuture<'a, Result<(), ListenerError>> {
        let fut: BoxFuture<'a, Result<(), ListenerError>> = match &self.callback {
            Callback::Blocking(_) => {
                return future::lazy(move |_| self.call_blocking(payload, catch_panics)).boxed();
            }
            Callback::Async(f) => future::lazy(move |_| f(payload.clone())).flatten().boxed(),
            Callback::Shared(l) => l.on_event(payload),
        };
        guard(fut, catch_panics)
    }

    /// Builds a `'static` future for an async listener, used when the emitter
    /// cannot await it. Returns `None` for blocking listeners.
    pub(crate) fn detach(
        &self,
        payload: &E::Payload,
        catch_panics: bool,
    ) -> Option<BoxFuture<'static, Result<(), ListenerError>>> {
        let fut: BoxFuture<'static, Result<(), ListenerError>> = match &self.callback {
            Callback::Blocking(_) => return None,
            Callback::Async(f) => {
                let f = Arc::clone(f);
                let payload = payload.clone();
                async move { f(payload).await }.boxed()
            }
            Callback::Shared(l) => {
                let l = Arc::clone(l);
                let payload = payload.clone();
                async move { l.on_event(&payload).await }.boxed()
            }
        };
        Some(guard(fut, catch_panics))
    }
}

/// Wraps a listener future so that a panic resolves to `Err` instead of unwinding.
fn guard<'a>(
    fut: BoxFuture<'a, Result<(), ListenerError>>,
    catch_panics: bool,
) -> BoxFuture<'a, Result<(), ListenerError>> {
    if !catch_panics {
        return fut;
    }
    AssertUnwindSafe(fut)
        .catch_unwind()
        .map(|res| res.unwrap_or_else(|panic| Err(ListenerError::from_panic(panic))))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Data;
    impl Event for Data {
        const NAME: &'static str = "data";
        type Payload = String;
    }

    fn blocking<F>(f: F) -> Registration<Data>
    where
        F: Fn(&String) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Registration::new(Callback::Blocking(Arc::new(f)), ListenerOptions::new())
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_blocking_panic_is_caught() {
        let reg = blocking(|_| panic!("boom"));
        let err = reg.call_blocking(&"x".to_string(), true).unwrap_err();
        assert_eq!(err, ListenerError::Panicked { error: "boom".into() });
    }

    #[test]
    fn test_blocking_error_passes_through() {
        let reg = blocking(|p| Err(ListenerError::fail(format!("bad {p}"))));
        let err = reg.call_blocking(&"x".to_string(), true).unwrap_err();
        assert_eq!(err.as_message(), "bad x");
        assert!(!reg.is_async());
    }

    #[tokio::test]
    async fn test_async_panic_is_caught() {
        let f: AsyncFn<String> = Arc::new(|p: String| {
            async move {
                tokio::task::yield_now().await;
                if !p.is_empty() {
                    panic!("late boom");
                }
                Ok::<(), ListenerError>(())
            }
            .boxed()
        });
        let reg = Registration::<Data>::new(Callback::Async(f), ListenerOptions::new());
        assert!(reg.is_async());
        let payload = "x".to_string();
        let err = reg.start(&payload, true).await.unwrap_err();
        assert_eq!(err.as_message(), "late boom");
        assert!(err.is_panic());
    }

    #[test]
    fn test_start_defers_blocking_until_polled() {
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let r = Arc::clone(&ran);
        let reg = blocking(move |_| {
            r.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });
        let payload = "x".to_string();

        let fut = reg.start(&payload, true);
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(futures::executor::block_on(fut), Ok(()));
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_detach_skips_blocking() {
        let reg = blocking(|_| Ok(()));
        assert!(reg.detach(&"x".to_string(), true).is_none());
    }
}
