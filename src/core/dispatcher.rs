//! # Dispatcher: registration and emission.
//!
//! [`Dispatcher`] owns the per-event listener lists and the optional global
//! error handler. Every instance is fully independent; nothing is shared
//! between two dispatchers.
//!
//! ## Emission paths
//! ```text
//! emit(E, &payload)                       emit_async(E, &payload).await
//!   snapshot channel                        snapshot channel
//!   for reg in snapshot (in order):         start every reg (in order, one poll)
//!     run reg ──► settle()                  join_all: each reg ──► settle() when done
//!       Contained ─► push, continue         collect errors in channel order
//!       Abort     ─► return Err now         any Abort ─► Err after all settled
//!   Ok(errors)                              Ok(errors)
//! ```
//!
//! ## Rules
//! - Each emission iterates a snapshot taken when it starts: `on`/`off` from
//!   inside a listener affect only later emissions.
//! - Locks are never held while user code runs.
//! - `emit` runs blocking listeners only; async listeners are started detached
//!   on the ambient tokio runtime (see [`Config::detach_async_on_emit`]).
//! - `emit_async` never spawns: listeners interleave on the caller's task.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use futures::future;
use tracing::{debug, trace, warn};

use crate::core::channel::ChannelMap;
use crate::core::config::Config;
use crate::core::policy::{self, Settled};
use crate::error::{DispatchError, ListenerError};
use crate::events::{AnyPayload, Event};
use crate::handlers::ErrorHandler;
use crate::listeners::{
    AsyncFn, BlockingFn, Callback, Listener, ListenerId, ListenerOptions, Registration,
};

/// In-process, strongly-typed event dispatcher.
///
/// `Dispatcher` is `Send + Sync`; share it with `Arc` when listeners live on
/// other tasks or threads.
///
/// ## Example
/// ```rust
/// use typebus::{Dispatcher, Event, ListenerOptions};
///
/// struct Data;
/// impl Event for Data {
///     const NAME: &'static str = "data";
///     type Payload = String;
/// }
///
/// let bus = Dispatcher::new();
/// bus.on(Data, |p| { println!("first: {p}"); Ok(()) });
/// bus.on_with(Data, |p| { println!("urgent: {p}"); Ok(()) },
///     ListenerOptions::new().with_priority(5));
///
/// // prints "urgent: hello" then "first: hello"
/// let errors = bus.emit(Data, &"hello".to_string()).unwrap();
/// assert!(errors.is_empty());
/// ```
pub struct Dispatcher {
    cfg: Config,
    channels: RwLock<ChannelMap>,
    handler: RwLock<Option<Arc<dyn ErrorHandler>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with [`Config::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher with explicit settings.
    #[must_use]
    pub fn with_config(cfg: Config) -> Self {
        Self {
            cfg,
            channels: RwLock::new(ChannelMap::default()),
            handler: RwLock::new(None),
        }
    }

    /// Returns the configuration this dispatcher was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a blocking listener with default options.
    pub fn on<E, F>(&self, event: E, f: F) -> ListenerId
    where
        E: Event,
        F: Fn(&E::Payload) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.on_with(event, f, ListenerOptions::default())
    }

    /// Registers a blocking listener with explicit options.
    ///
    /// Registering the same closure twice creates two independent registrations.
    pub fn on_with<E, F>(&self, _event: E, f: F, opts: ListenerOptions<E::Payload>) -> ListenerId
    where
        E: Event,
        F: Fn(&E::Payload) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let f: BlockingFn<E::Payload> = Arc::new(f);
        self.register(Registration::new(Callback::<E>::Blocking(f), opts))
    }

    /// Registers an async listener with default options.
    ///
    /// The listener receives an owned clone of the payload.
    pub fn on_async<E, F, Fut>(&self, event: E, f: F) -> ListenerId
    where
        E: Event,
        F: Fn(E::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        self.on_async_with(event, f, ListenerOptions::default())
    }

    /// Registers an async listener with explicit options.
    pub fn on_async_with<E, F, Fut>(
        &self,
        _event: E,
        f: F,
        opts: ListenerOptions<E::Payload>,
    ) -> ListenerId
    where
        E: Event,
        F: Fn(E::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        let f: AsyncFn<E::Payload> = Arc::new(move |payload| f(payload).boxed());
        self.register(Registration::new(Callback::<E>::Async(f), opts))
    }

    /// Registers a shared [`Listener`] object.
    ///
    /// The same `Arc` may be subscribed several times; [`Dispatcher::unsubscribe`]
    /// removes all of those registrations at once.
    pub fn subscribe<E, L>(
        &self,
        _event: E,
        listener: Arc<L>,
        opts: ListenerOptions<E::Payload>,
    ) -> ListenerId
    where
        E: Event,
        L: Listener<E>,
    {
        let listener: Arc<dyn Listener<E>> = listener;
        self.register(Registration::new(Callback::Shared(listener), opts))
    }

    fn register<E: Event>(&self, reg: Registration<E>) -> ListenerId {
        let id = reg.id;
        debug!(
            dispatcher = %self.cfg.label,
            event = E::NAME,
            listener = reg.name(),
            %id,
            priority = reg.priority,
            abort = reg.abort_all_on_error,
            "listener registered"
        );
        self.channels_mut().insert(reg);
        id
    }

    // ---------------------------
    // Removal
    // ---------------------------

    /// Removes the registration `id` from `E`.
    ///
    /// Returns `false` (and does nothing) if `E` has no such registration.
    pub fn off<E: Event>(&self, _event: E, id: ListenerId) -> bool {
        let removed = self.channels_mut().remove_id::<E>(id);
        if removed {
            debug!(dispatcher = %self.cfg.label, event = E::NAME, %id, "listener removed");
        }
        removed
    }

    /// Removes every registration of `E` holding this exact `Arc` (pointer identity).
    ///
    /// Returns the number of registrations removed; `0` is not an error.
    pub fn unsubscribe<E, L>(&self, _event: E, listener: &Arc<L>) -> usize
    where
        E: Event,
        L: Listener<E>,
    {
        let ptr = Arc::as_ptr(listener) as *const ();
        let removed = self.channels_mut().remove_holding::<E>(ptr);
        if removed > 0 {
            debug!(dispatcher = %self.cfg.label, event = E::NAME, removed, "listener unsubscribed");
        }
        removed
    }

    /// Removes every listener of `E`. Other events are unaffected.
    pub fn remove_all_listeners_for<E: Event>(&self, _event: E) {
        let removed = self.channels_mut().clear_event::<E>();
        debug!(dispatcher = %self.cfg.label, event = E::NAME, removed, "event cleared");
    }

    /// Removes every listener of every event.
    pub fn remove_all_listeners(&self) {
        let removed = self.channels_mut().clear();
        debug!(dispatcher = %self.cfg.label, removed, "all listeners cleared");
    }

    // ---------------------------
    // Global error handler
    // ---------------------------

    /// Installs the global error handler, replacing any previous one.
    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(&ListenerError, &'static str, &dyn AnyPayload) + Send + Sync + 'static,
    {
        self.set_error_handler_shared(Arc::new(handler));
    }

    /// Installs a shared [`ErrorHandler`] object, replacing any previous one.
    pub fn set_error_handler_shared(&self, handler: Arc<dyn ErrorHandler>) {
        let replaced = self.handler_mut().replace(handler).is_some();
        debug!(dispatcher = %self.cfg.label, replaced, "error handler installed");
    }

    /// Removes the global error handler, if any.
    pub fn clear_error_handler(&self) {
        self.handler_mut().take();
    }

    /// True if a global error handler is installed.
    pub fn has_error_handler(&self) -> bool {
        self.error_handler().is_some()
    }

    fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn handler_mut(&self) -> RwLockWriteGuard<'_, Option<Arc<dyn ErrorHandler>>> {
        self.handler.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Number of listeners currently registered for `E`.
    pub fn listener_count<E: Event>(&self, _event: E) -> usize {
        self.channels().len::<E>()
    }

    /// True if `E` has at least one listener.
    pub fn has_listeners<E: Event>(&self, event: E) -> bool {
        self.listener_count(event) > 0
    }

    /// Names of events that currently have listeners, sorted.
    ///
    /// Two marker types with the same `NAME` are listed once, although they
    /// stay independent channels with their own listeners.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.channels().names()
    }

    fn channels(&self) -> RwLockReadGuard<'_, ChannelMap> {
        self.channels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn channels_mut(&self) -> RwLockWriteGuard<'_, ChannelMap> {
        self.channels.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---------------------------
    // Emission
    // ---------------------------

    /// Delivers `payload` to every listener of `E`, one after another.
    ///
    /// Listeners run in priority order (higher first, ties in registration
    /// order). A failure is reported to the global handler and the listener's
    /// `on_error` hook and collected into the returned list.
    ///
    /// ### Errors
    /// Returns [`DispatchError::Aborted`] as soon as a listener registered with
    /// `abort_all_on_error` fails; listeners after it are not invoked.
    pub fn emit<E: Event>(
        &self,
        _event: E,
        payload: &E::Payload,
    ) -> Result<Vec<ListenerError>, DispatchError> {
        let snapshot = self.channels().snapshot::<E>();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        trace!(dispatcher = %self.cfg.label, event = E::NAME, listeners = snapshot.len(), "emit");

        let mut errors = Vec::new();
        for reg in &snapshot {
            if reg.is_async() {
                self.detach(reg, payload);
                continue;
            }
            let outcome = reg.call_blocking(payload, self.cfg.catch_panics);
            match self.settle(reg, payload, outcome) {
                Settled::Delivered => {}
                Settled::Contained(error) => errors.push(error),
                Settled::Abort(source) => {
                    return Err(DispatchError::Aborted {
                        event: E::NAME,
                        source,
                    });
                }
            }
        }
        Ok(errors)
    }

    /// Delivers `payload` to every listener of `E` concurrently and waits for
    /// all of them to settle.
    ///
    /// All listeners are started in priority order within one poll; their
    /// completion order is up to them. Errors are returned in priority order.
    /// Failure handling per listener is the same as in [`Dispatcher::emit`].
    ///
    /// ### Errors
    /// Returns [`DispatchError::Aborted`] (with the first aborting failure in
    /// priority order) if any listener registered with `abort_all_on_error`
    /// failed. Every listener still runs to completion before this returns.
    pub async fn emit_async<E: Event>(
        &self,
        _event: E,
        payload: &E::Payload,
    ) -> Result<Vec<ListenerError>, DispatchError> {
        let snapshot = self.channels().snapshot::<E>();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        trace!(dispatcher = %self.cfg.label, event = E::NAME, listeners = snapshot.len(), "emit_async");

        let catch_panics = self.cfg.catch_panics;
        let settled = future::join_all(snapshot.iter().map(|reg| {
            let started = reg.start(payload, catch_panics);
            async move {
                let outcome = started.await;
                self.settle(reg, payload, outcome)
            }
        }))
        .await;

        let mut errors = Vec::new();
        let mut abort = None;
        for s in settled {
            match s {
                Settled::Delivered => {}
                Settled::Contained(error) => errors.push(error),
                Settled::Abort(error) => {
                    if abort.is_none() {
                        abort = Some(error.clone());
                    }
                    errors.push(error);
                }
            }
        }

        match abort {
            Some(source) => Err(DispatchError::Aborted {
                event: E::NAME,
                source,
            }),
            None => Ok(errors),
        }
    }

    fn settle<E: Event>(
        &self,
        reg: &Registration<E>,
        payload: &E::Payload,
        outcome: Result<(), ListenerError>,
    ) -> Settled {
        policy::settle(&self.cfg.label, reg, payload, outcome, || self.error_handler())
    }

    /// Starts an async listener from the synchronous `emit` without awaiting it.
    ///
    /// The outcome goes through the same policy; the abort flag has no effect
    /// because the emission has already moved on.
    fn detach<E: Event>(&self, reg: &Arc<Registration<E>>, payload: &E::Payload) {
        if !self.cfg.detach_async_on_emit {
            debug!(dispatcher = %self.cfg.label, event = E::NAME, id = %reg.id, "async listener skipped by emit");
            return;
        }
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            warn!(
                dispatcher = %self.cfg.label,
                event = E::NAME,
                id = %reg.id,
                "async listener skipped: emit called outside a tokio runtime"
            );
            return;
        };
        let Some(fut) = reg.detach(payload, self.cfg.catch_panics) else {
            return;
        };

        let reg = Arc::clone(reg);
        let payload = payload.clone();
        let handler = self.error_handler();
        let label = self.cfg.label.clone();
        rt.spawn(async move {
            let outcome = fut.await;
            if let Settled::Abort(error) = policy::settle(&label, &reg, &payload, outcome, || handler) {
                warn!(
                    dispatcher = %label,
                    event = E::NAME,
                    id = %reg.id,
                    error = error.as_message(),
                    "abort requested by a detached listener; emission already finished"
                );
            }
        });
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = self.channels();
        f.debug_struct("Dispatcher")
            .field("label", &self.cfg.label)
            .field("events", &channels.names())
            .field("listeners", &channels.total())
            .field("error_handler", &self.has_error_handler())
            .finish()
    }
}
