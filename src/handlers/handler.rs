//! # Global error handler trait.
//!
//! A dispatcher holds at most one [`ErrorHandler`]. It is called for every
//! contained listener failure, on every event, before the failing
//! registration's own `on_error` hook.
//!
//! Closures with the matching signature implement the trait automatically:
//! ```rust
//! use typebus::{AnyPayload, Dispatcher, ListenerError};
//!
//! let bus = Dispatcher::new();
//! bus.set_error_handler(|err: &ListenerError, event: &'static str, payload: &dyn AnyPayload| {
//!     eprintln!("event {event} failed: {err} (payload {payload:?})");
//! });
//! assert!(bus.has_error_handler());
//! ```

use crate::error::ListenerError;
use crate::events::AnyPayload;

/// Receives every contained listener failure of one dispatcher.
///
/// ### Implementation requirements
/// - Do not panic: the dispatcher does not catch panics raised here, they
///   unwind into the emitter and stop the emission.
/// - Keep it cheap; it runs inline on the emitting task.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Handles one failure of a listener of `event`, which was given `payload`.
    fn handle(&self, error: &ListenerError, event: &'static str, payload: &dyn AnyPayload);
}

impl<F> ErrorHandler for F
where
    F: Fn(&ListenerError, &'static str, &dyn AnyPayload) + Send + Sync + 'static,
{
    fn handle(&self, error: &ListenerError, event: &'static str, payload: &dyn AnyPayload) {
        self(error, event, payload)
    }
}
