//! # Listener trait.
//!
//! Provides [`Listener`], an extension point for plugging struct-based
//! handlers into a [`Dispatcher`](crate::Dispatcher). Closures cover most
//! cases (`on`, `on_async`); implement this trait when a listener carries its
//! own state, needs a stable name in logs, or must be removed by identity.
//!
//! ## Identity
//! A listener registered with [`Dispatcher::subscribe`](crate::Dispatcher::subscribe)
//! is removed by handing back the same `Arc`
//! ([`Dispatcher::unsubscribe`](crate::Dispatcher::unsubscribe)); every
//! registration holding that exact allocation goes away.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use typebus::{Event, Listener, ListenerError};
//!
//! struct Data;
//! impl Event for Data {
//!     const NAME: &'static str = "data";
//!     type Payload = String;
//! }
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! #[async_trait]
//! impl Listener<Data> for Counter {
//!     async fn on_event(&self, _payload: &String) -> Result<(), ListenerError> {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::Event;

/// Struct-based, asynchronous event listener.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return `Err` for failures you want reported; panics are caught as well
///   (unless disabled in [`Config`](crate::Config)) but carry less context.
#[async_trait]
pub trait Listener<E: Event>: Send + Sync + 'static {
    /// Handles one emission of `E`.
    async fn on_event(&self, payload: &E::Payload) -> Result<(), ListenerError>;

    /// Returns the listener name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
