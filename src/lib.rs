//! # typebus
//!
//! **typebus** is an in-process, strongly-typed event dispatcher for Rust.
//!
//! Independent parts of a program talk through named events carrying typed
//! payloads, without holding references to each other. Listeners are ordered
//! by priority, can be blocking or async, and each one decides what its
//! failure means for the rest of the emission.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ on(Data, f)  │   │ on_async(..) │   │ subscribe(..)│
//!     │  (blocking)  │   │   (async)    │   │ (Arc<dyn L>) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - ChannelMap: event marker ─► Channel (sorted by priority desc)  │
//! │  - ErrorHandler (at most one, global)                             │
//! │  - Config (label, panic catching, detached async on emit)         │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼                                                  ▼
//!   emit(E, &payload)                             emit_async(E, &payload)
//!   sequential, in order                          all started, join_all
//!        │                                                  │
//!        └──────────────────────┬───────────────────────────┘
//!                               ▼
//!                      policy::settle(outcome)
//!                ├─► ErrorHandler::handle(err, event, payload)
//!                ├─► registration.on_error(err, payload)
//!                └─► Contained (collect) | Abort (surface to emitter)
//! ```
//!
//! ### Emission result
//! ```text
//! Ok(vec![])            every listener succeeded (or there were none)
//! Ok(vec![e1, e2])      contained failures, in priority order
//! Err(Aborted{..})      a listener with abort_all_on_error failed
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Schema**        | Event markers binding a name to a payload type.               | [`Event`], [`AnyPayload`]                 |
//! | **Dispatch**      | Register, remove, emit sequentially or concurrently.          | [`Dispatcher`]                            |
//! | **Listeners**     | Closures or shared listener objects with per-listener options.| [`Listener`], [`ListenerOptions`], [`ListenerId`] |
//! | **Errors**        | Typed errors for listener failures and aborted emissions.     | [`ListenerError`], [`DispatchError`]      |
//! | **Error hooks**   | One global handler per dispatcher plus per-listener hooks.    | [`ErrorHandler`]                          |
//! | **Configuration** | Per-dispatcher settings.                                      | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`ErrorHandler`] writing failures to `tracing` (`LogWriter`).
//!
//! ## Example
//! ```rust
//! use typebus::{Dispatcher, Event, ListenerError, ListenerOptions};
//!
//! #[derive(Debug, Clone)]
//! struct Reading { id: u32, value: String }
//!
//! struct Data;
//! impl Event for Data {
//!     const NAME: &'static str = "data";
//!     type Payload = Reading;
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Dispatcher::new();
//!
//!     bus.on(Data, |r| {
//!         println!("received id={} value={}", r.id, r.value);
//!         Ok(())
//!     });
//!     bus.on_with(Data, |_| Err(ListenerError::fail("boom")),
//!         ListenerOptions::new().with_on_error(|err, r: &Reading| eprintln!("{} failed: {err}", r.id)));
//!     bus.on_async(Data, |r| async move {
//!         tokio::task::yield_now().await;
//!         println!("async received id={}", r.id);
//!         Ok(())
//!     });
//!
//!     let errors = bus.emit_async(Data, &Reading { id: 1, value: "hello".into() }).await?;
//!     assert_eq!(errors.len(), 1);
//!     assert_eq!(errors[0].as_message(), "boom");
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod handlers;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{Config, Dispatcher};
pub use error::{DispatchError, ListenerError};
pub use events::{AnyPayload, Event};
pub use handlers::ErrorHandler;
pub use listeners::{Listener, ListenerId, ListenerOptions, OnErrorHook};

// Optional: expose a built-in tracing error handler.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogWriter;
