//! # Listeners and their registrations.
//!
//! This module provides:
//! - [`Listener`] - trait for struct-based async listeners
//! - [`ListenerOptions`] - priority / abort / `on_error` settings per registration
//! - [`ListenerId`] - handle returned by registration, used for removal
//!
//! Internally every registration becomes a [`Registration`] stored in its
//! event's channel.

mod listener;
mod options;
mod registration;

pub use listener::Listener;
pub use options::{ListenerOptions, OnErrorHook};
pub use registration::ListenerId;

pub(crate) use registration::{AsyncFn, BlockingFn, Callback, Registration};
