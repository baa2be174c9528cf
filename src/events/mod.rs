//! Event schema types.
//!
//! ## Contents
//! - [`Event`] marker trait binding an event name to its payload type
//! - [`AnyPayload`] type-erased payload view used by the global error handler

mod event;

pub use event::{AnyPayload, Event};
