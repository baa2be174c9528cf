//! # Event schema: marker types and their payloads.
//!
//! An event channel is identified by a zero-sized marker type implementing
//! [`Event`]. The marker carries two pieces of compile-time information:
//! - [`Event::NAME`] an opaque label used in reports, logs and introspection;
//! - [`Event::Payload`] the only payload type that can travel on that channel.
//!
//! The set of marker types a program defines is its event schema. Registering
//! a listener or emitting with the wrong payload type does not compile.
//!
//! ## Example
//! ```rust
//! use typebus::Event;
//!
//! #[derive(Debug, Clone)]
//! pub struct Reading { pub id: u32, pub value: String }
//!
//! pub struct Data;
//! impl Event for Data {
//!     const NAME: &'static str = "data";
//!     type Payload = Reading;
//! }
//!
//! assert_eq!(Data::NAME, "data");
//! ```

use std::any::Any;
use std::fmt;

/// A named event channel with a fixed payload type.
///
/// Implementors are usually unit structs. Two distinct marker types are two
/// distinct channels even if they share a `NAME`.
pub trait Event: 'static {
    /// Label reported to error handlers and returned by introspection.
    const NAME: &'static str;

    /// Payload carried by every emission of this event.
    ///
    /// `Clone` is needed for async listeners, which receive an owned copy.
    type Payload: Clone + fmt::Debug + Send + Sync + 'static;
}

/// Type-erased view of a payload handed to the global error handler.
///
/// The global handler is shared by every event, so it cannot name a payload
/// type. It can still print the payload (`Debug`) or recover the concrete
/// type with [`AnyPayload::downcast_ref`].
pub trait AnyPayload: fmt::Debug + Send + Sync {
    /// Returns the payload as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> AnyPayload for T
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyPayload + '_ {
    /// Returns the concrete payload if it is a `T`.
    ///
    /// # Example
    /// ```
    /// use typebus::AnyPayload;
    ///
    /// let p: &dyn AnyPayload = &String::from("hello");
    /// assert_eq!(p.downcast_ref::<String>().map(String::as_str), Some("hello"));
    /// assert!(p.downcast_ref::<u32>().is_none());
    /// ```
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
