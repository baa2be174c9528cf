//! Error types used by the dispatcher and its listeners.
//!
//! This module defines two main error enums:
//!
//! - [`ListenerError`]: a single listener failed (returned `Err` or panicked).
//! - [`DispatchError`]: a whole emission was aborted by a listener marked
//!   `abort_all_on_error`.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by a single listener invocation.
///
/// Every failure is normalized into one of these variants before it is
/// collected, reported to hooks or used to abort an emission.
///
/// Listeners build them with [`ListenerError::fail`] or through the `From`
/// conversions (`&str`, `String`, [`anyhow::Error`]), which makes `?` usable
/// inside listener bodies.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Listener returned an error.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Listener panicked; the panic was caught by the dispatcher.
    #[error("listener panicked: {error}")]
    Panicked {
        /// The panic message, or a placeholder for non-string payloads.
        error: String,
    },
}

impl ListenerError {
    /// Creates a [`ListenerError::Failed`] from any displayable message.
    ///
    /// # Example
    /// ```
    /// use typebus::ListenerError;
    ///
    /// let err = ListenerError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ListenerError::Failed {
            error: error.into(),
        }
    }

    /// Normalizes a caught panic payload.
    ///
    /// `&str` and `String` payloads become the message; anything else gets a
    /// fixed placeholder since it carries no printable form.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let error = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ListenerError::Panicked { error }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::ListenerError;
    ///
    /// assert_eq!(ListenerError::fail("x").as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns the bare failure message, without the variant prefix.
    pub fn as_message(&self) -> &str {
        match self {
            ListenerError::Failed { error } | ListenerError::Panicked { error } => error,
        }
    }

    /// True if the failure came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::fail(error)
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::fail(error)
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(error: anyhow::Error) -> Self {
        ListenerError::fail(format!("{error:#}"))
    }
}

/// # Errors produced by an emission as a whole.
///
/// Contained listener failures never show up here; they are returned as the
/// `Ok` list of an emission. A `DispatchError` means a listener registered with
/// `abort_all_on_error` failed and the failure surfaced to the emitter.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An abort-on-error listener failed while dispatching `event`.
    #[error("emission of '{event}' aborted: {source}")]
    Aborted {
        /// Name of the event being emitted.
        event: &'static str,
        /// The failure that triggered the abort.
        #[source]
        source: ListenerError,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::{DispatchError, ListenerError};
    ///
    /// let err = DispatchError::Aborted { event: "data", source: ListenerError::fail("boom") };
    /// assert_eq!(err.as_label(), "dispatch_aborted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Aborted { .. } => "dispatch_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Aborted { event, source } => {
                format!("aborted '{event}': {}", source.as_message())
            }
        }
    }

    /// Name of the event whose emission was aborted.
    pub fn event(&self) -> &'static str {
        match self {
            DispatchError::Aborted { event, .. } => event,
        }
    }

    /// Consumes the error and returns the listener failure behind it.
    pub fn into_source(self) -> ListenerError {
        match self {
            DispatchError::Aborted { source, .. } => source,
        }
    }
}
