//! # Per-registration dispatch options.
//!
//! [`ListenerOptions`] bundles the knobs that control **when** a listener runs
//! relative to its siblings and **what happens** when it fails:
//! - [`ListenerOptions::priority`] higher runs earlier (default `0`);
//! - [`ListenerOptions::abort_all_on_error`] a failure stops the emission and
//!   surfaces to the emitter (default `false`);
//! - an optional `on_error` hook receiving `(error, payload)`.
//!
//! ## Example
//! ```rust
//! use typebus::ListenerOptions;
//!
//! let opts: ListenerOptions<String> = ListenerOptions::new()
//!     .with_priority(5)
//!     .abort_all_on_error()
//!     .with_on_error(|err, payload| eprintln!("{payload}: {err}"));
//!
//! assert_eq!(opts.priority(), 5);
//! assert!(opts.aborts_all_on_error());
//! assert!(opts.has_on_error());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::ListenerError;

/// Hook invoked with `(error, payload)` when the owning listener fails.
pub type OnErrorHook<P> = Arc<dyn Fn(&ListenerError, &P) + Send + Sync>;

/// Options applied to a single registration.
///
/// Options are captured at registration time; the resulting registration is
/// immutable.
pub struct ListenerOptions<P> {
    pub(crate) priority: i32,
    pub(crate) abort_all_on_error: bool,
    pub(crate) on_error: Option<OnErrorHook<P>>,
}

impl<P> ListenerOptions<P> {
    /// Default options: priority `0`, no abort, no hook.
    pub fn new() -> Self {
        Self {
            priority: 0,
            abort_all_on_error: false,
            on_error: None,
        }
    }

    /// Returns new options with the given priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns new options where a failure aborts the rest of the emission.
    pub fn abort_all_on_error(mut self) -> Self {
        self.abort_all_on_error = true;
        self
    }

    /// Returns new options with the abort flag set explicitly.
    pub fn with_abort_all_on_error(mut self, abort: bool) -> Self {
        self.abort_all_on_error = abort;
        self
    }

    /// Returns new options with a per-listener error hook.
    ///
    /// The hook runs after the global handler. Panics inside it are not caught.
    pub fn with_on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ListenerError, &P) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Returns the priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the abort flag.
    pub fn aborts_all_on_error(&self) -> bool {
        self.abort_all_on_error
    }

    /// True if an `on_error` hook is set.
    pub fn has_on_error(&self) -> bool {
        self.on_error.is_some()
    }
}

impl<P> Default for ListenerOptions<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for ListenerOptions<P> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            abort_all_on_error: self.abort_all_on_error,
            on_error: self.on_error.clone(),
        }
    }
}

impl<P> fmt::Debug for ListenerOptions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("priority", &self.priority)
            .field("abort_all_on_error", &self.abort_all_on_error)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
