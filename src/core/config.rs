//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for one [`Dispatcher`](crate::Dispatcher).
//!
//! Config is used in one place: `Dispatcher::with_config(config)`.
//! `Dispatcher::new()` is shorthand for `Dispatcher::with_config(Config::default())`.

use std::borrow::Cow;

/// Settings for a single dispatcher instance.
///
/// ## Field semantics
/// - `label`: name attached to every log record of this dispatcher
/// - `catch_panics`: turn listener panics into [`ListenerError::Panicked`](crate::ListenerError::Panicked)
/// - `detach_async_on_emit`: let the synchronous `emit` start async listeners
///   on the ambient tokio runtime
///
/// ## Notes
/// All fields are public for flexibility; the struct is plain data.
#[derive(Clone, Debug)]
pub struct Config {
    /// Label used in tracing fields to tell dispatchers apart.
    pub label: Cow<'static, str>,

    /// Convert listener panics into contained failures.
    ///
    /// - `true`: a panic is normalized and handled like an `Err` return
    ///   (collected, reported, may abort when the listener asks for it)
    /// - `false`: the panic unwinds into the caller of `emit`/`emit_async`
    pub catch_panics: bool,

    /// What the synchronous `emit` does with async listeners.
    ///
    /// - `true`: spawn them detached on the current tokio runtime (if any);
    ///   their outcome is reported to hooks but not to the caller
    /// - `false`: skip them
    pub detach_async_on_emit: bool,
}

impl Config {
    /// Returns a copy with the given label.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `label = "dispatcher"`
    /// - `catch_panics = true`
    /// - `detach_async_on_emit = true`
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("dispatcher"),
            catch_panics: true,
            detach_async_on_emit: true,
        }
    }
}
