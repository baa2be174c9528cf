//! Dispatcher core: channels, delivery policy and the dispatcher itself.
//!
//! The public API from this module is [`Dispatcher`] and its [`Config`].
//!
//! Internal modules:
//! - [`channel`]: per-event ordered registration lists and their type-erased map;
//! - [`policy`]: failure handling shared by every emission path;
//! - [`dispatcher`]: registration, removal and the two emission strategies.

mod channel;
mod config;
mod dispatcher;
mod policy;

pub use config::Config;
pub use dispatcher::Dispatcher;
