//! # Global error handlers
//!
//! - [`ErrorHandler`]: the trait a dispatcher's global handler implements
//!   (closures included).
//! - [`LogWriter`]: built-in handler writing failures to `tracing`
//!   (feature `logging`).

mod handler;
#[cfg(feature = "logging")]
mod log;

pub use handler::ErrorHandler;
#[cfg(feature = "logging")]
pub use log::LogWriter;
