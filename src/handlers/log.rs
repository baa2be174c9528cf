//! # LogWriter: tracing-backed global error handler
//!
//! A minimal [`ErrorHandler`] that writes every contained listener failure to
//! `tracing` at `ERROR` level. Use it when failures should not go unnoticed
//! but no custom reporting exists yet.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR typebus::handlers::log: listener failed event="data" kind="listener_failed" error=boom payload="hello"
//! ERROR typebus::handlers::log: listener failed event="data" kind="listener_panicked" error=index out of bounds payload=[]
//! ```

use crate::error::ListenerError;
use crate::events::AnyPayload;
use crate::handlers::ErrorHandler;

/// Error handler that logs through `tracing`.
#[derive(Clone, Copy, Debug)]
pub struct LogWriter {
    with_payload: bool,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] that includes payloads in its records.
    #[must_use]
    pub fn new() -> Self {
        Self { with_payload: true }
    }

    /// Construct a writer that omits payloads (for sensitive data).
    #[must_use]
    pub fn without_payload() -> Self {
        Self {
            with_payload: false,
        }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler for LogWriter {
    fn handle(&self, error: &ListenerError, event: &'static str, payload: &dyn AnyPayload) {
        if self.with_payload {
            tracing::error!(
                event,
                kind = error.as_label(),
                error = error.as_message(),
                payload = ?payload,
                "listener failed"
            );
        } else {
            tracing::error!(
                event,
                kind = error.as_label(),
                error = error.as_message(),
                "listener failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Dispatcher, Event};

    struct Data;
    impl Event for Data {
        const NAME: &'static str = "data";
        type Payload = String;
    }

    #[test]
    fn test_log_writer_as_global_handler() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let bus = Dispatcher::new();
            bus.set_error_handler_shared(Arc::new(LogWriter::without_payload()));
            bus.on(Data, |_| Err(ListenerError::fail("boom")));

            assert!(bus.has_error_handler());
            assert_eq!(bus.emit(Data, &"x".to_string()).map(|e| e.len()), Ok(1));
        });
    }

    #[test]
    fn test_default_includes_payload() {
        assert!(LogWriter::default().with_payload);
        assert!(!LogWriter::without_payload().with_payload);
    }
}
