//! # Delivery policy shared by every emission path.
//!
//! [`settle`] turns the outcome of one listener invocation into a decision.
//! `emit` (sequential), `emit_async` (concurrent) and detached async listeners
//! all go through it, so failure handling cannot drift between them.
//!
//! ## Steps for a failed listener
//! ```text
//! Err(error) ──► log (warn)
//!            ├─► global ErrorHandler::handle(error, event, payload)   (if installed)
//!            ├─► registration.on_error(error, payload)                (if set)
//!            └─► abort_all_on_error ? Abort(error) : Contained(error)
//! ```
//! Panics raised by the handler or the hook are not caught here.

use std::sync::Arc;

use tracing::warn;

use crate::error::ListenerError;
use crate::events::Event;
use crate::handlers::ErrorHandler;
use crate::listeners::Registration;

/// What the emission should do after one listener settled.
#[derive(Debug)]
pub(crate) enum Settled {
    /// Listener succeeded.
    Delivered,
    /// Listener failed; keep going and report the error.
    Contained(ListenerError),
    /// Listener failed and asked to abort the emission.
    Abort(ListenerError),
}

/// Applies the failure policy of `reg` to `outcome`.
///
/// `handler` is only called on failure, so the global handler is looked up at
/// the moment a failure happens.
pub(crate) fn settle<E, H>(
    label: &str,
    reg: &Registration<E>,
    payload: &E::Payload,
    outcome: Result<(), ListenerError>,
    handler: H,
) -> Settled
where
    E: Event,
    H: FnOnce() -> Option<Arc<dyn ErrorHandler>>,
{
    let error = match outcome {
        Ok(()) => return Settled::Delivered,
        Err(error) => error,
    };

    warn!(
        dispatcher = label,
        event = E::NAME,
        listener = reg.name(),
        id = %reg.id,
        kind = error.as_label(),
        error = error.as_message(),
        abort = reg.abort_all_on_error,
        "listener failed"
    );

    if let Some(global) = handler() {
        global.handle(&error, E::NAME, payload);
    }
    if let Some(hook) = &reg.on_error {
        hook(&error, payload);
    }

    if reg.abort_all_on_error {
        Settled::Abort(error)
    } else {
        Settled::Contained(error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::events::AnyPayload;
    use crate::listeners::{Callback, ListenerOptions};

    struct Data;
    impl Event for Data {
        const NAME: &'static str = "data";
        type Payload = String;
    }

    fn reg(opts: ListenerOptions<String>) -> Registration<Data> {
        Registration::new(
            Callback::Blocking(Arc::new(|_: &String| -> Result<(), ListenerError> { Ok(()) })),
            opts,
        )
    }

    #[test]
    fn test_success_skips_handlers() {
        let r = reg(ListenerOptions::new().with_on_error(|_, _| panic!("must not run")));
        let settled = settle("t", &r, &"x".to_string(), Ok(()), || {
            panic!("handler must not be looked up")
        });
        assert!(matches!(settled, Settled::Delivered));
    }

    #[test]
    fn test_global_handler_runs_before_hook() {
        let calls = Arc::new(Mutex::new(Vec::<String>::new()));

        let c = Arc::clone(&calls);
        let r = reg(ListenerOptions::new().with_on_error(move |err, payload| {
            c.lock().unwrap().push(format!("hook:{err}:{payload}"));
        }));

        let c = Arc::clone(&calls);
        let global: Arc<dyn ErrorHandler> = Arc::new(
            move |err: &ListenerError, event: &'static str, payload: &dyn AnyPayload| {
                let p = payload.downcast_ref::<String>().cloned().unwrap_or_default();
                c.lock().unwrap().push(format!("global:{event}:{err}:{p}"));
            },
        );

        let settled = settle(
            "t",
            &r,
            &"x".to_string(),
            Err(ListenerError::fail("boom")),
            || Some(global),
        );

        assert!(matches!(settled, Settled::Contained(ref e) if e.as_message() == "boom"));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["global:data:boom:x".to_string(), "hook:boom:x".to_string()]
        );
    }

    #[test]
    fn test_abort_flag_turns_failure_into_abort() {
        let r = reg(ListenerOptions::new().abort_all_on_error());
        let settled = settle(
            "t",
            &r,
            &"x".to_string(),
            Err(ListenerError::fail("stop")),
            || None,
        );
        assert!(matches!(settled, Settled::Abort(ref e) if e.as_message() == "stop"));
    }
}
