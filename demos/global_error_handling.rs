//! # Example: global_error_handling
//!
//! One global error handler sees every listener failure together with the
//! event name and payload. A second dispatcher uses the built-in `LogWriter`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example global_error_handling --features logging
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use typebus::{Config, Dispatcher, Event, ListenerError, LogWriter};

struct Data;
impl Event for Data {
    const NAME: &'static str = "data";
    type Payload = String;
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bus = Dispatcher::new();
    bus.on(Data, |_| Err(ListenerError::fail("simulated error")));
    bus.on(Data, |payload| {
        println!("Received data: {payload}");
        Ok(())
    });
    bus.set_error_handler(|error, event, payload| {
        eprintln!("Error occurred in event \"{event}\": {error}");
        eprintln!("Payload: {payload:?}");
    });

    let errors = bus.emit(Data, &"Hello, world!".to_string()).unwrap_or_default();
    println!("{} error(s) returned to the emitter", errors.len());

    let logged = Dispatcher::with_config(Config::default().with_label("logged"));
    logged.set_error_handler_shared(Arc::new(LogWriter::new()));
    logged.on(Data, |_| panic!("listener bug"));
    let _ = logged.emit(Data, &"Hello again".to_string());
}
