//! # Example: abort_on_error
//!
//! A listener registered with `abort_all_on_error` turns its failure into an
//! `Err` for the emitter and stops the listeners after it.
//!
//! ## Flow
//! ```text
//! emit(Data) ──► listener #1 fails (abort) ──► on_error hook
//!            └─► Err(DispatchError::Aborted)   (listener #2 never runs)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example abort_on_error
//! ```

use typebus::{Dispatcher, Event, ListenerError, ListenerOptions};

struct Data;
impl Event for Data {
    const NAME: &'static str = "data";
    type Payload = String;
}

fn main() {
    let bus = Dispatcher::new();

    bus.on_with(
        Data,
        |_| {
            println!("I was registered first!");
            Err(ListenerError::fail("I am an error!"))
        },
        ListenerOptions::new()
            .abort_all_on_error()
            .with_on_error(|err, payload: &String| eprintln!("[hook] {err} (payload: {payload})")),
    );
    bus.on(Data, |_| {
        println!("I was registered second!");
        Ok(())
    });

    match bus.emit(Data, &"testing abort_all_on_error".to_string()) {
        Ok(errors) => println!("completed with {} contained error(s)", errors.len()),
        Err(err) => eprintln!("Caught an error: {err}"),
    }
}
