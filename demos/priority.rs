//! # Example: priority
//!
//! Listeners with a higher priority run first; equal priorities keep their
//! registration order.
//!
//! ## Run
//! ```bash
//! cargo run --example priority
//! ```

use typebus::{Dispatcher, Event, ListenerOptions};

struct Data;
impl Event for Data {
    const NAME: &'static str = "data";
    type Payload = String;
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Dispatcher::new();

    bus.on(Data, |_| {
        println!("I was registered first!");
        Ok(())
    });
    bus.on_with(
        Data,
        |_| {
            println!("I am higher priority!");
            Ok(())
        },
        ListenerOptions::new().with_priority(5),
    );

    // prints "I am higher priority!" then "I was registered first!"
    bus.emit(Data, &"testing priority".to_string())?;
    Ok(())
}
