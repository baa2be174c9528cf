//! # Example: async_emit
//!
//! Mixes blocking and async listeners.
//!
//! - `emit` runs the blocking listener inline and starts the async one
//!   detached; it returns before the async listener finishes.
//! - `emit_async` runs both and returns once every listener has settled.
//!
//! ## Run
//! ```bash
//! cargo run --example async_emit
//! ```

use std::time::Duration;

use typebus::{Dispatcher, Event};

#[derive(Debug, Clone)]
struct Reading {
    id: u32,
    value: String,
}

struct Data;
impl Event for Data {
    const NAME: &'static str = "data";
    type Payload = Reading;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let bus = Dispatcher::new();

    bus.on(Data, |r| {
        println!("Received id: {}, value: {}", r.id, r.value);
        Ok(())
    });
    bus.on_async(Data, |r| async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("Received async data, id: {}, value: {}", r.id, r.value);
        Ok(())
    });

    let reading = Reading {
        id: 1,
        value: "Hello World".into(),
    };

    println!("Emitting synchronously");
    bus.emit(Data, &reading)?;
    println!("Complete");

    // let the detached listener from the synchronous emit finish
    tokio::time::sleep(Duration::from_millis(600)).await;

    println!("Emitting asynchronously");
    bus.emit_async(Data, &reading).await?;
    println!("Complete");
    Ok(())
}
