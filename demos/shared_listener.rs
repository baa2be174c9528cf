//! # Example: shared_listener
//!
//! A struct implementing [`Listener`] keeps its own state and can be removed
//! by handing back the same `Arc`.
//!
//! ## Run
//! ```bash
//! cargo run --example shared_listener
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use typebus::{Dispatcher, Event, Listener, ListenerError, ListenerOptions};

struct Tick;
impl Event for Tick {
    const NAME: &'static str = "tick";
    type Payload = u64;
}

#[derive(Default)]
struct Sum(AtomicU64);

#[async_trait]
impl Listener<Tick> for Sum {
    async fn on_event(&self, n: &u64) -> Result<(), ListenerError> {
        self.0.fetch_add(*n, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let bus = Dispatcher::new();
    let sum = Arc::new(Sum::default());

    bus.subscribe(Tick, Arc::clone(&sum), ListenerOptions::new());
    for n in 1..=3 {
        bus.emit_async(Tick, &n).await?;
    }
    println!("sum after three ticks: {}", sum.0.load(Ordering::Relaxed));

    let removed = bus.unsubscribe(Tick, &sum);
    bus.emit_async(Tick, &100).await?;
    println!(
        "removed {removed} registration(s); sum is still {}",
        sum.0.load(Ordering::Relaxed)
    );
    Ok(())
}
