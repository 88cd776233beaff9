//! # Event Bus Example
//!
//! Shows a hub used as an application event bus shared by several consumers.
//!
//! The example:
//! - Publishes a few events before anyone listens (only the last one is replayed)
//! - Starts three consumers that all see the same live events
//! - Closes the hub; every consumer drains and exits
//!
//! ## Run
//! ```bash
//! RUST_LOG=replaybus=debug cargo run --example event_bus
//! ```

use std::time::Duration;

use replaybus::{Hub, OverflowPolicy};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus: Hub<String> = Hub::new(1, 4, OverflowPolicy::DropOldest);
    for i in 1..=5 {
        bus.publish(format!("early-{i}")).await?;
    }
    println!("replay cache before consumers: {:?}", bus.replay_cache());

    let mut consumers = Vec::new();
    for id in 1..=3 {
        let mut sub = bus.subscribe()?;
        consumers.push(tokio::spawn(async move {
            let mut seen = 0usize;
            while let Some(ev) = sub.next().await {
                println!("[consumer {id}] {ev}");
                seen += 1;
            }
            seen
        }));
    }
    println!("subscribers: {}", bus.subscriber_count());

    for i in 6..=10 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.publish(format!("live-{i}")).await?;
    }
    bus.close();

    println!();
    println!("Delivered:");
    for (n, c) in consumers.into_iter().enumerate() {
        println!(" ├─► consumer {}: {} events", n + 1, c.await?);
    }
    println!(" └─► hub state: {:?}", bus.state());
    Ok(())
}
