//! # Slow Consumer Example
//!
//! Runs the same fast producer against a slow consumer under every overflow policy
//! and prints what the consumer ended up seeing.
//!
//! - `Suspend`: nothing lost, the producer is throttled
//! - `DropOldest`: consumer skips ahead to recent values
//! - `DropNewest`: consumer keeps its backlog, later values skip it
//! - `Fail`: the producer sees `BufferOverflow` and counts rejections
//!
//! ## Run
//! ```bash
//! cargo run --example slow_consumer
//! ```

use std::time::{Duration, Instant};

use replaybus::{Hub, HubError, OverflowPolicy};
use tracing_subscriber::EnvFilter;

async fn run(policy: OverflowPolicy) -> anyhow::Result<()> {
    let hub = Hub::new(0, 3, policy);
    let mut sub = hub.subscribe()?;

    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(v) = sub.next().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
            seen.push(v);
        }
        seen
    });

    let started = Instant::now();
    let mut rejected = 0u32;
    for v in 0..20u32 {
        match hub.publish(v).await {
            Ok(()) => {}
            Err(HubError::BufferOverflow) => rejected += 1,
            Err(e) => return Err(e.into()),
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let elapsed = started.elapsed();
    hub.close();

    let seen = consumer.await?;
    println!("[{}]", policy.as_label());
    println!(" ├─► producer time: {elapsed:?}");
    println!(" ├─► rejected:      {rejected}");
    println!(" └─► consumer saw:  {seen:?}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    for policy in [
        OverflowPolicy::Suspend,
        OverflowPolicy::DropOldest,
        OverflowPolicy::DropNewest,
        OverflowPolicy::Fail,
    ] {
        run(policy).await?;
    }
    Ok(())
}
