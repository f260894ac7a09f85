//! # Premature Capture Example
//!
//! Deploys fired while the host is still starting up are captured and replayed, in fire
//! order, once the host calls `system_ready`. A subscriber prints the bus events.
//!
//! ## Run
//! ```bash
//! cargo run --example premature_capture
//! ```

use std::sync::Arc;
use std::time::Duration;

use deploygate::{Dispatcher, DispatcherConfig, Event, ListenerError, ListenerFn, ListenerRef, Subscribe, WorkItem};

struct Printer;

#[async_trait::async_trait]
impl Subscribe for Printer {
    async fn on_event(&self, ev: &Event) {
        let item = ev.item.as_deref().unwrap_or("-");
        println!("  event {:?} item={item}", ev.kind);
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let listener: ListenerRef = ListenerFn::arc_deploy_only("plugins", |item: WorkItem, _cx| async move {
        println!("  listener saw {}", item.identity());
        Ok::<_, ListenerError>(())
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Printer)];
    let dispatcher = Dispatcher::builder(DispatcherConfig::default())
        .with_listeners(vec![listener])
        .with_subscribers(subs)
        .build();

    println!("host starting, capture on: {}", dispatcher.is_capturing());
    dispatcher.fire_deploy(WorkItem::new("theme").depends_on("core")).await;
    dispatcher.fire_deploy(WorkItem::new("core")).await;
    println!("captured: {}", dispatcher.captured_len());

    println!("system ready");
    let replayed = dispatcher.system_ready().await;
    println!("replayed {replayed}, deployed {:?}", dispatcher.deployed());

    println!("toggling capture on, then off");
    dispatcher.set_capture_premature(true).await;
    dispatcher.fire_deploy(WorkItem::new("late")).await;
    let replayed = dispatcher.set_capture_premature(false).await;
    println!("replayed {replayed}");

    println!("reset");
    dispatcher.reset();
    println!("capture on: {}, deployed {:?}", dispatcher.is_capturing(), dispatcher.deployed());

    // Let the subscriber worker flush before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    dispatcher.shutdown();
    Ok(())
}
