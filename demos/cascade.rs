//! # Cascade Example
//!
//! Fires a small service graph in the "wrong" order and shows how the dispatcher holds
//! each item until its dependencies are deployed, then cascades.
//!
//! ```text
//! web ──► auth ──► db
//!  └────► cache
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cascade
//! ```

use deploygate::{DeployOutcome, Dispatcher, DispatcherConfig, ListenerError, ListenerFn, ListenerRef, WorkItem};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = DispatcherConfig {
        capture_premature: false,
        ..DispatcherConfig::default()
    };

    let printer: ListenerRef = ListenerFn::arc(
        "printer",
        |item: WorkItem, _cx| async move {
            println!("  deploy   {}", item.identity());
            Ok::<_, ListenerError>(())
        },
        |item: WorkItem, _cx| async move {
            println!("  undeploy {}", item.identity());
            Ok::<_, ListenerError>(())
        },
    );
    let dispatcher = Dispatcher::builder(cfg).with_listeners(vec![printer]).build();

    let fires = [
        WorkItem::new("web").depends_on("auth").depends_on("cache"),
        WorkItem::new("auth").depends_on("db"),
        WorkItem::new("cache"),
        WorkItem::new("db"),
    ];

    for item in fires {
        let id = item.identity().to_string();
        println!("fire {id}");
        match dispatcher.fire_deploy(item).await {
            DeployOutcome::Queued { missing } => println!("  waiting on {missing:?}"),
            DeployOutcome::Dispatched { cascaded } => println!("  dispatched, cascaded {cascaded}"),
            other => println!("  {other:?}"),
        }
    }

    println!();
    println!("Deployed: {:?}", dispatcher.deployed());
    println!("Pending:  {:?}", dispatcher.pending());

    println!();
    println!("fire db again");
    println!("  {:?}", dispatcher.fire_deploy(WorkItem::new("db")).await);

    println!("undeploy auth");
    dispatcher.fire_undeploy(WorkItem::new("auth")).await;
    println!("Deployed: {:?}", dispatcher.deployed());
    Ok(())
}
