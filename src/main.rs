//! # Order Tracker Demo
//!
//! Submits the sample order to the configured service and logs every state change
//! until the order is scheduled for delivery or fails.
//!
//! Configuration comes from the environment, see [`TrackerConfig::from_env`].

use order_tracker::config::TrackerConfig;
use order_tracker::gateway::HttpOrderGateway;
use order_tracker::model::{OrderLine, OrderRequest};
use order_tracker::runtime::setup_tracing;
use order_tracker::session::{OrderTrackingSession, TrackingSnapshot};
use order_tracker::status::{Progress, StepState};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = TrackerConfig::from_env();
    info!(endpoint = %config.endpoint, poll_interval_ms = config.poll_interval.as_millis() as u64, "Starting order tracker");

    let gateway = HttpOrderGateway::new(&config).map_err(|e| e.to_string())?;
    let session = OrderTrackingSession::spawn(Arc::new(gateway), config);

    let request = OrderRequest::new(
        102,
        "456 Pine St, Vancouver, BC V6B 1B1",
        vec![OrderLine::new(1000, 1)],
    );

    let span = tracing::info_span!("order_tracking");
    async {
        match session.submit(request).await {
            Ok(view) => info!(order_id = %view.id, status = %view.status.label(), "Order submitted"),
            Err(e) => {
                error!(error = %e, "Order submission failed");
                return;
            }
        }

        let mut updates = session.subscribe();
        loop {
            let snapshot = updates.borrow_and_update().clone();
            report(&snapshot);
            if snapshot.is_terminal() {
                break;
            }
            if updates.changed().await.is_err() {
                warn!("Session closed before the order settled");
                break;
            }
        }
    }
    .instrument(span)
    .await;

    session.shutdown().await.map_err(|e| e.to_string())?;
    info!("Order tracker finished");
    Ok(())
}

fn report(snapshot: &TrackingSnapshot) {
    if let Some(error) = &snapshot.last_error {
        warn!(%error, "Tracking error");
    }
    let Some(view) = &snapshot.current_view else {
        return;
    };

    match snapshot.progress() {
        Some(Progress::Failed) => error!(order_id = %view.id, "Order failed: unable to process this order"),
        Some(Progress::Steps(steps)) => {
            let line = steps
                .iter()
                .map(|step| match step.state {
                    StepState::Completed => format!("[x] {}", step.label),
                    StepState::Current => format!("[>] {}", step.label),
                    StepState::Pending => format!("[ ] {}", step.label),
                })
                .collect::<Vec<_>>()
                .join("  ");
            info!(order_id = %view.id, polling = snapshot.is_polling, "{line}");
        }
        None => {}
    }

    for item in &view.items {
        info!(
            order_id = %view.id,
            product_code = item.product_code,
            quantity = item.quantity,
            item_status = ?item.item_status,
            warehouse = ?item.fulfilled_by_warehouse_id,
            "Item"
        );
    }
}
