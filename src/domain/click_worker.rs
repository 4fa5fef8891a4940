//! Background worker reconciling click counters into the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkStore;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);
const RETRY_ATTEMPTS: usize = 3;

/// Drains the click channel and applies each event to the authoritative
/// counter via [`LinkStore::increment_clicks`].
///
/// The store increment is atomic and commutative, so events for the same code
/// may apply in any order; the final count converges to the true total once
/// the channel is drained. Transient store errors are retried with backoff;
/// an event that still fails after the retry budget is logged and dropped
/// rather than stalling the queue.
///
/// The worker exits when every sender half has been dropped.
pub async fn run_click_worker(mut rx: mpsc::Receiver<ClickEvent>, store: Arc<dyn LinkStore>) {
    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY.as_millis() as u64)
            .map(jitter)
            .take(RETRY_ATTEMPTS);

        let result = Retry::start(strategy, || {
            store.increment_clicks(&event.short_code, 1, event.clicked_at)
        })
        .await;

        match result {
            Ok(true) => {}
            Ok(false) => {
                // Link deleted between the redirect and reconciliation.
                debug!("Dropping click for vanished link {}", event.short_code);
            }
            Err(e) => {
                warn!(
                    "Failed to reconcile click for {} after {} attempts: {}",
                    event.short_code, RETRY_ATTEMPTS, e
                );
            }
        }
    }

    debug!("Click worker stopped: channel closed");
}
