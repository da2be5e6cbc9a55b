use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::orchestrator::{Orchestrator, Reconciliation};

/// Counts from one sweep over the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub scanned: usize,
    pub expired: usize,
    pub in_progress: usize,
    pub failed: usize,
}

/// Run the event sweeper as a background task.
pub async fn run_event_sweeper(orchestrator: Arc<Orchestrator>, scan_interval: Duration) {
    info!(
        scan_interval_secs = scan_interval.as_secs(),
        "Starting event sweeper"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;

        match sweep_events(&orchestrator).await {
            Ok(summary) if summary.expired > 0 || summary.failed > 0 => {
                info!(
                    scanned = summary.scanned,
                    expired = summary.expired,
                    failed = summary.failed,
                    "Event sweep finished"
                );
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Event sweep failed"),
        }
    }
}

/// Expire overdue events and re-drive stalled ones.
pub async fn sweep_events(orchestrator: &Orchestrator) -> anyhow::Result<SweepSummary> {
    let ids = orchestrator.store().list_ids().await?;
    let mut summary = SweepSummary {
        scanned: ids.len(),
        ..Default::default()
    };

    for event_id in ids {
        match orchestrator.reconcile(&event_id).await {
            Ok(Reconciliation::Expired) => summary.expired += 1,
            Ok(Reconciliation::InProgress) => summary.in_progress += 1,
            Ok(Reconciliation::Settled) => {}
            Err(e) => {
                summary.failed += 1;
                error!(event_id = %event_id, error = %e, "Failed to reconcile event");
            }
        }
    }

    Ok(summary)
}
