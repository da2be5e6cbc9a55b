use std::sync::Arc;

use anyhow::Context;
use mq::{MqConfig, init_mq};
use tracing::{info, warn};

use tryon_server::config::{AppConfig, StoreBackend};
use tryon_server::consumers::consume_inference_results;
use tryon_server::AppState;
use tryon_server::dispatch::{InferenceDispatcher, MqDispatcher, OfflineDispatcher};
use tryon_server::store::{EventStore, FilesystemEventStore, MemoryEventStore};
use tryon_server::sweeper::run_event_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let store: Arc<dyn EventStore> = match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory event store; events are lost on restart");
            Arc::new(MemoryEventStore::new())
        }
        StoreBackend::Filesystem => Arc::new(
            FilesystemEventStore::new(config.store.path.clone())
                .await
                .with_context(|| {
                    format!("Failed to open event store at {}", config.store.path.display())
                })?,
        ),
    };

    let mq = if config.mq.enabled {
        match init_mq(MqConfig::from(&config.mq)).await {
            Ok(mq) => {
                info!(
                    queue_name = %config.mq.queue_name,
                    result_queue_name = %config.mq.result_queue_name,
                    "MQ connected"
                );
                Some(Arc::new(mq))
            }
            Err(e) => {
                warn!(error = %e, "MQ unavailable, inference jobs will stay pending");
                None
            }
        }
    } else {
        None
    };

    let dispatcher: Arc<dyn InferenceDispatcher> = match &mq {
        Some(mq) => Arc::new(MqDispatcher::new(Arc::clone(mq), &config.mq.queue_name)),
        None => Arc::new(OfflineDispatcher),
    };

    let state = AppState::new(store, dispatcher, &config.event);

    if config.sweeper.enabled {
        tokio::spawn(run_event_sweeper(
            Arc::clone(&state.orchestrator),
            config.sweeper.scan_interval(),
        ));
    }

    if let Some(mq) = mq {
        tokio::spawn(consume_inference_results(
            Arc::clone(&state.orchestrator),
            mq,
            config.mq.result_queue_name.clone(),
        ));
    }

    info!(
        event_timeout_secs = config.event.timeout_secs,
        sweeper = config.sweeper.enabled,
        "Try-on orchestrator running"
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    Ok(())
}
